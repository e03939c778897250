//! Single-pile Nim for any number of players.
//!
//! Players take turns removing between 1 and `max_take` objects from one
//! pile; whoever takes the last object wins. With two players the losing
//! positions are exactly the multiples of `max_take + 1`, so the optimal
//! move is always known.

use shuct_core::{Game, PlayerId, Utilities};
use std::fmt;

/// Nim rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nim {
    pile: u32,
    max_take: u32,
    players: usize,
}

impl Nim {
    /// Two-player Nim.
    pub fn new(pile: u32, max_take: u32) -> Self {
        Self::with_players(pile, max_take, 2)
    }

    /// Nim with `players` players taking turns in id order.
    pub fn with_players(pile: u32, max_take: u32, players: usize) -> Self {
        Self {
            pile,
            max_take: max_take.max(1),
            players: players.clamp(1, u8::MAX as usize),
        }
    }

    /// Starting pile size.
    pub fn pile(&self) -> u32 {
        self.pile
    }

    /// The winning reply for two players, if the position is not lost.
    pub fn optimal_take(&self, remaining: u32) -> Option<NimMove> {
        let take = remaining % (self.max_take + 1);
        (take > 0).then_some(NimMove(take))
    }
}

/// Nim position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NimState {
    remaining: u32,
    mover: PlayerId,
    last_taker: Option<PlayerId>,
}

impl NimState {
    /// Objects left on the pile.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Player who made the previous move.
    pub fn last_taker(&self) -> Option<PlayerId> {
        self.last_taker
    }
}

/// Number of objects to remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NimMove(pub u32);

impl fmt::Display for NimMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "take {}", self.0)
    }
}

impl Game for Nim {
    type State = NimState;
    type Move = NimMove;

    fn initial_state(&self) -> Self::State {
        NimState {
            remaining: self.pile,
            mover: PlayerId::FIRST,
            last_taker: None,
        }
    }

    fn num_players(&self) -> usize {
        self.players
    }

    fn mover(&self, state: &Self::State) -> PlayerId {
        state.mover
    }

    fn legal_moves(&self, state: &Self::State) -> Vec<Self::Move> {
        (1..=self.max_take.min(state.remaining)).map(NimMove).collect()
    }

    fn apply(&self, state: &Self::State, mv: Self::Move) -> Self::State {
        NimState {
            remaining: state.remaining - mv.0,
            mover: state.mover.next(self.players),
            last_taker: Some(state.mover),
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.remaining == 0
    }

    fn utilities(&self, state: &Self::State) -> Utilities {
        let Some(winner) = state.last_taker else {
            return Utilities::draw(self.players);
        };
        if self.players == 1 {
            return Utilities::win(1, winner);
        }

        // Everyone but the winner shares ranks 2..=N
        let shared = (2.0 + self.players as f64) / 2.0;
        let ranks: Vec<f64> = PlayerId::all(self.players)
            .map(|p| if p == winner { 1.0 } else { shared })
            .collect();
        Utilities::from_ranks(&ranks).unwrap_or_else(|_| Utilities::win(self.players, winner))
    }
}
