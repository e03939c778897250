//! Search domain types with enforced invariants.
//!
//! These types ensure critical invariants are maintained at the type level:
//! - PlayerId: 1-based, never zero
//! - Utilities: one value per player, each in range [-1, 1]

use crate::{GameError, Result};
use std::fmt;

/// A 1-based player index.
///
/// Player ids follow the convention of board-game engines where player 1
/// moves first; id 0 is reserved and never refers to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(u8);

impl PlayerId {
    /// The first player.
    pub const FIRST: Self = Self(1);

    /// Create a player id.
    ///
    /// # Errors
    /// Returns `GameError::InvalidPlayer` for id 0.
    pub fn new(id: u8) -> Result<Self> {
        if id == 0 {
            return Err(GameError::InvalidPlayer(id));
        }
        Ok(Self(id))
    }

    /// The raw 1-based id.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Index into per-player tables that keep slot 0 unused.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The player after this one in a rotation of `num_players`.
    pub fn next(self, num_players: usize) -> Self {
        if self.index() >= num_players {
            Self::FIRST
        } else {
            Self(self.0 + 1)
        }
    }

    /// Iterate over all players of a game with `num_players` players.
    pub fn all(num_players: usize) -> impl Iterator<Item = PlayerId> {
        (1..=num_players.min(u8::MAX as usize)).map(|id| PlayerId(id as u8))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Outcome values for every player of a finished game.
///
/// Invariant: every value is finite and in range [-1, 1]. Storage keeps one
/// slot per player plus an unused slot 0, so a `PlayerId` indexes directly.
///
/// # Example
/// ```
/// use shuct_core::{PlayerId, Utilities};
///
/// let utilities = Utilities::new(vec![1.0, -1.0]).unwrap();
/// assert_eq!(utilities.num_players(), 2);
/// assert_eq!(utilities.get(PlayerId::FIRST), 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Utilities(Vec<f64>);

impl Utilities {
    /// Create utilities from per-player values, player 1 first.
    ///
    /// # Errors
    /// Returns `GameError::NoPlayers` for an empty vector and
    /// `GameError::InvalidUtility` if any value is outside [-1, 1].
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(-1.0..=1.0).contains(*v))
        {
            return Err(GameError::InvalidUtility(format!(
                "player {} has utility {} outside [-1, 1]",
                i + 1,
                v
            )));
        }

        let mut slots = Vec::with_capacity(values.len() + 1);
        slots.push(0.0);
        slots.extend(values);
        Ok(Self(slots))
    }

    /// Every player gets 0.
    pub fn draw(num_players: usize) -> Self {
        Self(vec![0.0; num_players + 1])
    }

    /// The winner gets 1 and every other player gets -1.
    pub fn win(num_players: usize, winner: PlayerId) -> Self {
        let mut slots = vec![-1.0; num_players + 1];
        slots[0] = 0.0;
        if let Some(slot) = slots.get_mut(winner.index()) {
            *slot = 1.0;
        }
        Self(slots)
    }

    /// Convert finishing ranks into utilities.
    ///
    /// Rank 1 is best; tied players share the average of the ranks they
    /// span, so fractional ranks are allowed. With N players a rank `r`
    /// maps to `1 - (r - 1) * 2 / (N - 1)`; a single player maps rank `r`
    /// to `2r - 1`.
    ///
    /// # Errors
    /// Returns `GameError::InvalidRank` if a rank lies outside [1, N] (or
    /// [0, 1] for a single player).
    pub fn from_ranks(ranks: &[f64]) -> Result<Self> {
        let n = ranks.len();
        if n == 0 {
            return Err(GameError::NoPlayers);
        }

        let (low, high) = if n == 1 { (0.0, 1.0) } else { (1.0, n as f64) };
        if let Some(rank) = ranks.iter().find(|r| !(low..=high).contains(*r)) {
            return Err(GameError::InvalidRank(format!(
                "rank {} outside [{}, {}]",
                rank, low, high
            )));
        }

        let values = ranks
            .iter()
            .map(|&rank| {
                if n == 1 {
                    2.0 * rank - 1.0
                } else {
                    1.0 - (rank - 1.0) * (2.0 / (n as f64 - 1.0))
                }
            })
            .collect();
        Self::new(values)
    }

    /// Number of players covered.
    pub fn num_players(&self) -> usize {
        self.0.len() - 1
    }

    /// Utility of one player, 0 for an unknown player.
    pub fn get(&self, player: PlayerId) -> f64 {
        self.0.get(player.index()).copied().unwrap_or(0.0)
    }

    /// Iterate over `(player, utility)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, f64)> + '_ {
        PlayerId::all(self.num_players()).map(move |p| (p, self.get(p)))
    }

    /// Raw slots including the unused slot 0.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl std::ops::Index<PlayerId> for Utilities {
    type Output = f64;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.0[player.index()]
    }
}
