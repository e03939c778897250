//! Sequential Halving budget bookkeeping.
//!
//! `HalvingSchedule` turns an iteration budget into a number of rounds and
//! a per-arm allocation. `Budget` is what the scheduler polls between steps
//! to decide whether the call must stop early.

use crate::config::SearchLimits;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Round structure derived from an iteration budget.
///
/// `rounds = ceil(ln(budget))` and `iterations_per_round = ceil(budget / rounds)`.
/// The logarithm is taken over the total budget rather than over the number
/// of arms; rounds are clamped to at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalvingSchedule {
    /// Budget the schedule was derived from.
    pub budget: usize,

    /// Nominal number of halving rounds.
    pub rounds: usize,

    /// Search steps granted to each surviving arm per round.
    pub iterations_per_round: usize,
}

impl HalvingSchedule {
    /// Derive the schedule for an iteration budget.
    ///
    /// # Example
    /// ```
    /// use shuct_mcts::HalvingSchedule;
    ///
    /// let schedule = HalvingSchedule::from_budget(1000);
    /// assert_eq!(schedule.rounds, 7);
    /// assert_eq!(schedule.iterations_per_round, 143);
    /// ```
    pub fn from_budget(budget: usize) -> Self {
        let budget = budget.max(1);
        let rounds = ((budget as f64).ln().ceil() as usize).max(1);
        let iterations_per_round = budget.div_ceil(rounds);

        Self {
            budget,
            rounds,
            iterations_per_round,
        }
    }
}

/// Why a search call stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Halving left exactly one arm at the root.
    SingleSurvivor,

    /// The call's iteration limit was reached.
    IterationLimit,

    /// The call's time limit was reached.
    TimeLimit,

    /// The interrupt flag was raised.
    Interrupted,
}

/// External limits polled by the scheduler.
#[derive(Clone, Debug)]
pub struct Budget {
    deadline: Option<Instant>,
    max_iterations: Option<usize>,
    interrupt: Arc<AtomicBool>,
}

impl Budget {
    /// Start the clock for a call with the given limits.
    pub fn start(limits: &SearchLimits, interrupt: Arc<AtomicBool>) -> Self {
        let now = Instant::now();
        let deadline = limits
            .time_limit()
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .and_then(|d| now.checked_add(d));

        Self {
            deadline,
            max_iterations: limits.iteration_cap(),
            interrupt,
        }
    }

    /// A budget with no limits and a private interrupt flag.
    pub fn unlimited() -> Self {
        Self::start(&SearchLimits::unlimited(), Arc::new(AtomicBool::new(false)))
    }

    /// True once someone raised the interrupt flag.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// The first limit that is exhausted after `iterations` steps, if any.
    pub fn exhausted(&self, iterations: usize) -> Option<StopReason> {
        if self.is_interrupted() {
            return Some(StopReason::Interrupted);
        }
        if self.max_iterations.is_some_and(|cap| iterations >= cap) {
            return Some(StopReason::IterationLimit);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::TimeLimit);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_thousand() {
        let schedule = HalvingSchedule::from_budget(1000);
        assert_eq!(schedule.budget, 1000);
        assert_eq!(schedule.rounds, 7); // ln(1000) = 6.9
        assert_eq!(schedule.iterations_per_round, 143);
    }

    #[test]
    fn test_schedule_small_budgets() {
        let one = HalvingSchedule::from_budget(1);
        assert_eq!((one.rounds, one.iterations_per_round), (1, 1));

        let zero = HalvingSchedule::from_budget(0);
        assert_eq!((zero.rounds, zero.iterations_per_round), (1, 1));

        let two = HalvingSchedule::from_budget(2);
        assert_eq!((two.rounds, two.iterations_per_round), (1, 2));

        let three = HalvingSchedule::from_budget(3);
        assert_eq!((three.rounds, three.iterations_per_round), (2, 2));
    }

    #[test]
    fn test_schedule_rounds_up() {
        let schedule = HalvingSchedule::from_budget(100);
        assert_eq!(schedule.rounds, 5); // ln(100) = 4.6
        assert_eq!(schedule.iterations_per_round, 20);

        let schedule = HalvingSchedule::from_budget(101);
        assert_eq!(schedule.iterations_per_round, 21);
    }

    #[test]
    fn test_unlimited_budget_never_exhausts() {
        let budget = Budget::unlimited();
        assert_eq!(budget.exhausted(0), None);
        assert_eq!(budget.exhausted(usize::MAX), None);
    }

    #[test]
    fn test_iteration_cap() {
        let flag = Arc::new(AtomicBool::new(false));
        let budget = Budget::start(&SearchLimits::iterations(10), flag);
        assert_eq!(budget.exhausted(9), None);
        assert_eq!(budget.exhausted(10), Some(StopReason::IterationLimit));
    }

    #[test]
    fn test_interrupt_takes_priority() {
        let flag = Arc::new(AtomicBool::new(false));
        let budget = Budget::start(&SearchLimits::iterations(10), flag.clone());
        flag.store(true, Ordering::Relaxed);
        assert!(budget.is_interrupted());
        assert_eq!(budget.exhausted(10), Some(StopReason::Interrupted));
    }

    #[test]
    fn test_deadline() {
        let flag = Arc::new(AtomicBool::new(false));
        let budget = Budget::start(&SearchLimits::seconds(1e-9), flag);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(budget.exhausted(0), Some(StopReason::TimeLimit));
    }
}
