//! The two scheduling policies and their priority bookkeeping, written as
//! plain functions over the environment table so they are host-testable.
//! The callers in `sched` hold the kernel lock around every call.

use crate::env::{EnvStatus, EnvTable, MIN_PRIORITY};

/// Dispatches an environment may take at one priority before it is pushed
/// down a band
pub const MAX_EXECS_BEFORE_DOWNGRADE: usize = 10;

/// Scheduling decisions between global upgrade events
pub const TURNS_BEFORE_UPGRADE: usize = 50;

/// Outcome of one selection pass
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selection {
    /// run this slot and charge it for the turn
    Dispatch(usize),
    /// nothing else is runnable but the CPU's own environment can go on,
    /// uncharged
    Resume(usize),
    /// nothing to run at all
    Idle,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Policy {
    RoundRobin,
    Priority,
}

impl Policy {
    /// The policy never changes while the system runs, so it is fixed at
    /// build time through the `sched-round-robin` feature.
    pub const fn configured() -> Self {
        if cfg!(feature = "sched-round-robin") {
            Policy::RoundRobin
        } else {
            Policy::Priority
        }
    }

    pub fn select(
        &self,
        table: &EnvTable,
        last_run: Option<usize>,
        current: Option<usize>,
    ) -> Selection {
        match self {
            Policy::RoundRobin => select_round_robin(table, last_run, current),
            Policy::Priority => select_priority(table, current),
        }
    }
}

/// One full circle over the table starting right after `last_run`, first
/// Runnable slot wins.
fn select_round_robin(
    table: &EnvTable,
    last_run: Option<usize>,
    current: Option<usize>,
) -> Selection {
    let n = table.capacity();
    let start = match last_run {
        Some(last) => (last + 1) % n,
        None => 0,
    };
    for offset in 0..n {
        let slot = (start + offset) % n;
        if table.get(slot).status == EnvStatus::Runnable {
            return Selection::Dispatch(slot);
        }
    }
    resume_or_idle(table, current)
}

/// Strictly highest priority wins. Ties keep the first maximum of an
/// ascending scan from slot 0, so repeated passes over an unchanged table
/// pick the same slot.
fn select_priority(table: &EnvTable, current: Option<usize>) -> Selection {
    let mut best: Option<(usize, usize)> = None;
    for slot in 0..table.capacity() {
        let env = table.get(slot);
        if env.status != EnvStatus::Runnable {
            continue;
        }
        match best {
            Some((_, priority)) if env.priority <= priority => {}
            _ => best = Some((slot, env.priority)),
        }
    }
    match best {
        Some((slot, _)) => Selection::Dispatch(slot),
        None => resume_or_idle(table, current),
    }
}

/// A CPU whose own environment yielded while still Running may pick it up
/// again; Running slots that belong to other CPUs are never touched.
fn resume_or_idle(table: &EnvTable, current: Option<usize>) -> Selection {
    match current {
        Some(slot) if table.get(slot).status == EnvStatus::Running => Selection::Resume(slot),
        _ => Selection::Idle,
    }
}

/// Charge `slot` for a dispatch: bump its count, and once it has used up its
/// band, push it down one priority and start counting afresh. A slot already
/// at MIN_PRIORITY keeps counting but cannot drop lower.
pub fn charge_dispatch(table: &mut EnvTable, slot: usize) {
    let env = table.get_mut(slot);
    env.execution_count += 1;
    if env.execution_count >= MAX_EXECS_BEFORE_DOWNGRADE && env.priority > MIN_PRIORITY {
        env.priority -= 1;
        env.execution_count = 0;
    }
}

/// Count one scheduling decision towards the upgrade event, whatever the
/// outcome of the pass was. Returns whether the event fired.
pub fn bump_turns(table: &mut EnvTable, turns: &mut usize) -> bool {
    *turns += 1;
    if *turns >= TURNS_BEFORE_UPGRADE {
        table.upgrade_all();
        *turns = 0;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvTable, MAX_PRIORITY};
    use crate::symbols::N_ENVS;

    fn runnable(table: &mut EnvTable, slot: usize, priority: usize) {
        let env = table.get_mut(slot);
        env.status = EnvStatus::Runnable;
        env.priority = priority;
    }

    #[test]
    fn round_robin_picks_first_runnable_after_last() {
        let mut table = EnvTable::new();
        runnable(&mut table, 2, MAX_PRIORITY);
        runnable(&mut table, 5, MAX_PRIORITY);
        let selection = Policy::RoundRobin.select(&table, Some(2), None);
        assert_eq!(selection, Selection::Dispatch(5));
    }

    #[test]
    fn round_robin_wraps_past_table_end() {
        let mut table = EnvTable::new();
        runnable(&mut table, 1, MAX_PRIORITY);
        let selection = Policy::RoundRobin.select(&table, Some(N_ENVS - 1), None);
        assert_eq!(selection, Selection::Dispatch(1));

        // and from the middle: nothing above last, smallest index overall wins
        runnable(&mut table, 0, MAX_PRIORITY);
        let selection = Policy::RoundRobin.select(&table, Some(30), None);
        assert_eq!(selection, Selection::Dispatch(0));
    }

    #[test]
    fn round_robin_single_runnable_is_reselected_every_turn() {
        let mut table = EnvTable::new();
        runnable(&mut table, 9, MAX_PRIORITY);
        for _ in 0..3 {
            let selection = Policy::RoundRobin.select(&table, Some(9), Some(9));
            assert_eq!(selection, Selection::Dispatch(9));
        }
    }

    #[test]
    fn round_robin_never_selects_other_cpus_running_slots() {
        let mut table = EnvTable::new();
        table.get_mut(3).status = EnvStatus::Running; // some other CPU's
        runnable(&mut table, 6, MAX_PRIORITY);
        let selection = Policy::RoundRobin.select(&table, Some(2), None);
        assert_eq!(selection, Selection::Dispatch(6));
    }

    #[test]
    fn round_robin_resumes_own_running_environment() {
        let mut table = EnvTable::new();
        table.get_mut(4).status = EnvStatus::Running;
        let selection = Policy::RoundRobin.select(&table, Some(4), Some(4));
        assert_eq!(selection, Selection::Resume(4));
    }

    #[test]
    fn round_robin_idles_when_nothing_is_left() {
        let mut table = EnvTable::new();
        assert_eq!(Policy::RoundRobin.select(&table, None, None), Selection::Idle);

        // a current environment that stopped being Running does not count
        table.get_mut(4).status = EnvStatus::NotRunnable;
        let selection = Policy::RoundRobin.select(&table, Some(4), Some(4));
        assert_eq!(selection, Selection::Idle);
    }

    #[test]
    fn priority_picks_strict_maximum() {
        let mut table = EnvTable::new();
        runnable(&mut table, 3, 1);
        runnable(&mut table, 8, 4);
        runnable(&mut table, 12, 2);
        let selection = Policy::Priority.select(&table, None, None);
        assert_eq!(selection, Selection::Dispatch(8));
    }

    #[test]
    fn priority_tie_break_keeps_lowest_slot_and_is_deterministic() {
        let mut table = EnvTable::new();
        runnable(&mut table, 10, 3);
        runnable(&mut table, 4, 3);
        runnable(&mut table, 20, 3);
        for _ in 0..3 {
            // no mutation between passes: same answer every time
            let selection = Policy::Priority.select(&table, None, None);
            assert_eq!(selection, Selection::Dispatch(4));
        }
    }

    #[test]
    fn priority_resumes_then_idles_like_round_robin() {
        let mut table = EnvTable::new();
        table.get_mut(7).status = EnvStatus::Running;
        assert_eq!(
            Policy::Priority.select(&table, Some(7), Some(7)),
            Selection::Resume(7)
        );
        table.get_mut(7).status = EnvStatus::Free;
        assert_eq!(Policy::Priority.select(&table, Some(7), Some(7)), Selection::Idle);
    }

    #[test]
    fn min_priority_slots_still_get_selected() {
        let mut table = EnvTable::new();
        runnable(&mut table, 5, MIN_PRIORITY);
        let selection = Policy::Priority.select(&table, None, None);
        assert_eq!(selection, Selection::Dispatch(5));
    }

    #[test]
    fn charge_increments_count_once_per_dispatch() {
        let mut table = EnvTable::new();
        runnable(&mut table, 0, MAX_PRIORITY);
        for expected in 1..MAX_EXECS_BEFORE_DOWNGRADE {
            charge_dispatch(&mut table, 0);
            assert_eq!(table.get(0).execution_count, expected);
            assert_eq!(table.get(0).priority, MAX_PRIORITY);
        }
    }

    #[test]
    fn charge_downgrades_at_the_threshold_and_resets_count() {
        let mut table = EnvTable::new();
        runnable(&mut table, 0, MAX_PRIORITY);
        table.get_mut(0).execution_count = MAX_EXECS_BEFORE_DOWNGRADE - 1;
        charge_dispatch(&mut table, 0);
        assert_eq!(table.get(0).priority, MAX_PRIORITY - 1);
        assert_eq!(table.get(0).execution_count, 0);
    }

    #[test]
    fn min_priority_is_never_downgraded() {
        let mut table = EnvTable::new();
        runnable(&mut table, 0, MIN_PRIORITY);
        table.get_mut(0).execution_count = MAX_EXECS_BEFORE_DOWNGRADE - 1;
        charge_dispatch(&mut table, 0);
        // the count passes the threshold but the priority stays put
        assert_eq!(table.get(0).execution_count, MAX_EXECS_BEFORE_DOWNGRADE);
        assert_eq!(table.get(0).priority, MIN_PRIORITY);
    }

    #[test]
    fn upgrade_fires_after_exactly_the_turn_threshold() {
        let mut table = EnvTable::new();
        runnable(&mut table, 0, MIN_PRIORITY);
        table.get_mut(0).execution_count = 3;
        let mut turns = 0;
        for _ in 0..TURNS_BEFORE_UPGRADE - 1 {
            assert!(!bump_turns(&mut table, &mut turns));
        }
        assert_eq!(table.get(0).priority, MIN_PRIORITY);
        assert!(bump_turns(&mut table, &mut turns));
        assert_eq!(turns, 0);
        assert_eq!(table.get(0).priority, MAX_PRIORITY);
        assert_eq!(table.get(0).execution_count, 0);
    }

    #[test]
    fn five_slot_scenario_under_both_policies() {
        // slots: [Free, Runnable(low), Runnable(high), Running(this CPU), Free]
        let mut table = EnvTable::new();
        runnable(&mut table, 1, 2);
        runnable(&mut table, 2, MAX_PRIORITY);
        table.get_mut(3).status = EnvStatus::Running;

        let selection = Policy::Priority.select(&table, Some(3), Some(3));
        assert_eq!(selection, Selection::Dispatch(2));

        // slot 4 is Free, so the circular scan wraps around to slot 1
        let selection = Policy::RoundRobin.select(&table, Some(3), Some(3));
        assert_eq!(selection, Selection::Dispatch(1));
    }
}
