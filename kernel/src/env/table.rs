use lazy_static::lazy_static;
use spin::RwLock;

use super::context::TrapContext;
use super::env::{Env, MAX_PRIORITY};
use crate::symbols::N_ENVS;

lazy_static! {
    // read heavy: a selection pass only reads, mutation happens on dispatch
    // and at the upgrade event. Cross-CPU ordering comes from the kernel
    // lock, the RwLock guards the structure itself.
    pub static ref ENV_TABLE: RwLock<EnvTable> = RwLock::new(EnvTable::new());
}

/// Fixed arena of environment slots, indexed by `slot_index`
pub struct EnvTable {
    envs: [Env; N_ENVS],
}

impl EnvTable {
    pub fn new() -> Self {
        Self {
            envs: core::array::from_fn(Env::new),
        }
    }

    pub fn capacity(&self) -> usize {
        self.envs.len()
    }

    pub fn get(&self, slot: usize) -> &Env {
        &self.envs[slot]
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut Env {
        &mut self.envs[slot]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Env> {
        self.envs.iter()
    }

    /// Is there any work left in the whole system?
    pub fn has_live_envs(&self) -> bool {
        self.envs.iter().any(|env| env.is_live())
    }

    /// The upgrade event: every slot back to MAX_PRIORITY with a fresh count,
    /// so nothing can be held down forever
    pub fn upgrade_all(&mut self) {
        for env in self.envs.iter_mut() {
            env.priority = MAX_PRIORITY;
            env.execution_count = 0;
        }
    }

    /// Stable address of a slot's saved context; the table is a static arena
    /// so the pointer stays valid after the guard is dropped
    pub fn context_ptr(&self, slot: usize) -> *const TrapContext {
        &self.envs[slot].context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::env::{EnvStatus, MIN_PRIORITY};

    #[test]
    fn fresh_table_is_free_at_max_priority() {
        let table = EnvTable::new();
        assert_eq!(table.capacity(), N_ENVS);
        for (slot, env) in table.iter().enumerate() {
            assert_eq!(env.slot_index(), slot);
            assert_eq!(env.status, EnvStatus::Free);
            assert_eq!(env.priority, MAX_PRIORITY);
            assert_eq!(env.execution_count, 0);
        }
        assert!(!table.has_live_envs());
    }

    #[test]
    fn liveness_counts_runnable_running_and_dying() {
        let mut table = EnvTable::new();
        for status in [EnvStatus::Runnable, EnvStatus::Running, EnvStatus::Dying] {
            table.get_mut(7).status = status;
            assert!(table.has_live_envs());
        }
        for status in [EnvStatus::Free, EnvStatus::NotRunnable] {
            table.get_mut(7).status = status;
            assert!(!table.has_live_envs());
        }
    }

    #[test]
    fn upgrade_resets_priority_and_count_everywhere() {
        let mut table = EnvTable::new();
        for slot in [0, 3, N_ENVS - 1] {
            let env = table.get_mut(slot);
            env.priority = MIN_PRIORITY;
            env.execution_count = 9;
        }
        table.upgrade_all();
        for env in table.iter() {
            assert_eq!(env.priority, MAX_PRIORITY);
            assert_eq!(env.execution_count, 0);
        }
    }
}
