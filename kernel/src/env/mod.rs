use crate::{arch, cpu::CPUS, debug, info, trap};

pub mod context;
pub mod env;
pub mod table;

pub use env::{Env, EnvStatus, MAX_PRIORITY, MIN_PRIORITY};
pub use table::{EnvTable, ENV_TABLE};

pub fn init() {
    // force the lazy table into existence before the first scheduling pass
    let table = ENV_TABLE.read();
    info!("env: table ready, {} slots", table.capacity());
}

/// Dispatch `slot` on the calling CPU. Expects the kernel lock held.
/// Control leaves through the context restore and does not come back, so
/// every guard is scoped to drop before the hand-off.
pub fn env_run(slot: usize) -> ! {
    let hartid = arch::hart_id();
    {
        let mut table = ENV_TABLE.write();
        let mut cpu = CPUS[hartid].write();

        if let Some(prev) = cpu.current_env() {
            if prev != slot && table.get(prev).status == EnvStatus::Running {
                // preempted mid-run, back into the pool
                table.get_mut(prev).status = EnvStatus::Runnable;
            }
        }

        let stack_top = cpu.kernel_stack_top();
        let env = table.get_mut(slot);
        assert!(
            matches!(env.status, EnvStatus::Runnable | EnvStatus::Running),
            "env::env_run: slot {} is not dispatchable",
            slot
        );
        env.status = EnvStatus::Running;

        // the environment may have migrated, restamp the kernel re-entry
        // fields for this CPU
        env.context.set_kernel_stack(stack_top);
        env.context.set_kernel_hartid(hartid);
        env.context.set_trap_handler(trap::envtrap as usize);

        cpu.note_dispatch(slot);
        debug!("env::env_run: hart-{:?} entering slot {:?}", hartid, slot);
    }
    trap::envret(slot)
}
