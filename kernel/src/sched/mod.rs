//! Picks the next environment for the calling CPU and runs it, or parks the
//! CPU when there is nothing left to run. Both entry points expect the kernel
//! lock held and neither ever returns: control leaves through a context
//! restore, or through `arch::park` until the next timer interrupt.

use spin::Mutex;

use crate::cpu::{self, CpuStatus, CPUS};
use crate::env::{self, ENV_TABLE};
use crate::{arch, info, mm, monitor, sync};

pub mod policy;

use policy::{Policy, Selection};

// scheduling decisions since the last global upgrade, shared by every CPU
// and only touched with the kernel lock held
static TURNS: Mutex<usize> = Mutex::new(0);

/// Choose an environment to run on this CPU and enter it. Falls through to
/// `halt_cpu` when the whole table yields nothing.
pub fn select_and_run() -> ! {
    debug_assert!(sync::kernel_locked(), "sched::select_and_run: lock not held");
    let hartid = arch::hart_id();
    let policy = Policy::configured();

    let (last_run, current) = {
        let cpu = CPUS[hartid].read();
        (cpu.last_run(), cpu.current_env())
    };

    let selection = {
        let table = ENV_TABLE.read();
        policy.select(&table, last_run, current)
    };

    // priority bookkeeping happens before the hand-off, the dispatch path
    // below does not come back here. A resumed environment is not charged.
    if policy == Policy::Priority {
        let mut table = ENV_TABLE.write();
        if let Selection::Dispatch(slot) = selection {
            policy::charge_dispatch(&mut table, slot);
        }
        let mut turns = TURNS.lock();
        policy::bump_turns(&mut table, &mut turns);
    }

    match selection {
        Selection::Dispatch(slot) | Selection::Resume(slot) => env::env_run(slot),
        Selection::Idle => halt_cpu(),
    }
}

/// Park this CPU until the timer interrupt wakes it up. The step order is
/// load-bearing: the Halted status must be visible before the kernel lock is
/// dropped and before interrupts come back on, or a wakeup on another CPU
/// could see a stale Started status and skip re-acquiring the lock for us.
pub fn halt_cpu() -> ! {
    let hartid = arch::hart_id();

    // for debugging and testing: when nothing in the system is live any
    // more, parking would wait forever for work that cannot appear, so drop
    // into the monitor instead
    if !ENV_TABLE.read().has_live_envs() {
        info!("sched::halt_cpu: no runnable environments in the system!");
        loop {
            monitor::monitor();
        }
    }

    // no environment is loaded on this CPU any more
    let stack_top = {
        let mut cpu = CPUS[hartid].write();
        cpu.clear_current_env();
        cpu.kernel_stack_top()
    };
    mm::load_kernel_space();

    cpu::exchange_status(hartid, CpuStatus::Halted);

    // leaving kernel execution, same as returning to an environment
    sync::unlock_kernel();

    arch::park(stack_top)
}

/// Timer re-entry for a CPU that parked in `halt_cpu`. The Halted status it
/// published is what tells us the kernel lock has to be taken again before
/// any kernel data is touched.
pub fn timer_wakeup() -> ! {
    let hartid = arch::hart_id();
    let prev = cpu::exchange_status(hartid, CpuStatus::Started);
    assert!(
        matches!(prev, CpuStatus::Halted),
        "sched::timer_wakeup: hart-{} woke up without halting",
        hartid
    );
    sync::lock_kernel();
    select_and_run()
}

/// Decisions counted towards the next upgrade event, for the monitor
pub fn turns() -> usize {
    *TURNS.lock()
}
