// the timer itself is armed in machine mode, see `src/clint.rs`;
// this module owns what happens after a trap is taken in supervisor mode

use riscv::register::scause::{self, Trap};

use crate::{arch, cpu, env, info, sched, sync};

#[cfg(target_arch = "riscv64")]
use crate::symbols::{__envret, __envvec, __kernelvec};
#[cfg(target_arch = "riscv64")]
use riscv::register::{sepc, sscratch, sstatus, stvec};

/// install the kernel trap vector on this hart
#[cfg(target_arch = "riscv64")]
pub fn init_hart() {
    unsafe { stvec::write(__kernelvec as usize, stvec::TrapMode::Direct) };
}

#[cfg(not(target_arch = "riscv64"))]
pub fn init_hart() {}

/// Trap taken while in kernel mode. The case that matters is the timer tick
/// reviving a parked CPU; that path re-enters the scheduler and never comes
/// back here.
#[no_mangle]
pub fn kerneltrap() {
    let hartid = arch::hart_id();
    match scause::read().cause() {
        Trap::Interrupt(scause::Interrupt::SupervisorSoft) => {
            // the CLINT tick, forwarded by `__timervec`
            arch::clear_ssip();
            sched::timer_wakeup();
        }
        Trap::Interrupt(scause::Interrupt::SupervisorTimer) => {
            panic!(
                "hart-{:?} kerneltrap: S-mode timer, but ticks arrive as software interrupts",
                hartid
            );
        }
        Trap::Interrupt(intr) => {
            info!("hart-{:?} kerneltrap: S-mode interrupt {:?}", hartid, intr);
        }
        Trap::Exception(e) => {
            // kernel code does not fault
            panic!("hart-{:?} kerneltrap: exception {:?} in kernel code", hartid, e);
        }
    }
}

/// Trap taken from an environment, entered from `__envvec` on this CPU's
/// kernel stack with the environment's registers already saved into its
/// context. Every path out goes through the scheduler.
#[no_mangle]
pub extern "C" fn envtrap() -> ! {
    // back inside the kernel: serialise against the other CPUs
    sync::lock_kernel();
    let hartid = arch::hart_id();
    match scause::read().cause() {
        Trap::Interrupt(scause::Interrupt::SupervisorSoft) => {
            // preemption tick, the environment stays Running and the
            // selector decides whether it keeps the CPU
            arch::clear_ssip();
        }
        Trap::Interrupt(intr) => {
            info!("hart-{:?} envtrap: stray interrupt {:?}", hartid, intr);
        }
        Trap::Exception(e) => {
            // no fault recovery here: take the environment out of the pool
            // and leave the carcass for its owner to reap
            let slot = cpu::current_env().expect("trap::envtrap: exception with no environment");
            info!(
                "hart-{:?} envtrap: exception {:?} in env slot {:?}",
                hartid, e, slot
            );
            let mut table = env::ENV_TABLE.write();
            table.get_mut(slot).status = env::EnvStatus::Dying;
        }
    }
    sched::select_and_run()
}

/// Restore `slot`'s saved user context and leave the kernel through `sret`.
/// Counterpart of `__envvec`; the kernel lock is dropped on the way out.
#[cfg(target_arch = "riscv64")]
pub fn envret(slot: usize) -> ! {
    arch::intr_off();

    let ctx_ptr = {
        // scoped: the guard must not live across the hand-off
        let table = env::ENV_TABLE.read();
        table.context_ptr(slot)
    };

    unsafe {
        // the next trap from this environment lands in `__envvec`,
        // which finds the context through sscratch
        stvec::write(__envvec as usize, stvec::TrapMode::Direct);
        sscratch::write(ctx_ptr as usize);

        // sret drops to user mode and turns interrupts back on
        sstatus::set_spp(sstatus::SPP::User);
        sstatus::set_spie();
        sepc::write((*ctx_ptr).sepc());
    }

    // leaving protected kernel execution; from here only the environment's
    // own registers are touched
    sync::unlock_kernel();

    unsafe { __envret(ctx_ptr as usize) }
}

/// the context restore only exists on the target
#[cfg(not(target_arch = "riscv64"))]
pub fn envret(_slot: usize) -> ! {
    unimplemented!("trap::envret: riscv64 only")
}
