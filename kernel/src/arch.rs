use core::time::Duration;

#[cfg(target_arch = "riscv64")]
use core::arch::asm;
#[cfg(target_arch = "riscv64")]
use riscv::register::sstatus;

#[cfg(target_arch = "riscv64")]
pub fn hart_id() -> usize {
    let hart_id: usize;
    unsafe {
        asm!("mv {}, tp", out(reg) hart_id);
    }
    hart_id
}

/// single-hart stand-in so the scheduling logic runs on the host
#[cfg(not(target_arch = "riscv64"))]
pub fn hart_id() -> usize {
    0
}

#[cfg(target_arch = "riscv64")]
pub fn time() -> Duration {
    let mtime = crate::clint::CLINT_MTIME_BASE as *mut u64;
    let time = unsafe { mtime.read_volatile() };
    Duration::from_nanos(time)
}

#[cfg(not(target_arch = "riscv64"))]
pub fn time() -> Duration {
    Duration::ZERO
}

#[cfg(target_arch = "riscv64")]
pub fn intr_on() {
    unsafe { sstatus::set_sie() }
}

#[cfg(not(target_arch = "riscv64"))]
pub fn intr_on() {}

#[cfg(target_arch = "riscv64")]
pub fn intr_off() {
    unsafe { sstatus::clear_sie() }
}

#[cfg(not(target_arch = "riscv64"))]
pub fn intr_off() {}

/// Acknowledge the supervisor software interrupt the CLINT trampoline raised
/// for the current tick
#[cfg(target_arch = "riscv64")]
pub fn clear_ssip() {
    unsafe {
        asm!("csrc sip, {}", in(reg) 2usize);
    }
}

#[cfg(not(target_arch = "riscv64"))]
pub fn clear_ssip() {}

/// Park the calling CPU on its own boot stack until an interrupt arrives.
/// Anything that wakes the core other than the trap vector re-halts at once,
/// hence the loop around `wfi`.
#[cfg(target_arch = "riscv64")]
pub fn park(kernel_stack_top: usize) -> ! {
    unsafe {
        asm!(
            "mv sp, {stack}",
            "csrsi sstatus, 2", // SIE: take interrupts from here on
            "1:",
            "wfi",
            "j 1b",
            stack = in(reg) kernel_stack_top,
            options(noreturn),
        )
    }
}

#[cfg(not(target_arch = "riscv64"))]
pub fn park(_kernel_stack_top: usize) -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(target_arch = "riscv64")]
pub fn wait_forever() -> ! {
    loop {
        unsafe {
            asm!("wfi");
        }
    }
}

#[cfg(not(target_arch = "riscv64"))]
pub fn wait_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
