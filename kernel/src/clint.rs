use crate::{
    arch::hart_id,
    symbols::{__timervec, N_CPUS, SCHEDULER_INTERVAL},
};
use riscv::register::*;

// core local interruptor (CLINT), which contains the timer.
pub const CLINT_BASE: usize = 0x200_0000;
pub const CLINT_MTIME_BASE: usize = CLINT_BASE + 0xbff8;
pub const CLINT_MTIMECMP_BASE: usize = CLINT_BASE + 0x4000;

#[allow(non_snake_case)]
pub const fn CLINT_TIMECMP(hart: usize) -> usize {
    CLINT_MTIMECMP_BASE + 8 * hart
}

/// scratch area for the timer trap, one per core;
/// `__timervec` in `asm/kernelvec.S` reads it through mscratch
#[repr(C)]
#[derive(Clone, Copy)]
struct TimerScratch {
    tmp_regs: [usize; 3], // space for the vector to park a1-a3
    mtime_addr: usize,
    mtimecmp_addr: usize,
    interval: usize,
}

static mut TIMER_SCRATCHES: [TimerScratch; N_CPUS] = [TimerScratch {
    tmp_regs: [0; 3],
    mtime_addr: 0,
    mtimecmp_addr: 0,
    interval: 0,
}; N_CPUS];

/// Arm the periodic timer on the calling hart. Machine mode only, called
/// once from `kstart` before the `mret` into supervisor mode.
pub unsafe fn timer_init() {
    let id = hart_id();
    let mtime = CLINT_MTIME_BASE as *mut u64;

    // first tick fires one interval from now
    let interval = SCHEDULER_INTERVAL as u64;
    let mtimecmp = CLINT_TIMECMP(id) as *mut u64;
    mtimecmp.write_volatile(mtime.read_volatile() + interval);

    // hand `__timervec` what it needs to reprogram the comparator
    let scratch = &mut *core::ptr::addr_of_mut!(TIMER_SCRATCHES[id]);
    scratch.mtime_addr = mtime as usize;
    scratch.mtimecmp_addr = mtimecmp as usize;
    scratch.interval = interval as usize;
    mscratch::write(scratch as *const TimerScratch as usize);

    // M-mode traps go to `__timervec`
    mtvec::write(__timervec as usize, mtvec::TrapMode::Direct);

    // enable M-mode interrupts, and the M-mode timer interrupt in particular
    mstatus::set_mie();
    mie::set_mtimer()
}
