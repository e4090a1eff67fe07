use core::arch::{asm, global_asm};
use core::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use riscv::register::*;

use crate::symbols::{__boot_stack, BOOT_STACK_SIZE};
use crate::{arch, clint, cpu, env, info, mm, sched, sync, trap, uart};

global_asm!(include_str!("asm/entry.S"));
global_asm!(include_str!("asm/kernelvec.S"));
global_asm!(include_str!("asm/envvec.S"));

bitflags! {
    /// supervisor interrupt-enable bits in the `sie` register
    struct Sie: usize {
        const SSIE = 1 << 1; // software
        const STIE = 1 << 5; // timer
        const SEIE = 1 << 9; // external
    }
}

#[no_mangle]
unsafe extern "C" fn kstart() {
    // we are now in machine mode, on the boot stack `_entry` picked

    // `mret` to supervisor mode
    mstatus::set_mpp(mstatus::MPP::Supervisor);

    // `mret` to `kmain`
    mepc::write(kmain as usize);

    // no paging until `mm::hart_init` captures the boot address space
    asm!("csrw satp, zero");

    // designate all interrupts and exceptions to supervisor mode
    asm!("li t0, 0xffff");
    asm!("csrw medeleg, t0");
    asm!("csrw mideleg, t0");

    // allow external, timer and software interruption in S-mode
    let sie: usize;
    asm!("csrr {}, sie", out(reg) sie);
    asm!("csrw sie, {}", in(reg) sie | Sie::all().bits());

    // save cpuid to tp register
    asm!("csrr a1, mhartid");
    asm!("mv tp, a1");

    // timer interrupt init
    clint::timer_init();

    // to `kmain` in S-mode
    asm!("mret");
}

/// Other harts wait until hart-0 finishes initialising the shared state
static HART0_STARTED: AtomicBool = AtomicBool::new(false);

#[no_mangle]
extern "C" fn kmain() -> ! {
    // we are now in supervisor mode
    let hartid = arch::hart_id();
    if hartid == 0 {
        unsafe { uart::init() };
        info!("booting on hart {}...", hartid);
        info!("UART initialised");

        mm::hart_init();
        trap::init_hart();
        env::init();

        HART0_STARTED.store(true, Ordering::SeqCst);
    } else {
        while !HART0_STARTED.load(Ordering::SeqCst) {
            core::hint::spin_loop();
        }
        info!("hart {} booting...", hartid);

        mm::hart_init();
        trap::init_hart();
    }

    hart_online(hartid);

    // the first pass through the scheduler runs under the kernel lock,
    // exactly like every later re-entry from a trap
    sync::lock_kernel();
    sched::select_and_run()
}

fn hart_online(hartid: usize) {
    let stack_base = unsafe { &__boot_stack as *const u8 as usize };
    let stack_top = stack_base + (hartid + 1) * BOOT_STACK_SIZE;
    {
        let mut cpu = cpu::CPUS[hartid].write();
        cpu.set_kernel_stack_top(stack_top);
    }
    cpu::exchange_status(hartid, cpu::CpuStatus::Started);
    info!("hart {} online, boot stack top {:#x}", hartid, stack_top);
}
