//! The slice of memory management the scheduler depends on: remembering the
//! address space the kernel booted with and switching back to it when a CPU
//! goes idle, so no user mapping stays loaded on a parked core.

use core::sync::atomic::{AtomicUsize, Ordering};

static KERNEL_SATP: AtomicUsize = AtomicUsize::new(0);

/// capture the kernel address space of the booting hart
pub fn hart_init() {
    KERNEL_SATP.store(current_satp(), Ordering::SeqCst);
}

/// install the kernel's own address space
pub fn load_kernel_space() {
    install_satp(KERNEL_SATP.load(Ordering::SeqCst));
}

#[cfg(target_arch = "riscv64")]
fn current_satp() -> usize {
    riscv::register::satp::read().bits()
}

#[cfg(not(target_arch = "riscv64"))]
fn current_satp() -> usize {
    0
}

#[cfg(target_arch = "riscv64")]
fn install_satp(satp: usize) {
    unsafe {
        riscv::register::satp::write(satp);
        riscv::asm::sfence_vma_all();
    }
}

#[cfg(not(target_arch = "riscv64"))]
fn install_satp(_satp: usize) {}
