use spin::Mutex;

// One flat lock serialises the kernel data structures across CPUs: the
// environment table, the per-CPU blocks and the scheduler's turn counter
// all change only while it is held. The per-CPU idle-status word in
// `cpu` is the single field read outside of it.
static KERNEL_LOCK: Mutex<()> = Mutex::new(());

/// Acquire the big kernel lock. Kernel entry and exit do not nest lexically,
/// so the guard is forgotten here and paired with `unlock_kernel` on
/// whichever path leaves the kernel.
pub fn lock_kernel() {
    let guard = KERNEL_LOCK.lock();
    core::mem::forget(guard);
}

/// Release the big kernel lock.
pub fn unlock_kernel() {
    debug_assert!(KERNEL_LOCK.is_locked(), "sync::unlock_kernel: not locked");
    // safety: paired with the guard forgotten in `lock_kernel`
    unsafe { KERNEL_LOCK.force_unlock() }
}

pub fn kernel_locked() -> bool {
    KERNEL_LOCK.is_locked()
}
