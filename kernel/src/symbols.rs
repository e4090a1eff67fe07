// external asm functions
#[cfg(target_arch = "riscv64")]
extern "C" {
    /// `__envvec` in `asm/envvec.S`
    pub fn __envvec();
    /// `__envret` in `asm/envvec.S`
    pub fn __envret(ctx: usize) -> !;
    /// `__kernelvec` in `asm/kernelvec.S`
    pub fn __kernelvec();
    /// `__timervec` in `asm/kernelvec.S`
    pub fn __timervec();
    /// bottom of the per-hart boot stacks in `asm/entry.S`
    pub static __boot_stack: u8;
}

/// Maximum supported CPUs on machine
/// Note that it is bounded by the kernel boot stack in `asm/entry.S`
pub const N_CPUS: usize = 8;

/// Boot stack slice per hart, keep in sync with `asm/entry.S`
pub const BOOT_STACK_SIZE: usize = 16 * 1024;

/// Capacity of the environment table
pub const N_ENVS: usize = 64;

/// Scheduler timer interrupt interval
pub const SCHEDULER_INTERVAL: usize = 1_000_000;
