use core::sync::atomic::{AtomicUsize, Ordering};

use lazy_static::lazy_static;
use primitive_enum::primitive_enum;
use spin::RwLock;

use crate::{arch::hart_id, symbols::N_CPUS};

lazy_static! {
    pub static ref CPUS: [RwLock<PercpuBlock>; N_CPUS] =
        core::array::from_fn(|hartid| RwLock::new(PercpuBlock::new(hartid)));
}

primitive_enum! {
CpuStatus usize;
    Unused = 0,
    Started = 1,
    Halted = 2,
}

// The status words live outside the locked per-CPU blocks: a timer interrupt
// on a parked CPU reads its own status before it holds the kernel lock, so
// these are plain atomics mutated by exchange.
static CPU_STATUS: [AtomicUsize; N_CPUS] = {
    const UNUSED: AtomicUsize = AtomicUsize::new(CpuStatus::Unused as usize);
    [UNUSED; N_CPUS]
};

/// Swap in a new status for `hartid`, returning the old one
pub fn exchange_status(hartid: usize, status: CpuStatus) -> CpuStatus {
    let prev = CPU_STATUS[hartid].swap(status as usize, Ordering::SeqCst);
    CpuStatus::from(prev).expect("cpu::exchange_status: corrupt status word")
}

pub fn status(hartid: usize) -> CpuStatus {
    let raw = CPU_STATUS[hartid].load(Ordering::SeqCst);
    CpuStatus::from(raw).expect("cpu::status: corrupt status word")
}

#[derive(Debug)]
pub struct PercpuBlock {
    hartid: usize,
    // slot of the environment loaded on this CPU, if any
    current_env: Option<usize>,
    // slot most recently dispatched here; survives idle periods so the
    // round-robin scan resumes where it left off
    last_run: Option<usize>,
    kernel_stack_top: usize,
    dispatch_count: usize,
}

impl PercpuBlock {
    fn new(hartid: usize) -> Self {
        Self {
            hartid,
            current_env: None,
            last_run: None,
            kernel_stack_top: 0,
            dispatch_count: 0,
        }
    }

    pub fn hartid(&self) -> usize {
        self.hartid
    }

    pub fn current_env(&self) -> Option<usize> {
        self.current_env
    }

    pub fn clear_current_env(&mut self) {
        self.current_env = None;
    }

    pub fn last_run(&self) -> Option<usize> {
        self.last_run
    }

    /// Record `slot` as the environment this CPU is about to enter
    pub fn note_dispatch(&mut self, slot: usize) {
        self.current_env = Some(slot);
        self.last_run = Some(slot);
        self.dispatch_count += 1;
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatch_count
    }

    pub fn kernel_stack_top(&self) -> usize {
        self.kernel_stack_top
    }

    pub fn set_kernel_stack_top(&mut self, addr: usize) {
        self.kernel_stack_top = addr;
    }
}

/// returns the slot of the environment running on the calling CPU
pub fn current_env() -> Option<usize> {
    let hartid = hart_id();
    let cpu = CPUS[hartid].read();
    assert_eq!(cpu.hartid, hartid);
    cpu.current_env
}
