/// Saved user-space context of an environment.
/// A trap switches altogether onto the CPU's kernel stack, and a trap is not
/// a function call, so every register is saved, be it caller or callee saved.
/// The layout is matched byte for byte by `asm/envvec.S` — keep the offset
/// comments there in sync.
#[repr(C)]
#[derive(Default, Clone, Debug)]
pub struct TrapContext {
    user_regs: [usize; 32], // 0-31: general purpose registers x0..x31
    kernel_sp: usize,       // 32: kernel stack for the next trap
    kernel_hartid: usize,   // 33: goes into tp on trap entry
    sepc: usize,            // 34: user pc to resume at
    trap_handler: usize,    // 35: entry point of `envtrap`
}

const SP: usize = 2;
const A0: usize = 10;

impl TrapContext {
    pub fn set_user_stack(&mut self, addr: usize) {
        self.user_regs[SP] = addr;
    }

    pub fn set_arg0(&mut self, value: usize) {
        self.user_regs[A0] = value;
    }

    pub fn sepc(&self) -> usize {
        self.sepc
    }

    pub fn set_entry_point(&mut self, addr: usize) {
        self.sepc = addr;
    }

    pub fn set_kernel_stack(&mut self, addr: usize) {
        self.kernel_sp = addr;
    }

    pub fn set_kernel_hartid(&mut self, hartid: usize) {
        self.kernel_hartid = hartid;
    }

    pub fn set_trap_handler(&mut self, addr: usize) {
        self.trap_handler = addr;
    }
}
