use core::fmt::Write;
use lazy_static::lazy_static;

use spin::Mutex;

pub const UART_BASE_ADDR: usize = 0x1000_0000;

// the 16550 UART control registers, offsets from the base address.
// some have different meanings for read vs write.
const RHR: usize = 0; // receive holding register (for input bytes)
const THR: usize = 0; // transmit holding register (for output bytes)
const IER: usize = 1; // interrupt enable register
const FCR: usize = 2; // FIFO control register
const LCR: usize = 3; // line control register
const LSR: usize = 5; // line status register

const LSR_RX_READY: u8 = 1 << 0; // a byte is waiting in RHR
const LSR_TX_IDLE: u8 = 1 << 5; // THR can accept another character to send

pub struct Uart {
    base_addr: usize,
}

impl Uart {
    pub fn new(base_addr: usize) -> Self {
        Uart { base_addr }
    }

    /// non-blocking read of one byte, the monitor polls this
    pub fn get(&self) -> Option<u8> {
        let ptr = self.base_addr as *mut u8;
        if unsafe { ptr.add(LSR).read_volatile() } & LSR_RX_READY == 0 {
            None
        } else {
            Some(unsafe { ptr.add(RHR).read_volatile() })
        }
    }

    pub fn put(&self, c: u8) {
        let ptr = self.base_addr as *mut u8;
        loop {
            if unsafe { ptr.add(LSR).read_volatile() } & LSR_TX_IDLE != 0 {
                break;
            }
        }
        unsafe {
            ptr.add(THR).write_volatile(c);
        }
    }

    pub fn init(&mut self) {
        let ptr = self.base_addr as *mut u8;
        unsafe {
            // 8-bit words: bits 0 and 1 of the line control register
            let lcr = (1 << 0) | (1 << 1);
            ptr.add(LCR).write_volatile(lcr);

            // enable the FIFO
            ptr.add(FCR).write_volatile(1 << 0);

            // enable receiver buffer interrupts
            ptr.add(IER).write_volatile(1 << 0);

            // set the baud divisor: open the divisor latch (DLAB, LCR bit 7),
            // write the divisor into DLL/DLM and close the latch again.
            // qemu does not care about the actual rate.
            let divisor: u16 = 592;
            ptr.add(LCR).write_volatile(lcr | 1 << 7);
            ptr.add(0).write_volatile((divisor & 0xff) as u8);
            ptr.add(1).write_volatile((divisor >> 8) as u8);
            ptr.add(LCR).write_volatile(lcr);
        }
    }
}

impl Write for Uart {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.bytes() {
            self.put(c);
        }
        Ok(())
    }
}

// we want a function that returns a unified UART object
lazy_static! {
    pub static ref UART: Mutex<Uart> = Mutex::new(Uart::new(UART_BASE_ADDR));
}

pub unsafe fn init() {
    UART.lock().init();
}
