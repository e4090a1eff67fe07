//! Interactive diagnostic monitor. The idle path loops on `monitor` when the
//! whole system has run out of live environments, so everything here works
//! with interrupts off and the kernel lock still held.

use core::str;

use crate::cpu::{self, CPUS};
use crate::env::{EnvStatus, ENV_TABLE};
use crate::symbols::N_CPUS;
use crate::uart::{Uart, UART_BASE_ADDR};
use crate::{print, println, sched};

const LINE_MAX: usize = 128;

/// Read one command line and execute it
pub fn monitor() {
    print!("K> ");
    let mut buf = [0u8; LINE_MAX];
    let len = read_line(&mut buf);
    let line = match str::from_utf8(&buf[..len]) {
        Ok(line) => line.trim(),
        Err(_) => {
            println!("monitor: input is not utf-8");
            return;
        }
    };
    match line {
        "" => {}
        "help" => help(),
        "envs" => dump_envs(),
        "cpus" => dump_cpus(),
        "sched" => dump_sched(),
        other => println!("unknown command {:?}, try `help`", other),
    }
}

/// Polled line input with echo and backspace. The dead system has no working
/// interrupt path left, polling is all there is.
fn read_line(buf: &mut [u8]) -> usize {
    // bypass the UART lock, nothing else is printing any more
    let uart = Uart::new(UART_BASE_ADDR);
    let mut len = 0;
    loop {
        let byte = match uart.get() {
            Some(byte) => byte,
            None => continue,
        };
        match byte {
            b'\r' | b'\n' => {
                println!();
                return len;
            }
            0x08 | 0x7f => {
                if len > 0 {
                    len -= 1;
                    print!("\x08 \x08");
                }
            }
            byte => {
                if len < buf.len() {
                    buf[len] = byte;
                    len += 1;
                    uart.put(byte);
                }
            }
        }
    }
}

fn help() {
    println!("help  - this listing");
    println!("envs  - occupied environment slots");
    println!("cpus  - per-CPU scheduler state");
    println!("sched - scheduling statistics");
}

fn dump_envs() {
    let table = ENV_TABLE.read();
    let mut occupied = 0;
    for env in table.iter() {
        if env.status == EnvStatus::Free {
            continue;
        }
        occupied += 1;
        println!(
            "slot {:>3}: {:?}, priority {}, execution count {}",
            env.slot_index(),
            env.status,
            env.priority,
            env.execution_count
        );
    }
    println!("{} of {} slots occupied", occupied, table.capacity());
}

fn dump_cpus() {
    for hartid in 0..N_CPUS {
        let cpu = CPUS[hartid].read();
        println!(
            "hart {}: {:?}, current env {:?}, last run {:?}",
            hartid,
            cpu::status(hartid),
            cpu.current_env(),
            cpu.last_run()
        );
    }
}

fn dump_sched() {
    println!("{} decisions since the last upgrade event", sched::turns());
    for hartid in 0..N_CPUS {
        let cpu = CPUS[hartid].read();
        println!("hart {}: {} dispatches", hartid, cpu.dispatch_count());
    }
}
