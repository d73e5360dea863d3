pub mod cpm;
pub mod hex;

use std::path::PathBuf;

use anyhow::{Context, Result};
use okto_8080::{Cpu, Flag, Registers, MEMORY_SIZE};

/// How to run a program image.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub image: PathBuf,
    /// Load address for raw images, and the start address for everything.
    /// Intel HEX images carry their own load addresses.
    pub origin: u16,
    /// Install the CP/M console shim (HLT at 0x0000, BDOS entry at 0x0005)
    /// before starting.
    pub cpm: bool,
}

/// Load the image and run it until the CPU halts.
///
/// Console output arrives through `OUT 1`; input ports read as zero. A
/// program that never halts keeps this function running, the same as it
/// would keep the real chip running.
pub fn run(config: &RunConfig) -> Result<()> {
    let data = std::fs::read(&config.image)
        .with_context(|| format!("failed to read {}", config.image.display()))?;

    let mut mem = Box::new([0u8; MEMORY_SIZE]);
    let mut cpu = Cpu::new(
        |_port| 0,
        |port, data| {
            if port == cpm::CONSOLE_PORT {
                print!("{}", data as char);
            }
        },
        &mut mem,
    );

    let is_hex = config
        .image
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hex"));
    if is_hex {
        let text = String::from_utf8(data).context("HEX image is not valid text")?;
        for record in hex::parse(&text)? {
            cpu.load(record.address, &record.data);
        }
    } else {
        cpu.load(config.origin, &data);
    }

    if config.cpm {
        cpm::install(&mut cpu);
    }

    cpu.regs.pc = config.origin;
    log::info!(
        "running {} from {:#06x}",
        config.image.display(),
        config.origin
    );

    while !cpu.is_halted() {
        cpu.step();
    }

    log::debug!("CPU halted: {}", dump(&cpu.regs));
    Ok(())
}

/// One-line diagnostic register dump.
pub fn dump(regs: &Registers) -> String {
    format!(
        "A={:02x} B={:02x} C={:02x} D={:02x} E={:02x} H={:02x} L={:02x} \
         SP={:04x} PC={:04x} | S={} Z={} A={} P={} C={}",
        regs.a,
        regs.b,
        regs.c,
        regs.d,
        regs.e,
        regs.h,
        regs.l,
        regs.sp,
        regs.pc,
        regs.get_flag(Flag::S) as u8,
        regs.get_flag(Flag::Z) as u8,
        regs.get_flag(Flag::AC) as u8,
        regs.get_flag(Flag::P) as u8,
        regs.get_flag(Flag::C) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_shows_registers_and_flags() {
        let mut regs = Registers::default();
        regs.a = 0xAB;
        regs.sp = 0x1234;
        regs.set_flag(Flag::Z, true);

        let line = dump(&regs);
        assert!(line.contains("A=ab"));
        assert!(line.contains("SP=1234"));
        assert!(line.contains("Z=1"));
        assert!(line.contains("C=0"));
    }
}
