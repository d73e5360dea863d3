use super::{Cpu, Flag};

impl<'a, I, O> Cpu<'a, I, O>
where
    I: FnMut(u8) -> u8,
    O: FnMut(u8, u8),
{
    /// Read the source operand named by a 3-bit SSS field (110 is the
    /// byte at [HL]).
    fn read_src(&mut self, code: u8) -> u8 {
        match code {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => self.at_hl(),
            _ => self.regs.a,
        }
    }

    /// Write the destination operand named by a 3-bit DDD field.
    fn write_dst(&mut self, code: u8, value: u8) {
        match code {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            6 => {
                let addr = self.regs.hl();
                self.write8(addr, value);
            }
            _ => self.regs.a = value,
        }
    }

    /// Branch condition named by a 3-bit CCC field, shared by Jcc, Ccc,
    /// and Rcc: NZ/Z, NC/C, PO/PE, P/M.
    fn condition(&self, code: u8) -> bool {
        match code {
            0 => !self.get_flag(Flag::Z),
            1 => self.get_flag(Flag::Z),
            2 => !self.get_flag(Flag::C),
            3 => self.get_flag(Flag::C),
            4 => !self.get_flag(Flag::P),
            5 => self.get_flag(Flag::P),
            6 => !self.get_flag(Flag::S),
            _ => self.get_flag(Flag::S),
        }
    }

    /// The target address is always fetched, so PC advances past the
    /// operand whether or not the jump is taken.
    fn jmp(&mut self, condition: bool) {
        let addr = self.fetch16();
        if condition {
            self.regs.pc = addr;
        }
    }

    fn call(&mut self, condition: bool) {
        let addr = self.fetch16();
        if condition {
            let pc = self.regs.pc;
            self.push(pc);
            self.regs.pc = addr;
        }
    }

    fn ret(&mut self, condition: bool) {
        if condition {
            self.regs.pc = self.pop();
        }
    }

    fn rst(&mut self, n: u8) {
        let pc = self.regs.pc;
        self.push(pc);
        self.regs.pc = (n as u16) * 8;
    }

    /// Execute a single opcode. Total over all 256 byte values; the
    /// undocumented encodings are folded onto their documented twins
    /// before dispatch.
    pub(crate) fn exec(&mut self, raw: u8) {
        let opcode = match raw {
            // Undocumented NOPs.
            0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => 0x00,
            0xcb => 0xc3,               // JMP
            0xd9 => 0xc9,               // RET
            0xdd | 0xed | 0xfd => 0xcd, // CALL
            _ => raw,
        };

        match opcode {
            // NOP
            0x00 => {}

            // LXI rp, d16
            0x01 => {
                let v = self.fetch16();
                self.regs.set_bc(v);
            }
            0x11 => {
                let v = self.fetch16();
                self.regs.set_de(v);
            }
            0x21 => {
                let v = self.fetch16();
                self.regs.set_hl(v);
            }
            0x31 => {
                self.regs.sp = self.fetch16();
            }

            // STAX / LDAX (BC and DE only)
            0x02 => {
                let addr = self.regs.bc();
                self.write8(addr, self.regs.a);
            }
            0x12 => {
                let addr = self.regs.de();
                self.write8(addr, self.regs.a);
            }
            0x0a => self.regs.a = self.read8(self.regs.bc()),
            0x1a => self.regs.a = self.read8(self.regs.de()),

            // STA / LDA
            0x32 => {
                let addr = self.fetch16();
                self.write8(addr, self.regs.a);
            }
            0x3a => {
                let addr = self.fetch16();
                self.regs.a = self.read8(addr);
            }

            // SHLD / LHLD
            0x22 => {
                let addr = self.fetch16();
                let hl = self.regs.hl();
                self.write16(addr, hl);
            }
            0x2a => {
                let addr = self.fetch16();
                let v = self.read16(addr);
                self.regs.set_hl(v);
            }

            // INX rp
            0x03 => {
                let v = self.regs.bc().wrapping_add(1);
                self.regs.set_bc(v);
            }
            0x13 => {
                let v = self.regs.de().wrapping_add(1);
                self.regs.set_de(v);
            }
            0x23 => {
                let v = self.regs.hl().wrapping_add(1);
                self.regs.set_hl(v);
            }
            0x33 => self.regs.sp = self.regs.sp.wrapping_add(1),

            // DCX rp
            0x0b => {
                let v = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(v);
            }
            0x1b => {
                let v = self.regs.de().wrapping_sub(1);
                self.regs.set_de(v);
            }
            0x2b => {
                let v = self.regs.hl().wrapping_sub(1);
                self.regs.set_hl(v);
            }
            0x3b => self.regs.sp = self.regs.sp.wrapping_sub(1),

            // INR d (00DDD100)
            0x04 | 0x0c | 0x14 | 0x1c | 0x24 | 0x2c | 0x34 | 0x3c => {
                let dst = (opcode >> 3) & 0x07;
                let value = self.read_src(dst);
                let result = self.inr(value);
                self.write_dst(dst, result);
            }

            // DCR d (00DDD101)
            0x05 | 0x0d | 0x15 | 0x1d | 0x25 | 0x2d | 0x35 | 0x3d => {
                let dst = (opcode >> 3) & 0x07;
                let value = self.read_src(dst);
                let result = self.dcr(value);
                self.write_dst(dst, result);
            }

            // MVI d, d8 (00DDD110)
            0x06 | 0x0e | 0x16 | 0x1e | 0x26 | 0x2e | 0x36 | 0x3e => {
                let value = self.fetch8();
                self.write_dst((opcode >> 3) & 0x07, value);
            }

            // DAD rp
            0x09 => {
                let v = self.regs.bc();
                self.dad(v);
            }
            0x19 => {
                let v = self.regs.de();
                self.dad(v);
            }
            0x29 => {
                let v = self.regs.hl();
                self.dad(v);
            }
            0x39 => {
                let v = self.regs.sp;
                self.dad(v);
            }

            // Rotates
            0x07 => self.rlc(),
            0x0f => self.rrc(),
            0x17 => self.ral(),
            0x1f => self.rar(),

            // DAA / CMA / STC / CMC
            0x27 => self.daa(),
            0x2f => self.regs.a = !self.regs.a,
            0x37 => self.set_flag(Flag::C, true),
            0x3f => {
                let c = self.get_flag(Flag::C);
                self.set_flag(Flag::C, !c);
            }

            // HLT (the MOV M,M slot)
            0x76 => self.halted = true,

            // MOV d, s (01DDDSSS)
            0x40..=0x7f => {
                let value = self.read_src(opcode & 0x07);
                self.write_dst((opcode >> 3) & 0x07, value);
            }

            // ALU op on A (10FFFSSS)
            0x80..=0xbf => {
                let value = self.read_src(opcode & 0x07);
                match (opcode >> 3) & 0x07 {
                    0 => self.add(value),
                    1 => self.adc(value),
                    2 => self.sub(value),
                    3 => self.sbb(value),
                    4 => self.ana(value),
                    5 => self.xra(value),
                    6 => self.ora(value),
                    _ => self.cmp(value),
                }
            }

            // ALU op with immediate (11FFF110)
            0xc6 => {
                let v = self.fetch8();
                self.add(v);
            }
            0xce => {
                let v = self.fetch8();
                self.adc(v);
            }
            0xd6 => {
                let v = self.fetch8();
                self.sub(v);
            }
            0xde => {
                let v = self.fetch8();
                self.sbb(v);
            }
            0xe6 => {
                let v = self.fetch8();
                self.ana(v);
            }
            0xee => {
                let v = self.fetch8();
                self.xra(v);
            }
            0xf6 => {
                let v = self.fetch8();
                self.ora(v);
            }
            0xfe => {
                let v = self.fetch8();
                self.cmp(v);
            }

            // RET cc (11CCC000) / RET
            0xc0 | 0xc8 | 0xd0 | 0xd8 | 0xe0 | 0xe8 | 0xf0 | 0xf8 => {
                let cond = self.condition((opcode >> 3) & 0x07);
                self.ret(cond);
            }
            0xc9 => self.ret(true),

            // JMP cc (11CCC010) / JMP
            0xc2 | 0xca | 0xd2 | 0xda | 0xe2 | 0xea | 0xf2 | 0xfa => {
                let cond = self.condition((opcode >> 3) & 0x07);
                self.jmp(cond);
            }
            0xc3 => self.jmp(true),

            // CALL cc (11CCC100) / CALL
            0xc4 | 0xcc | 0xd4 | 0xdc | 0xe4 | 0xec | 0xf4 | 0xfc => {
                let cond = self.condition((opcode >> 3) & 0x07);
                self.call(cond);
            }
            0xcd => self.call(true),

            // RST n (11NNN111)
            0xc7 | 0xcf | 0xd7 | 0xdf | 0xe7 | 0xef | 0xf7 | 0xff => {
                self.rst((opcode >> 3) & 0x07);
            }

            // PUSH rp (PSW as the fourth pair)
            0xc5 => {
                let v = self.regs.bc();
                self.push(v);
            }
            0xd5 => {
                let v = self.regs.de();
                self.push(v);
            }
            0xe5 => {
                let v = self.regs.hl();
                self.push(v);
            }
            0xf5 => {
                let v = self.regs.psw();
                self.push(v);
            }

            // POP rp
            0xc1 => {
                let v = self.pop();
                self.regs.set_bc(v);
            }
            0xd1 => {
                let v = self.pop();
                self.regs.set_de(v);
            }
            0xe1 => {
                let v = self.pop();
                self.regs.set_hl(v);
            }
            0xf1 => {
                // set_psw re-applies the hardwired flag bits.
                let v = self.pop();
                self.regs.set_psw(v);
            }

            // XCHG
            0xeb => {
                core::mem::swap(&mut self.regs.d, &mut self.regs.h);
                core::mem::swap(&mut self.regs.e, &mut self.regs.l);
            }

            // XTHL: swap HL with the word at [SP]
            0xe3 => {
                let stacked = self.at_sp();
                let hl = self.regs.hl();
                self.set_at_sp(hl);
                self.regs.set_hl(stacked);
            }

            // SPHL / PCHL
            0xf9 => self.regs.sp = self.regs.hl(),
            0xe9 => self.regs.pc = self.regs.hl(),

            // IN / OUT
            0xdb => {
                let port = self.fetch8();
                self.regs.a = (self.port_in)(port);
            }
            0xd3 => {
                let port = self.fetch8();
                (self.port_out)(port, self.regs.a);
            }

            // DI / EI
            0xf3 => self.ime = false,
            0xfb => self.ime = true,

            // Every byte value is handled above once the undocumented
            // encodings are folded in.
            _ => unreachable!("unhandled opcode {:#04x}", opcode),
        }
    }
}
