use crate::{
    bus::{Bus, Interrupt},
    io,
};

// CPU flag bits as documented in gbdev.io/pandocs/The_CPU_Flags.html
pub const FLAG_Z: u8 = 0x80; // Zero
pub const FLAG_N: u8 = 0x40; // Subtract
pub const FLAG_H: u8 = 0x20; // Half Carry
pub const FLAG_C: u8 = 0x10; // Carry

// Post-boot CPU state from gbdev.io/pandocs/Power_Up_State.html
const BOOT_AF: u16 = 0x01B0;
const BOOT_BC: u16 = 0x0013;
const BOOT_DE: u16 = 0x00D8;
const BOOT_HL: u16 = 0x014D;
const BOOT_SP: u16 = 0xFFFE;
const BOOT_PC: u16 = 0x0100;

/// Opcodes with no defined behavior on the LR35902.
const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

#[cfg(feature = "cpu-trace")]
macro_rules! cpu_trace {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}

#[cfg(not(feature = "cpu-trace"))]
macro_rules! cpu_trace {
    ($($arg:tt)*) => {};
}

/// Non-fatal events worth surfacing to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    IllegalOpcode { pc: u16, opcode: u8 },
}

pub struct Cpu {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub pc: u16,
    pub sp: u16,
    /// Machine cycles executed since power-on.
    pub cycles: u64,
    pub ime: bool,
    pub halted: bool,
    pub stopped: bool,
    /// EI executed; IME turns on before the next instruction runs.
    ime_pending: bool,
    halt_bug: bool,
    /// Machine cycles spent by the current `execute` call.
    elapsed: u32,
    diagnostics: Vec<Diagnostic>,
}

impl Cpu {
    /// CPU in the post-boot register state.
    pub fn new() -> Self {
        let mut cpu = Self {
            a: 0,
            f: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            pc: BOOT_PC,
            sp: BOOT_SP,
            cycles: 0,
            ime: false,
            halted: false,
            stopped: false,
            ime_pending: false,
            halt_bug: false,
            elapsed: 0,
            diagnostics: Vec::new(),
        };
        cpu.set_af(BOOT_AF);
        cpu.set_bc(BOOT_BC);
        cpu.set_de(BOOT_DE);
        cpu.set_hl(BOOT_HL);
        cpu
    }

    pub fn get_af(&self) -> u16 {
        ((self.a as u16) << 8) | self.f as u16
    }

    /// The low nibble of F is hardwired to zero.
    pub fn set_af(&mut self, val: u16) {
        self.a = (val >> 8) as u8;
        self.f = val as u8 & 0xF0;
    }

    pub fn get_bc(&self) -> u16 {
        ((self.b as u16) << 8) | self.c as u16
    }

    pub fn set_bc(&mut self, val: u16) {
        self.b = (val >> 8) as u8;
        self.c = val as u8;
    }

    pub fn get_de(&self) -> u16 {
        ((self.d as u16) << 8) | self.e as u16
    }

    pub fn set_de(&mut self, val: u16) {
        self.d = (val >> 8) as u8;
        self.e = val as u8;
    }

    pub fn get_hl(&self) -> u16 {
        ((self.h as u16) << 8) | self.l as u16
    }

    pub fn set_hl(&mut self, val: u16) {
        self.h = (val >> 8) as u8;
        self.l = val as u8;
    }

    pub fn flag(&self, mask: u8) -> bool {
        self.f & mask != 0
    }

    pub fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.f |= mask;
        } else {
            self.f &= !mask;
        }
    }

    /// Formatted CPU state string for debugging.
    pub fn debug_state(&self) -> String {
        format!(
            "AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} PC:{:04X} SP:{:04X} CY:{}",
            self.get_af(),
            self.get_bc(),
            self.get_de(),
            self.get_hl(),
            self.pc,
            self.sp,
            self.cycles
        )
    }

    /// Drain diagnostics recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Run one instruction (plus any interrupt dispatch in front of it) and
    /// return the machine cycles it took.
    pub fn execute(&mut self, bus: &mut Bus) -> u32 {
        self.elapsed = 0;

        if self.stopped {
            if bus.raw(io::IF) & Interrupt::Joypad.bit() == 0 {
                return self.finish(1);
            }
            self.stopped = false;
        }

        self.handle_interrupts(bus);

        if self.halted {
            return self.finish(1);
        }

        if self.ime_pending {
            self.ime = true;
            self.ime_pending = false;
        }

        let pc = self.pc;
        let opcode = if self.halt_bug {
            self.halt_bug = false;
            self.read8(bus, self.pc)
        } else {
            self.fetch8(bus)
        };
        cpu_trace!("{:04X}: {:02X} {}", pc, opcode, self.debug_state());
        self.execute_opcode(bus, pc, opcode);

        self.finish(0)
    }

    fn finish(&mut self, extra: u32) -> u32 {
        self.elapsed += extra;
        self.cycles += self.elapsed as u64;
        self.elapsed
    }

    fn handle_interrupts(&mut self, bus: &mut Bus) {
        let pending = bus.raw(io::IE) & bus.raw(io::IF) & 0x1F;
        if pending == 0 {
            return;
        }
        // Any pending request ends HALT, even with IME clear.
        self.halted = false;
        if !self.ime {
            return;
        }
        let Some(interrupt) = Interrupt::highest(pending) else {
            return;
        };
        self.ime = false;
        bus.set_raw(io::IF, bus.raw(io::IF) & !interrupt.bit());
        self.idle(2);
        self.push_stack(bus, self.pc);
        self.idle(1);
        self.pc = interrupt.vector();
    }

    fn idle(&mut self, m_cycles: u32) {
        self.elapsed += m_cycles;
    }

    fn fetch8(&mut self, bus: &mut Bus) -> u8 {
        let val = self.read8(bus, self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    fn fetch16(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.fetch8(bus) as u16;
        let hi = self.fetch8(bus) as u16;
        (hi << 8) | lo
    }

    fn read8(&mut self, bus: &mut Bus, addr: u16) -> u8 {
        self.elapsed += 1;
        bus.read(addr)
    }

    fn write8(&mut self, bus: &mut Bus, addr: u16, val: u8) {
        self.elapsed += 1;
        bus.write(addr, val);
    }

    fn push_stack(&mut self, bus: &mut Bus, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.write8(bus, self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.write8(bus, self.sp, val as u8);
    }

    fn pop_stack(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.read8(bus, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let hi = self.read8(bus, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    /// 8-bit operand by its 3-bit encoding; 6 is (HL).
    fn read_reg(&mut self, bus: &mut Bus, index: u8) -> u8 {
        match index & 0x07 {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => self.read8(bus, self.get_hl()),
            _ => self.a,
        }
    }

    fn write_reg(&mut self, bus: &mut Bus, index: u8, val: u8) {
        match index & 0x07 {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            6 => {
                let addr = self.get_hl();
                self.write8(bus, addr, val);
            }
            _ => self.a = val,
        }
    }

    /// 16-bit pair by its 2-bit encoding with SP in slot 3.
    fn read_rr(&self, index: u8) -> u16 {
        match index & 0x03 {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => self.get_hl(),
            _ => self.sp,
        }
    }

    fn write_rr(&mut self, index: u8, val: u16) {
        match index & 0x03 {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => self.set_hl(val),
            _ => self.sp = val,
        }
    }

    fn condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x03 {
            0 => !self.flag(FLAG_Z),
            1 => self.flag(FLAG_Z),
            2 => !self.flag(FLAG_C),
            _ => self.flag(FLAG_C),
        }
    }

    fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        self.f = if z { FLAG_Z } else { 0 }
            | if n { FLAG_N } else { 0 }
            | if h { FLAG_H } else { 0 }
            | if c { FLAG_C } else { 0 };
    }

    fn add8(&mut self, val: u8, carry: bool) {
        let c = carry as u16;
        let sum = self.a as u16 + val as u16 + c;
        let half = (self.a & 0x0F) as u16 + (val & 0x0F) as u16 + c > 0x0F;
        self.a = sum as u8;
        self.set_flags(self.a == 0, false, half, sum > 0xFF);
    }

    fn sub8(&mut self, val: u8, carry: bool) -> u8 {
        let c = carry as u16;
        let res = (self.a as u16).wrapping_sub(val as u16).wrapping_sub(c) as u8;
        let half = ((self.a & 0x0F) as u16) < (val & 0x0F) as u16 + c;
        let borrow = (self.a as u16) < val as u16 + c;
        self.set_flags(res == 0, true, half, borrow);
        res
    }

    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP selected by bits 3-5 of the opcode.
    fn alu(&mut self, op: u8, val: u8) {
        let carry = self.flag(FLAG_C);
        match op & 0x07 {
            0 => self.add8(val, false),
            1 => self.add8(val, carry),
            2 => self.a = self.sub8(val, false),
            3 => self.a = self.sub8(val, carry),
            4 => {
                self.a &= val;
                self.set_flags(self.a == 0, false, true, false);
            }
            5 => {
                self.a ^= val;
                self.set_flags(self.a == 0, false, false, false);
            }
            6 => {
                self.a |= val;
                self.set_flags(self.a == 0, false, false, false);
            }
            _ => {
                self.sub8(val, false);
            }
        }
    }

    fn inc8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_add(1);
        let c = self.flag(FLAG_C);
        self.set_flags(res == 0, false, val & 0x0F == 0x0F, c);
        res
    }

    fn dec8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_sub(1);
        let c = self.flag(FLAG_C);
        self.set_flags(res == 0, true, val & 0x0F == 0, c);
        res
    }

    fn add16_hl(&mut self, val: u16) {
        let hl = self.get_hl();
        let half = (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF;
        let carry = hl as u32 + val as u32 > 0xFFFF;
        let z = self.flag(FLAG_Z);
        self.set_flags(z, false, half, carry);
        self.set_hl(hl.wrapping_add(val));
    }

    /// SP plus a signed immediate; flags come from the unsigned low byte.
    fn sp_offset(&mut self, offset: u8) -> u16 {
        let sp = self.sp;
        let half = (sp & 0x0F) + (offset & 0x0F) as u16 > 0x0F;
        let carry = (sp & 0xFF) + offset as u16 > 0xFF;
        self.set_flags(false, false, half, carry);
        sp.wrapping_add(offset as i8 as i16 as u16)
    }

    fn daa(&mut self) {
        let n = self.flag(FLAG_N);
        let mut carry = self.flag(FLAG_C);
        let mut adjust = 0u8;
        if self.flag(FLAG_H) || (!n && self.a & 0x0F > 0x09) {
            adjust |= 0x06;
        }
        if carry || (!n && self.a > 0x99) {
            adjust |= 0x60;
            carry = true;
        }
        self.a = if n {
            self.a.wrapping_sub(adjust)
        } else {
            self.a.wrapping_add(adjust)
        };
        self.set_flags(self.a == 0, n, false, carry);
    }

    /// Rotates and shifts shared by the accumulator forms and the CB page.
    fn shift(&mut self, op: u8, val: u8) -> u8 {
        let carry_in = self.flag(FLAG_C) as u8;
        let (res, carry) = match op & 0x07 {
            0 => (val.rotate_left(1), val & 0x80 != 0),
            1 => (val.rotate_right(1), val & 0x01 != 0),
            2 => ((val << 1) | carry_in, val & 0x80 != 0),
            3 => ((val >> 1) | (carry_in << 7), val & 0x01 != 0),
            4 => (val << 1, val & 0x80 != 0),
            5 => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
            6 => (val.rotate_left(4), false),
            _ => (val >> 1, val & 0x01 != 0),
        };
        self.set_flags(res == 0, false, false, carry);
        res
    }

    fn handle_cb(&mut self, bus: &mut Bus) {
        let opcode = self.fetch8(bus);
        let r = opcode & 0x07;
        let bit = (opcode >> 3) & 0x07;
        match opcode {
            0x00..=0x3F => {
                let val = self.read_reg(bus, r);
                let res = self.shift(bit, val);
                self.write_reg(bus, r, res);
            }
            0x40..=0x7F => {
                let val = self.read_reg(bus, r);
                let c = self.flag(FLAG_C);
                self.set_flags(val & (1 << bit) == 0, false, true, c);
            }
            0x80..=0xBF => {
                let val = self.read_reg(bus, r);
                self.write_reg(bus, r, val & !(1 << bit));
            }
            0xC0..=0xFF => {
                let val = self.read_reg(bus, r);
                self.write_reg(bus, r, val | (1 << bit));
            }
        }
    }

    fn jump_relative(&mut self, offset: u8) {
        self.pc = self.pc.wrapping_add(offset as i8 as i16 as u16);
        self.idle(1);
    }

    fn call(&mut self, bus: &mut Bus, addr: u16) {
        self.idle(1);
        self.push_stack(bus, self.pc);
        self.pc = addr;
    }

    fn ret(&mut self, bus: &mut Bus) {
        self.pc = self.pop_stack(bus);
        self.idle(1);
    }

    fn execute_opcode(&mut self, bus: &mut Bus, pc: u16, opcode: u8) {
        match opcode {
            0x00 => {}
            0x01 | 0x11 | 0x21 | 0x31 => {
                let val = self.fetch16(bus);
                self.write_rr(opcode >> 4, val);
            }
            0x02 => {
                let addr = self.get_bc();
                self.write8(bus, addr, self.a);
            }
            0x12 => {
                let addr = self.get_de();
                self.write8(bus, addr, self.a);
            }
            0x22 => {
                let addr = self.get_hl();
                self.write8(bus, addr, self.a);
                self.set_hl(addr.wrapping_add(1));
            }
            0x32 => {
                let addr = self.get_hl();
                self.write8(bus, addr, self.a);
                self.set_hl(addr.wrapping_sub(1));
            }
            0x0A => {
                let addr = self.get_bc();
                self.a = self.read8(bus, addr);
            }
            0x1A => {
                let addr = self.get_de();
                self.a = self.read8(bus, addr);
            }
            0x2A => {
                let addr = self.get_hl();
                self.a = self.read8(bus, addr);
                self.set_hl(addr.wrapping_add(1));
            }
            0x3A => {
                let addr = self.get_hl();
                self.a = self.read8(bus, addr);
                self.set_hl(addr.wrapping_sub(1));
            }
            0x03 | 0x13 | 0x23 | 0x33 => {
                let index = opcode >> 4;
                let val = self.read_rr(index).wrapping_add(1);
                self.write_rr(index, val);
                self.idle(1);
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let index = opcode >> 4;
                let val = self.read_rr(index).wrapping_sub(1);
                self.write_rr(index, val);
                self.idle(1);
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let r = opcode >> 3;
                let val = self.read_reg(bus, r);
                let res = self.inc8(val);
                self.write_reg(bus, r, res);
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let r = opcode >> 3;
                let val = self.read_reg(bus, r);
                let res = self.dec8(val);
                self.write_reg(bus, r, res);
            }
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let val = self.fetch8(bus);
                self.write_reg(bus, opcode >> 3, val);
            }
            0x07 | 0x0F | 0x17 | 0x1F => {
                // Accumulator rotates always clear Z.
                self.a = self.shift(opcode >> 3, self.a);
                self.f &= !FLAG_Z;
            }
            0x08 => {
                let addr = self.fetch16(bus);
                self.write8(bus, addr, self.sp as u8);
                self.write8(bus, addr.wrapping_add(1), (self.sp >> 8) as u8);
            }
            0x09 | 0x19 | 0x29 | 0x39 => {
                let val = self.read_rr(opcode >> 4);
                self.add16_hl(val);
                self.idle(1);
            }
            0x10 => {
                // STOP skips its padding byte and resets the divider.
                self.pc = self.pc.wrapping_add(1);
                self.stopped = true;
                bus.write(io::DIV, 0);
            }
            0x18 => {
                let offset = self.fetch8(bus);
                self.jump_relative(offset);
            }
            0x20 | 0x28 | 0x30 | 0x38 => {
                let offset = self.fetch8(bus);
                if self.condition(opcode) {
                    self.jump_relative(offset);
                }
            }
            0x27 => self.daa(),
            0x2F => {
                self.a = !self.a;
                self.f |= FLAG_N | FLAG_H;
            }
            0x37 => {
                let z = self.flag(FLAG_Z);
                self.set_flags(z, false, false, true);
            }
            0x3F => {
                let z = self.flag(FLAG_Z);
                let c = self.flag(FLAG_C);
                self.set_flags(z, false, false, !c);
            }
            0x76 => {
                let pending = bus.raw(io::IE) & bus.raw(io::IF) & 0x1F;
                if !self.ime && pending != 0 {
                    self.halt_bug = true;
                } else {
                    self.halted = true;
                }
            }
            0x40..=0x7F => {
                let val = self.read_reg(bus, opcode);
                self.write_reg(bus, opcode >> 3, val);
            }
            0x80..=0xBF => {
                let val = self.read_reg(bus, opcode);
                self.alu(opcode >> 3, val);
            }
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let val = self.fetch8(bus);
                self.alu(opcode >> 3, val);
            }
            0xC0 | 0xC8 | 0xD0 | 0xD8 => {
                self.idle(1);
                if self.condition(opcode) {
                    self.ret(bus);
                }
            }
            0xC9 => self.ret(bus),
            0xD9 => {
                self.ret(bus);
                self.ime = true;
            }
            0xC1 | 0xD1 | 0xE1 => {
                let val = self.pop_stack(bus);
                self.write_rr((opcode >> 4) & 0x03, val);
            }
            0xF1 => {
                let val = self.pop_stack(bus);
                self.set_af(val);
            }
            0xC5 | 0xD5 | 0xE5 => {
                let val = self.read_rr((opcode >> 4) & 0x03);
                self.idle(1);
                self.push_stack(bus, val);
            }
            0xF5 => {
                self.idle(1);
                self.push_stack(bus, self.get_af());
            }
            0xC2 | 0xCA | 0xD2 | 0xDA => {
                let addr = self.fetch16(bus);
                if self.condition(opcode) {
                    self.pc = addr;
                    self.idle(1);
                }
            }
            0xC3 => {
                self.pc = self.fetch16(bus);
                self.idle(1);
            }
            0xE9 => self.pc = self.get_hl(),
            0xC4 | 0xCC | 0xD4 | 0xDC => {
                let addr = self.fetch16(bus);
                if self.condition(opcode) {
                    self.call(bus, addr);
                }
            }
            0xCD => {
                let addr = self.fetch16(bus);
                self.call(bus, addr);
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.call(bus, (opcode & 0x38) as u16);
            }
            0xCB => self.handle_cb(bus),
            0xE0 => {
                let addr = 0xFF00 | self.fetch8(bus) as u16;
                self.write8(bus, addr, self.a);
            }
            0xF0 => {
                let addr = 0xFF00 | self.fetch8(bus) as u16;
                self.a = self.read8(bus, addr);
            }
            0xE2 => {
                let addr = 0xFF00 | self.c as u16;
                self.write8(bus, addr, self.a);
            }
            0xF2 => {
                let addr = 0xFF00 | self.c as u16;
                self.a = self.read8(bus, addr);
            }
            0xEA => {
                let addr = self.fetch16(bus);
                self.write8(bus, addr, self.a);
            }
            0xFA => {
                let addr = self.fetch16(bus);
                self.a = self.read8(bus, addr);
            }
            0xE8 => {
                let offset = self.fetch8(bus);
                self.sp = self.sp_offset(offset);
                self.idle(2);
            }
            0xF8 => {
                let offset = self.fetch8(bus);
                let val = self.sp_offset(offset);
                self.set_hl(val);
                self.idle(1);
            }
            0xF9 => {
                self.sp = self.get_hl();
                self.idle(1);
            }
            0xF3 => {
                self.ime = false;
                self.ime_pending = false;
            }
            0xFB => self.ime_pending = true,
            _ => {
                debug_assert!(ILLEGAL_OPCODES.contains(&opcode));
                log::warn!("Illegal opcode {opcode:02X} at {pc:04X}");
                self.diagnostics
                    .push(Diagnostic::IllegalOpcode { pc, opcode });
            }
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_boot_registers() {
        let cpu = Cpu::new();
        assert_eq!(cpu.get_af(), 0x01B0);
        assert_eq!(cpu.get_bc(), 0x0013);
        assert_eq!(cpu.get_de(), 0x00D8);
        assert_eq!(cpu.get_hl(), 0x014D);
        assert_eq!(cpu.sp, 0xFFFE);
        assert_eq!(cpu.pc, 0x0100);
    }

    #[test]
    fn flags_low_nibble_stays_clear() {
        let mut cpu = Cpu::new();
        cpu.set_af(0x12FF);
        assert_eq!(cpu.f, 0xF0);
        assert_eq!(cpu.a, 0x12);
    }

    #[test]
    fn sub_borrows_from_nibble_and_byte() {
        let mut cpu = Cpu::new();
        cpu.a = 0x10;
        let res = cpu.sub8(0x01, false);
        assert_eq!(res, 0x0F);
        assert!(cpu.flag(FLAG_H));
        assert!(!cpu.flag(FLAG_C));
        assert!(cpu.flag(FLAG_N));

        cpu.a = 0x00;
        let res = cpu.sub8(0x00, true);
        assert_eq!(res, 0xFF);
        assert!(cpu.flag(FLAG_H));
        assert!(cpu.flag(FLAG_C));
    }

    #[test]
    fn daa_after_bcd_add() {
        let mut cpu = Cpu::new();
        cpu.a = 0x45;
        cpu.add8(0x38, false);
        cpu.daa();
        assert_eq!(cpu.a, 0x83);
        assert!(!cpu.flag(FLAG_C));

        cpu.a = 0x99;
        cpu.add8(0x01, false);
        cpu.daa();
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flag(FLAG_Z));
        assert!(cpu.flag(FLAG_C));
    }

    #[test]
    fn daa_after_bcd_sub() {
        let mut cpu = Cpu::new();
        cpu.a = 0x42;
        cpu.a = cpu.sub8(0x15, false);
        cpu.daa();
        assert_eq!(cpu.a, 0x27);
        assert!(cpu.flag(FLAG_N));
    }

    #[test]
    fn sp_offset_flags_use_low_byte() {
        let mut cpu = Cpu::new();
        cpu.sp = 0x00FF;
        let res = cpu.sp_offset(0x01);
        assert_eq!(res, 0x0100);
        assert!(cpu.flag(FLAG_H));
        assert!(cpu.flag(FLAG_C));

        cpu.sp = 0x1000;
        let res = cpu.sp_offset(0xFF);
        assert_eq!(res, 0x0FFF);
        assert!(!cpu.flag(FLAG_H));
        assert!(!cpu.flag(FLAG_C));
    }
}
