#![allow(dead_code)]

use pockemu_core::gameboy::GameBoy;

pub const ROM_ONLY: u8 = 0x00;
pub const MBC1: u8 = 0x01;
pub const MBC1_RAM_BATTERY: u8 = 0x03;

/// A ROM of `2 << rom_code` banks whose header declares the given type and
/// sizes. The first byte of every bank holds its bank number.
pub fn rom(cart_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
    let banks = 2usize << rom_code;
    let mut rom = vec![0u8; banks * 0x4000];
    for bank in 1..banks {
        rom[bank * 0x4000] = bank as u8;
    }
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[0x0147] = cart_type;
    rom[0x0148] = rom_code;
    rom[0x0149] = ram_code;
    rom
}

/// A 32KB ROM-only image with `program` at the entry point. Everything
/// else in ROM is NOP.
pub fn program_rom(program: &[u8]) -> Vec<u8> {
    let mut rom = rom(ROM_ONLY, 0x00, 0x00);
    rom[0x4000] = 0x00;
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    rom
}

/// A machine that starts executing `program` at 0x0100 with every
/// interrupt source masked off and nothing pending.
pub fn machine(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::from_rom(program_rom(program)).unwrap();
    gb.bus.set_raw(0xFFFF, 0x00);
    gb.bus.set_raw(0xFF0F, 0x00);
    gb
}

/// Step until `cond` holds, failing after `limit` machine cycles.
pub fn step_until(gb: &mut GameBoy, limit: u32, mut cond: impl FnMut(&GameBoy) -> bool) -> u32 {
    let mut cycles = 0;
    while !cond(gb) {
        assert!(cycles < limit, "condition not met within {limit} cycles");
        cycles += gb.step();
    }
    cycles
}
