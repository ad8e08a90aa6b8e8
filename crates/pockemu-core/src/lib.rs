//! Cycle-accurate DMG emulation core.
//!
//! All hardware state lives behind a flat 64KB [`bus::Bus`]; the components
//! (CPU, PPU, APU, timer, joypad) communicate only through memory-mapped
//! registers on it. The [`gameboy`] facade owns everything and drives one
//! instruction per step.

/// Audio Processing Unit (APU) emulation.
pub mod apu;

/// Flat address space with read/write masks and register hooks.
pub mod bus;

/// Cartridge header parsing, ROM/RAM images and MBC1 bank state.
pub mod cartridge;

/// LR35902 CPU core.
pub mod cpu;

mod error;

/// High-level facade that wires every component to a single bus.
pub mod gameboy;

/// Joypad input register and edge-triggered interrupt behavior.
pub mod input;

/// Memory map and register addresses.
pub mod io;

/// Pixel Processing Unit (PPU) emulation.
pub mod ppu;

/// Divider/timer unit.
pub mod timer;

pub use error::Error;

/// Master clock frequency in Hz.
pub const CPU_CLOCK_HZ: u32 = 4_194_304;
