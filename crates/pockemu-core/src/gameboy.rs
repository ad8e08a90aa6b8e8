use std::{io, path::Path};

use crate::{
    Error,
    apu::Apu,
    bus::{Bus, Hook},
    cartridge::{BankState, Cartridge},
    cpu::Cpu,
    input::{Button, Input},
    ppu::{FRAME_CYCLES, Mode, Ppu, SCREEN_HEIGHT, SCREEN_WIDTH},
    timer::Timer,
};

pub struct GameBoy {
    pub cpu: Cpu,
    pub bus: Bus,
    pub ppu: Ppu,
    pub apu: Apu,
    pub timer: Timer,
    pub input: Input,
}

impl GameBoy {
    /// A machine with no cartridge inserted.
    pub fn new() -> Self {
        Self::with_bus(Bus::new())
    }

    pub fn with_cartridge(cart: Cartridge) -> Self {
        Self::with_bus(Bus::with_cartridge(cart))
    }

    pub fn from_rom(rom: Vec<u8>) -> Result<Self, Error> {
        Ok(Self::with_cartridge(Cartridge::load(rom)?))
    }

    /// Load a ROM and the `.sav` file next to it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::with_cartridge(Cartridge::from_file(path)?))
    }

    fn with_bus(mut bus: Bus) -> Self {
        let timer = Timer::new(&mut bus);
        let input = Input::new(&mut bus);
        let ppu = Ppu::new(&mut bus);
        let apu = Apu::new(&mut bus);
        Self {
            cpu: Cpu::new(),
            bus,
            ppu,
            apu,
            timer,
            input,
        }
    }

    /// Reset to the post-boot state, keeping the cartridge and its RAM.
    pub fn reset(&mut self) {
        self.bus.sync_ram();
        let sample_rate = self.apu.sample_rate();
        let bus = match self.bus.cart.take() {
            Some(mut cart) => {
                cart.banks = BankState::new();
                Bus::with_cartridge(cart)
            }
            None => Bus::new(),
        };
        *self = Self::with_bus(bus);
        self.apu.set_sample_rate(sample_rate);
    }

    /// Execute one instruction and advance every other component by the
    /// cycles it took. Returns the machine cycles elapsed.
    pub fn step(&mut self) -> u32 {
        self.input.update(&mut self.bus);
        let cycles = self.cpu.execute(&mut self.bus);
        self.dispatch_hooks();
        self.timer.update(&mut self.bus, cycles);
        self.ppu.update(&mut self.bus, cycles);
        self.apu.update(&mut self.bus, cycles);
        cycles
    }

    fn dispatch_hooks(&mut self) {
        for event in self.bus.take_events() {
            match event.hook {
                Hook::DivReset => self.timer.reset_clock(&mut self.bus),
                Hook::OamDma => self.ppu.start_dma(event.value),
                Hook::Sound => self.apu.on_write(&mut self.bus, event.addr, event.value),
                Hook::RamEnable | Hook::RomBank | Hook::UpperBank | Hook::BankingMode => {}
            }
        }
    }

    /// Step until the PPU has gone from VBlank through a full frame and back
    /// into VBlank. With the LCD off, runs one frame's worth of cycles.
    /// Returns the machine cycles elapsed.
    pub fn run_frame(&mut self) -> u32 {
        let mut cycles = 0;
        if !self.ppu.lcd_enabled() {
            while cycles < FRAME_CYCLES && !self.ppu.lcd_enabled() {
                cycles += self.step();
            }
            return cycles;
        }
        while self.ppu.mode == Mode::VBlank && self.ppu.lcd_enabled() {
            cycles += self.step();
        }
        while self.ppu.mode != Mode::VBlank && self.ppu.lcd_enabled() {
            cycles += self.step();
        }
        cycles
    }

    pub fn press(&mut self, button: Button, pressed: bool) {
        self.input.set_button(button, pressed);
    }

    pub fn framebuffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.ppu.framebuffer()
    }

    pub fn take_audio(&mut self) -> Vec<(i16, i16)> {
        self.apu.take_samples()
    }

    /// Current external RAM contents, or `None` for RAM-less cartridges.
    pub fn save_data(&mut self) -> Option<Vec<u8>> {
        self.bus.ram_image().map(<[u8]>::to_vec)
    }

    /// Write external RAM to `path`. No-op without cartridge RAM.
    pub fn save_ram_to(&mut self, path: &Path) -> io::Result<()> {
        self.bus.sync_ram();
        match self.bus.cart.as_ref() {
            Some(cart) => cart.write_save(path),
            None => Ok(()),
        }
    }

    /// Write external RAM next to the ROM it was loaded from.
    pub fn save_ram(&mut self) -> io::Result<()> {
        let path = self
            .bus
            .cart
            .as_ref()
            .and_then(|cart| cart.save_path())
            .map(Path::to_path_buf);
        match path {
            Some(path) => self.save_ram_to(&path),
            None => Ok(()),
        }
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
