use std::ops::RangeInclusive;

use crate::{
    cartridge::{Cartridge, RAM_BANK_SIZE, ROM_BANK_SIZE},
    io,
};

const MEM_SIZE: usize = 0x10000;

/// Side effect attached to a written address.
///
/// Bank controller hooks run inside [`Bus::write`]. Every other kind is
/// queued as a [`HookEvent`] and dispatched by the owner of the bus to the
/// component that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// 0x0000-0x1FFF: external RAM enable latch.
    RamEnable,
    /// 0x2000-0x3FFF: low five ROM bank bits.
    RomBank,
    /// 0x4000-0x5FFF: upper ROM bits or RAM bank.
    UpperBank,
    /// 0x6000-0x7FFF: banking mode select.
    BankingMode,
    /// DIV write resets the divider.
    DivReset,
    /// DMA register write starts an OAM transfer.
    OamDma,
    /// Any sound register or wave RAM write.
    Sound,
}

impl Hook {
    fn is_bank_control(self) -> bool {
        matches!(
            self,
            Hook::RamEnable | Hook::RomBank | Hook::UpperBank | Hook::BankingMode
        )
    }
}

/// A deferred hook invocation carrying the raw, unmasked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookEvent {
    pub hook: Hook,
    pub addr: u16,
    pub value: u8,
}

/// Interrupt sources in priority order (VBlank highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    pub const fn vector(self) -> u16 {
        0x40 + 8 * self as u16
    }

    /// Highest priority source among the set bits of `pending`.
    pub fn highest(pending: u8) -> Option<Interrupt> {
        Self::ALL.into_iter().find(|i| pending & i.bit() != 0)
    }
}

/// The 64KB address space. Every register and memory byte has exactly one
/// canonical location in `mem`; masks and hooks are per-address side tables.
pub struct Bus {
    mem: Box<[u8]>,
    /// Bits clear here read back as 1.
    read_mask: Box<[u8]>,
    /// Bits clear here keep their previous value on write.
    write_mask: Box<[u8]>,
    hooks: Box<[Option<Hook>]>,
    events: Vec<HookEvent>,
    pub cart: Option<Cartridge>,
    mapped_rom: usize,
    mapped_ram: usize,
}

impl Bus {
    /// A bus with no cartridge inserted. ROM space reads as zero and is
    /// write-protected.
    pub fn new() -> Self {
        let mut bus = Self {
            mem: vec![0; MEM_SIZE].into_boxed_slice(),
            read_mask: vec![0xFF; MEM_SIZE].into_boxed_slice(),
            write_mask: vec![0xFF; MEM_SIZE].into_boxed_slice(),
            hooks: vec![None; MEM_SIZE].into_boxed_slice(),
            events: Vec::new(),
            cart: None,
            mapped_rom: 1,
            mapped_ram: 0,
        };
        bus.set_write_mask(io::ROM_BANK0_START..=io::ROM_END, 0x00);
        bus.set_read_mask(io::IF..=io::IF, 0x1F);
        bus.mem[io::IF as usize] = 0xE1;
        bus.apply_ram_mask();
        bus
    }

    pub fn with_cartridge(cart: Cartridge) -> Self {
        let mut bus = Self::new();
        let len = cart.rom.len().min(2 * ROM_BANK_SIZE);
        bus.mem[..len].copy_from_slice(&cart.rom[..len]);

        if cart.has_banking() {
            bus.set_hook(0x0000..=0x1FFF, Hook::RamEnable);
            bus.set_hook(0x2000..=0x3FFF, Hook::RomBank);
            bus.set_hook(0x4000..=0x5FFF, Hook::UpperBank);
            bus.set_hook(0x6000..=0x7FFF, Hook::BankingMode);
        }

        let ram_len = cart.ram.len().min(RAM_BANK_SIZE);
        let start = io::EXT_RAM_START as usize;
        bus.mem[start..start + ram_len].copy_from_slice(&cart.ram[..ram_len]);

        bus.cart = Some(cart);
        bus.apply_ram_mask();
        bus
    }

    /// Masked CPU-visible read.
    pub fn read(&self, addr: u16) -> u8 {
        let i = addr as usize;
        self.mem[i] | !self.read_mask[i]
    }

    /// CPU-visible write: hook first with the raw value, then the write mask.
    pub fn write(&mut self, addr: u16, val: u8) {
        let i = addr as usize;
        if let Some(hook) = self.hooks[i] {
            if hook.is_bank_control() {
                self.bank_control(hook, val);
            } else {
                self.events.push(HookEvent {
                    hook,
                    addr,
                    value: val,
                });
            }
        }
        let mask = self.write_mask[i];
        self.mem[i] = (val & mask) | (self.mem[i] & !mask);
    }

    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn write_word(&mut self, addr: u16, val: u16) {
        self.write(addr.wrapping_add(1), (val >> 8) as u8);
        self.write(addr, val as u8);
    }

    /// Unmasked read for components inspecting registers they own.
    pub fn raw(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    /// Unmasked, hook-free write for components driving registers they own.
    pub fn set_raw(&mut self, addr: u16, val: u8) {
        self.mem[addr as usize] = val;
    }

    pub fn raw_slice(&self, range: RangeInclusive<u16>) -> &[u8] {
        &self.mem[*range.start() as usize..=*range.end() as usize]
    }

    pub fn raw_slice_mut(&mut self, range: RangeInclusive<u16>) -> &mut [u8] {
        &mut self.mem[*range.start() as usize..=*range.end() as usize]
    }

    pub fn set_read_mask(&mut self, range: RangeInclusive<u16>, mask: u8) {
        self.read_mask[*range.start() as usize..=*range.end() as usize].fill(mask);
    }

    pub fn set_write_mask(&mut self, range: RangeInclusive<u16>, mask: u8) {
        self.write_mask[*range.start() as usize..=*range.end() as usize].fill(mask);
    }

    pub fn set_hook(&mut self, range: RangeInclusive<u16>, hook: Hook) {
        for slot in &mut self.hooks[*range.start() as usize..=*range.end() as usize] {
            debug_assert!(
                slot.is_none_or(|h| h == hook),
                "overlapping hook registration: {slot:?} vs {hook:?}"
            );
            *slot = Some(hook);
        }
    }

    pub fn read_mask(&self, addr: u16) -> u8 {
        self.read_mask[addr as usize]
    }

    pub fn write_mask(&self, addr: u16) -> u8 {
        self.write_mask[addr as usize]
    }

    /// Drain hook invocations queued since the last call.
    pub fn take_events(&mut self) -> Vec<HookEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.mem[io::IF as usize] |= interrupt.bit();
    }

    pub fn mapped_rom_bank(&self) -> usize {
        self.mapped_rom
    }

    pub fn mapped_ram_bank(&self) -> usize {
        self.mapped_ram
    }

    /// External RAM with the live 0xA000 window folded back in, or `None`
    /// when the cartridge has no RAM.
    pub fn ram_image(&mut self) -> Option<&[u8]> {
        self.sync_ram();
        self.cart
            .as_ref()
            .filter(|cart| !cart.ram.is_empty())
            .map(|cart| cart.ram.as_slice())
    }

    fn bank_control(&mut self, hook: Hook, val: u8) {
        let Some(cart) = self.cart.as_mut() else {
            return;
        };
        match hook {
            Hook::RamEnable => cart.banks.enable_ram(val),
            Hook::RomBank => cart.banks.select_rom(val),
            Hook::UpperBank => cart.banks.select_upper(val),
            Hook::BankingMode => cart.banks.select_mode(val),
            _ => {}
        }
        self.apply_banks();
    }

    /// Re-derive both windows from the controller state and copy in any
    /// bank that changed.
    fn apply_banks(&mut self) {
        let Some(cart) = self.cart.as_ref() else {
            return;
        };
        let rom_bank = cart.banks.rom_bank() % cart.rom_banks();
        let ram_bank = cart.banks.ram_bank() % cart.ram_banks().max(1);

        if rom_bank != self.mapped_rom {
            let src = rom_bank * ROM_BANK_SIZE;
            let start = io::ROM_BANKN_START as usize;
            self.mem[start..start + ROM_BANK_SIZE]
                .copy_from_slice(&cart.rom[src..src + ROM_BANK_SIZE]);
            log::debug!("ROM bank {} -> {}", self.mapped_rom, rom_bank);
            self.mapped_rom = rom_bank;
        }

        if ram_bank != self.mapped_ram && cart.ram_banks() > 1 {
            self.sync_ram();
            if let Some(cart) = self.cart.as_ref() {
                let src = ram_bank * RAM_BANK_SIZE;
                let start = io::EXT_RAM_START as usize;
                self.mem[start..start + RAM_BANK_SIZE]
                    .copy_from_slice(&cart.ram[src..src + RAM_BANK_SIZE]);
            }
            log::debug!("RAM bank {} -> {}", self.mapped_ram, ram_bank);
            self.mapped_ram = ram_bank;
        }

        self.apply_ram_mask();
    }

    /// Fold the live 0xA000 window back into the cartridge RAM image.
    pub fn sync_ram(&mut self) {
        let Some(cart) = self.cart.as_mut() else {
            return;
        };
        let dst = self.mapped_ram * RAM_BANK_SIZE;
        let len = cart.ram.len().saturating_sub(dst).min(RAM_BANK_SIZE);
        let start = io::EXT_RAM_START as usize;
        cart.ram[dst..dst + len].copy_from_slice(&self.mem[start..start + len]);
    }

    /// Open the external RAM window over the populated bytes when enabled;
    /// everything else reads 0xFF and ignores writes.
    fn apply_ram_mask(&mut self) {
        let (enabled, len) = match self.cart.as_ref() {
            Some(cart) => (
                cart.banks.ram_enabled || !cart.has_banking(),
                cart.ram.len().min(RAM_BANK_SIZE),
            ),
            None => (false, 0),
        };
        let open = if enabled { len } else { 0 };
        let start = io::EXT_RAM_START as usize;
        let end = io::EXT_RAM_END as usize;
        self.read_mask[start..start + open].fill(0xFF);
        self.write_mask[start..start + open].fill(0xFF);
        self.read_mask[start + open..=end].fill(0x00);
        self.write_mask[start + open..=end].fill(0x00);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
