use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::Error;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

const HEADER_END: usize = 0x0150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcType {
    NoMbc,
    Mbc1,
    /// A controller this core does not model; banked like MBC1.
    Unknown(u8),
}

/// MBC1 control registers as last written by the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankState {
    /// 7-bit combined bank number: bits 0-4 from 0x2000-0x3FFF, bits 5-6
    /// from 0x4000-0x5FFF.
    pub bank: u8,
    /// Set by 0x6000-0x7FFF bit 0; routes the upper bits to the RAM bank.
    pub ram_mode: bool,
    pub ram_enabled: bool,
}

impl BankState {
    pub fn new() -> Self {
        Self {
            bank: 1,
            ram_mode: false,
            ram_enabled: false,
        }
    }

    pub fn enable_ram(&mut self, val: u8) {
        self.ram_enabled = val & 0x0F == 0x0A;
    }

    pub fn select_rom(&mut self, val: u8) {
        let mut low = val & 0x1F;
        if low == 0 {
            low = 1;
        }
        self.bank = (self.bank & 0x60) | low;
    }

    pub fn select_upper(&mut self, val: u8) {
        self.bank = ((val & 0x03) << 5) | (self.bank & 0x1F);
    }

    pub fn select_mode(&mut self, val: u8) {
        self.ram_mode = val & 0x01 != 0;
    }

    /// ROM bank mapped at 0x4000-0x7FFF, before reduction by the bank count.
    pub fn rom_bank(&self) -> usize {
        if self.ram_mode {
            (self.bank & 0x1F) as usize
        } else {
            self.bank as usize
        }
    }

    /// RAM bank mapped at 0xA000-0xBFFF, before reduction by the bank count.
    pub fn ram_bank(&self) -> usize {
        if self.ram_mode {
            (self.bank >> 5) as usize
        } else {
            0
        }
    }
}

impl Default for BankState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Cartridge {
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
    pub mbc: MbcType,
    pub title: String,
    pub banks: BankState,
    save_path: Option<PathBuf>,
}

impl Cartridge {
    /// Build a cartridge from a raw ROM image, sized by its header.
    pub fn load(mut data: Vec<u8>) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::EmptyRom);
        }
        if data.len() < HEADER_END {
            return Err(Error::RomTooSmall(data.len()));
        }

        let header = Header::parse(&data);
        let mbc = header.mbc_type();
        let title = header.title();
        let rom_size = header.rom_size()?;
        let ram_size = header.ram_size()?;

        if data.len() != rom_size {
            log::warn!(
                "ROM is {} bytes but header declares {}; resizing",
                data.len(),
                rom_size
            );
            data.resize(rom_size, 0xFF);
        }

        if let MbcType::Unknown(code) = mbc {
            log::warn!("Unsupported cartridge type {code:#04X}; using MBC1 banking");
        }

        Ok(Self {
            rom: data,
            ram: vec![0; ram_size],
            mbc,
            title,
            banks: BankState::new(),
            save_path: None,
        })
    }

    /// Load a ROM from disk together with the `.sav` file next to it, if any.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = fs::read(&path)?;
        let mut cart = Self::load(data)?;

        let save = path.as_ref().with_extension("sav");
        if !cart.ram.is_empty() {
            match fs::read(&save) {
                Ok(bytes) => cart.load_save(&bytes),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to read {}: {e}", save.display()),
            }
        }
        cart.save_path = Some(save);

        log::info!(
            "Loaded ROM: {} (MBC: {:?}, ROM banks: {}, RAM: {} KiB)",
            cart.title,
            cart.mbc,
            cart.rom_banks(),
            cart.ram.len() / 1024
        );
        Ok(cart)
    }

    /// Replace external RAM with a save image. Mismatched sizes are
    /// truncated or zero-padded.
    pub fn load_save(&mut self, bytes: &[u8]) {
        if bytes.len() != self.ram.len() {
            log::warn!(
                "Save data is {} bytes, cartridge RAM is {}",
                bytes.len(),
                self.ram.len()
            );
        }
        self.ram.fill(0);
        let n = bytes.len().min(self.ram.len());
        self.ram[..n].copy_from_slice(&bytes[..n]);
    }

    pub fn rom_banks(&self) -> usize {
        (self.rom.len() / ROM_BANK_SIZE).max(1)
    }

    pub fn ram_banks(&self) -> usize {
        self.ram.len().div_ceil(RAM_BANK_SIZE)
    }

    pub fn has_banking(&self) -> bool {
        self.mbc != MbcType::NoMbc
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn set_save_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.save_path = Some(path.into());
    }

    /// Write external RAM to `path`. Cartridges without RAM write nothing.
    pub fn write_save(&self, path: &Path) -> io::Result<()> {
        if self.ram.is_empty() {
            return Ok(());
        }
        fs::write(path, &self.ram)?;
        log::debug!("Wrote {} bytes of save RAM to {}", self.ram.len(), path.display());
        Ok(())
    }
}

struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn byte(&self, addr: usize) -> u8 {
        self.data.get(addr).copied().unwrap_or(0)
    }

    fn title(&self) -> String {
        let end = 0x0144.min(self.data.len());
        let mut slice = &self.data[0x0134.min(end)..end];
        if let Some(pos) = slice.iter().position(|&b| b == 0) {
            slice = &slice[..pos];
        }
        String::from_utf8_lossy(slice).trim().to_string()
    }

    fn mbc_type(&self) -> MbcType {
        match self.byte(0x0147) {
            0x00 | 0x08 | 0x09 => MbcType::NoMbc,
            0x01..=0x03 => MbcType::Mbc1,
            other => MbcType::Unknown(other),
        }
    }

    fn rom_size(&self) -> Result<usize, Error> {
        match self.byte(0x0148) {
            code @ 0x00..=0x08 => Ok((2usize << code) * ROM_BANK_SIZE),
            code => Err(Error::UnsupportedRomSize(code)),
        }
    }

    fn ram_size(&self) -> Result<usize, Error> {
        match self.byte(0x0149) {
            0x00 => Ok(0),
            0x01 => Ok(0x800),   // 2KB
            0x02 => Ok(0x2000),  // 8KB
            0x03 => Ok(0x8000),  // 32KB (4 banks)
            0x04 => Ok(0x20000), // 128KB (16 banks)
            0x05 => Ok(0x10000), // 64KB (8 banks)
            code => Err(Error::UnsupportedRamSize(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(cart_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000 << rom_code];
        rom[0x0147] = cart_type;
        rom[0x0148] = rom_code;
        rom[0x0149] = ram_code;
        rom
    }

    #[test]
    fn bank_zero_selects_bank_one() {
        let mut banks = BankState::new();
        banks.select_rom(0x00);
        assert_eq!(banks.rom_bank(), 1);
        banks.select_rom(0x20);
        assert_eq!(banks.rom_bank(), 1);
        banks.select_rom(0x1F);
        assert_eq!(banks.rom_bank(), 0x1F);
    }

    #[test]
    fn upper_bits_route_by_mode() {
        let mut banks = BankState::new();
        banks.select_rom(0x05);
        banks.select_upper(0x02);
        assert_eq!(banks.rom_bank(), 0x45);
        assert_eq!(banks.ram_bank(), 0);

        banks.select_mode(0x01);
        assert_eq!(banks.rom_bank(), 0x05);
        assert_eq!(banks.ram_bank(), 2);
    }

    #[test]
    fn ram_enable_requires_low_nibble_a() {
        let mut banks = BankState::new();
        banks.enable_ram(0x1A);
        assert!(banks.ram_enabled);
        banks.enable_ram(0x0B);
        assert!(!banks.ram_enabled);
    }

    #[test]
    fn header_sizes() {
        let cart = Cartridge::load(rom(0x03, 0x02, 0x03)).unwrap();
        assert_eq!(cart.mbc, MbcType::Mbc1);
        assert_eq!(cart.rom_banks(), 8);
        assert_eq!(cart.ram_banks(), 4);
        assert_eq!(cart.ram.len(), 0x8000);
    }

    #[test]
    fn short_rom_is_padded_to_declared_size() {
        let mut data = rom(0x01, 0x00, 0x00);
        data[0x0148] = 0x01;
        let cart = Cartridge::load(data).unwrap();
        assert_eq!(cart.rom.len(), 0x10000);
        assert_eq!(cart.rom[0xFFFF], 0xFF);
    }

    #[test]
    fn empty_rom_is_rejected() {
        assert!(matches!(Cartridge::load(Vec::new()), Err(Error::EmptyRom)));
        assert!(matches!(
            Cartridge::load(vec![0; 0x100]),
            Err(Error::RomTooSmall(0x100))
        ));
    }

    #[test]
    fn bad_size_codes_are_rejected() {
        let mut data = rom(0x00, 0x00, 0x00);
        data[0x0148] = 0x52;
        assert!(matches!(
            Cartridge::load(data),
            Err(Error::UnsupportedRomSize(0x52))
        ));
        assert!(matches!(
            Cartridge::load(rom(0x00, 0x00, 0x07)),
            Err(Error::UnsupportedRamSize(0x07))
        ));
    }

    #[test]
    fn title_is_trimmed_at_nul() {
        let mut data = rom(0x00, 0x00, 0x00);
        data[0x0134..0x0139].copy_from_slice(b"TETRA");
        let cart = Cartridge::load(data).unwrap();
        assert_eq!(cart.title, "TETRA");
    }
}
