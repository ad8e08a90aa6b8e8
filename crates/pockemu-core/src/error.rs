use std::io;

use thiserror::Error;

/// Errors raised while building a machine from cartridge content.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
    #[error("ROM image is empty")]
    EmptyRom,
    #[error("ROM image is {0} bytes, too small to hold a cartridge header")]
    RomTooSmall(usize),
    #[error("unsupported ROM size code: {0:#04X}")]
    UnsupportedRomSize(u8),
    #[error("unsupported RAM size code: {0:#04X}")]
    UnsupportedRamSize(u8),
}
