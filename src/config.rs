use log::warn;
use pockemu_core::apu::DEFAULT_SAMPLE_RATE;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PALETTE: [u32; 4] = [0xE0F8D0, 0x88C070, 0x346856, 0x081820];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub sample_rate: u32,
    /// Frames to run when `--frames` is not given.
    pub frames: usize,
    pub save_on_exit: bool,
    /// RGB colours for shades 0 (lightest) to 3 (darkest).
    pub palette: [u32; 4],
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frames: 600,
            save_on_exit: true,
            palette: DEFAULT_PALETTE,
        }
    }
}

impl RunnerConfig {
    pub fn shade_rgb(&self, shade: u8) -> [u8; 3] {
        let c = self.palette[(shade & 3) as usize];
        [(c >> 16) as u8, (c >> 8) as u8, c as u8]
    }
}

pub fn load_from_file(path: &Path) -> RunnerConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to read config {}: {e}; using defaults", path.display());
            return RunnerConfig::default();
        }
    };

    match toml::from_str::<RunnerConfig>(&text) {
        Ok(cfg) if cfg.sample_rate == 0 => {
            warn!("Config {} has sample_rate = 0; using default", path.display());
            RunnerConfig {
                sample_rate: DEFAULT_SAMPLE_RATE,
                ..cfg
            }
        }
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            RunnerConfig::default()
        }
    }
}
