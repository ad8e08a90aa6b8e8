use crate::{
    bus::{Bus, Hook, Interrupt},
    io,
};

// Screen resolution used by the Game Boy PPU
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

// Timing constants per LCD mode in machine cycles
const MODE0_CYCLES: u32 = 51; // HBlank
const MODE1_CYCLES: u32 = 114; // One line during VBlank
const MODE2_CYCLES: u32 = 20; // OAM scan
const MODE3_CYCLES: u32 = 43; // Pixel transfer

/// Machine cycles in one full frame.
pub const FRAME_CYCLES: u32 = MODE1_CYCLES * (SCREEN_HEIGHT as u32 + VBLANK_LINES as u32);

// Number of lines spent in VBlank
const VBLANK_LINES: u8 = 10;
const LAST_LINE: u8 = SCREEN_HEIGHT as u8 + VBLANK_LINES - 1;

// Pixels emitted per cycle of pixel transfer
const PIXELS_PER_STEP: usize = 4;

// Sprite limits
const MAX_SPRITES_PER_LINE: usize = 10;
const TOTAL_SPRITES: usize = 40;

const OAM_DMA_LEN: u16 = 0xA0;

// VRAM layout constants
const BG_MAP_0_BASE: u16 = 0x9800;
const BG_MAP_1_BASE: u16 = 0x9C00;
const TILE_DATA_0_BASE: u16 = 0x8000;
const TILE_DATA_1_BASE: u16 = 0x9000;

// Window X position is clipped if greater than this value
const WINDOW_X_MAX: u8 = 166;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    PixelTransfer = 3,
}

#[derive(Copy, Clone, Default)]
struct Sprite {
    x: i16,
    y: i16,
    tile: u8,
    flags: u8,
    oam_index: usize,
}

#[derive(Debug, Clone, Copy)]
struct OamDma {
    src: u16,
    index: u16,
}

pub struct Ppu {
    pub mode: Mode,
    mode_clock: u32,
    lcd_on: bool,
    /// X of the next pixel to emit during pixel transfer
    render_x: usize,
    /// Internal window line counter
    win_line_counter: u8,
    window_drawn: bool,

    /// 2-bit shade indices, 0 lightest
    pub framebuffer: [u8; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// Latched sprites for the current scanline
    line_sprites: [Sprite; MAX_SPRITES_PER_LINE],
    sprite_count: usize,
    /// Indicates a completed frame is available in `framebuffer`
    frame_ready: bool,
    stat_irq_line: bool,
    frame_counter: u64,
    dma: Option<OamDma>,
}

impl Ppu {
    pub fn new(bus: &mut Bus) -> Self {
        bus.set_write_mask(io::STAT..=io::STAT, 0x78);
        bus.set_read_mask(io::STAT..=io::STAT, 0x7F);
        bus.set_write_mask(io::LY..=io::LY, 0x00);
        bus.set_hook(io::DMA..=io::DMA, Hook::OamDma);

        bus.set_raw(io::LCDC, 0x91);
        bus.set_raw(io::STAT, 0x80);
        bus.set_raw(io::SCY, 0x00);
        bus.set_raw(io::SCX, 0x00);
        bus.set_raw(io::LY, 0x00);
        bus.set_raw(io::LYC, 0x00);
        bus.set_raw(io::DMA, 0xFF);
        bus.set_raw(io::BGP, 0xFC);
        bus.set_raw(io::OBP0, 0xFF);
        bus.set_raw(io::OBP1, 0xFF);
        bus.set_raw(io::WY, 0x00);
        bus.set_raw(io::WX, 0x00);

        let mut ppu = Self {
            mode: Mode::OamSearch,
            mode_clock: 0,
            lcd_on: true,
            render_x: 0,
            win_line_counter: 0,
            window_drawn: false,
            framebuffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            line_sprites: [Sprite::default(); MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            frame_ready: false,
            stat_irq_line: false,
            frame_counter: 0,
            dma: None,
        };
        ppu.enter_mode(bus, Mode::OamSearch);
        ppu
    }

    pub fn ly(&self, bus: &Bus) -> u8 {
        bus.raw(io::LY)
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcd_on
    }

    pub fn framebuffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.framebuffer
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_flag(&mut self) {
        self.frame_ready = false;
    }

    /// Number of VBlank periods entered since power-on.
    pub fn frames(&self) -> u64 {
        self.frame_counter
    }

    pub fn dma_active(&self) -> bool {
        self.dma.is_some()
    }

    /// DMA register write hook.
    pub fn start_dma(&mut self, val: u8) {
        log::debug!("OAM DMA from {:04X}", (val as u16) << 8);
        self.dma = Some(OamDma {
            src: (val as u16) << 8,
            index: 0,
        });
    }

    /// Advance by `cycles` machine cycles.
    pub fn update(&mut self, bus: &mut Bus, cycles: u32) {
        for _ in 0..cycles {
            self.step_dma(bus);

            let lcdc = bus.raw(io::LCDC);
            if lcdc & 0x80 == 0 {
                if self.lcd_on {
                    self.disable_lcd(bus);
                }
                continue;
            }
            if !self.lcd_on {
                self.enable_lcd(bus);
            }

            self.mode_clock += 1;
            match self.mode {
                Mode::OamSearch => {
                    if self.mode_clock >= MODE2_CYCLES {
                        self.mode_clock = 0;
                        self.oam_scan(bus);
                        self.enter_mode(bus, Mode::PixelTransfer);
                    }
                }
                Mode::PixelTransfer => {
                    if self.render_x < SCREEN_WIDTH {
                        self.render_pixels(bus, PIXELS_PER_STEP);
                    }
                    if self.mode_clock >= MODE3_CYCLES {
                        self.mode_clock = 0;
                        self.enter_mode(bus, Mode::HBlank);
                    }
                }
                Mode::HBlank => {
                    if self.mode_clock >= MODE0_CYCLES {
                        self.mode_clock = 0;
                        let ly = bus.raw(io::LY) + 1;
                        bus.set_raw(io::LY, ly);
                        if ly as usize == SCREEN_HEIGHT {
                            self.enter_mode(bus, Mode::VBlank);
                            bus.request_interrupt(Interrupt::VBlank);
                            self.frame_ready = true;
                            self.frame_counter = self.frame_counter.wrapping_add(1);
                        } else {
                            self.enter_mode(bus, Mode::OamSearch);
                        }
                    }
                }
                Mode::VBlank => {
                    if self.mode_clock >= MODE1_CYCLES {
                        self.mode_clock = 0;
                        let ly = bus.raw(io::LY);
                        if ly >= LAST_LINE {
                            bus.set_raw(io::LY, 0);
                            self.win_line_counter = 0;
                            self.enter_mode(bus, Mode::OamSearch);
                        } else {
                            bus.set_raw(io::LY, ly + 1);
                        }
                    }
                }
            }

            self.update_stat(bus);
        }
    }

    fn step_dma(&mut self, bus: &mut Bus) {
        let Some(dma) = self.dma.as_mut() else {
            return;
        };
        let val = bus.read(dma.src.wrapping_add(dma.index));
        bus.set_raw(io::OAM_START + dma.index, val);
        dma.index += 1;
        if dma.index >= OAM_DMA_LEN {
            self.dma = None;
        }
    }

    fn enter_mode(&mut self, bus: &mut Bus, mode: Mode) {
        match mode {
            Mode::HBlank => {
                if self.window_drawn {
                    self.win_line_counter = self.win_line_counter.wrapping_add(1);
                }
                bus.set_write_mask(io::VRAM_START..=io::VRAM_END, 0xFF);
                bus.set_write_mask(io::OAM_START..=io::OAM_END, 0xFF);
            }
            Mode::VBlank => {
                bus.set_write_mask(io::VRAM_START..=io::VRAM_END, 0xFF);
                bus.set_write_mask(io::OAM_START..=io::OAM_END, 0xFF);
            }
            Mode::OamSearch => {
                bus.set_write_mask(io::VRAM_START..=io::VRAM_END, 0xFF);
                bus.set_write_mask(io::OAM_START..=io::OAM_END, 0x00);
            }
            Mode::PixelTransfer => {
                self.render_x = 0;
                self.window_drawn = false;
                bus.set_write_mask(io::VRAM_START..=io::VRAM_END, 0x00);
                bus.set_write_mask(io::OAM_START..=io::OAM_END, 0x00);
            }
        }
        self.mode = mode;
        let stat = bus.raw(io::STAT);
        bus.set_raw(io::STAT, (stat & !0x03) | mode as u8);
    }

    fn disable_lcd(&mut self, bus: &mut Bus) {
        log::debug!("LCD off");
        self.lcd_on = false;
        self.mode_clock = 0;
        self.stat_irq_line = false;
        bus.set_raw(io::LY, 0);
        self.enter_mode(bus, Mode::HBlank);
        self.win_line_counter = 0;
        self.window_drawn = false;
    }

    fn enable_lcd(&mut self, bus: &mut Bus) {
        log::debug!("LCD on");
        self.lcd_on = true;
        self.mode_clock = 0;
        bus.set_raw(io::LY, 0);
        self.enter_mode(bus, Mode::OamSearch);
    }

    fn update_stat(&mut self, bus: &mut Bus) {
        let stat = bus.raw(io::STAT);
        let coincidence = bus.raw(io::LY) == bus.raw(io::LYC);
        let stat = (stat & 0x78) | 0x80 | if coincidence { 0x04 } else { 0 } | self.mode as u8;
        bus.set_raw(io::STAT, stat);

        let mode_signal = match self.mode {
            Mode::HBlank => stat & 0x08 != 0,
            Mode::VBlank => stat & 0x10 != 0,
            Mode::OamSearch => stat & 0x20 != 0,
            Mode::PixelTransfer => false,
        };
        let current = (coincidence && stat & 0x40 != 0) || mode_signal;
        if current && !self.stat_irq_line {
            bus.request_interrupt(Interrupt::LcdStat);
        }
        self.stat_irq_line = current;
    }

    fn oam_scan(&mut self, bus: &Bus) {
        self.sprite_count = 0;
        let lcdc = bus.raw(io::LCDC);
        if lcdc & 0x02 == 0 {
            return;
        }
        let sprite_height: i16 = if lcdc & 0x04 != 0 { 16 } else { 8 };
        let ly = bus.raw(io::LY) as i16;
        let oam = bus.raw_slice(io::OAM_START..=io::OAM_END);
        for i in 0..TOTAL_SPRITES {
            if self.sprite_count >= MAX_SPRITES_PER_LINE {
                break;
            }
            let base = i * 4;
            let y = oam[base] as i16 - 16;
            if ly >= y && ly < y + sprite_height {
                self.line_sprites[self.sprite_count] = Sprite {
                    x: oam[base + 1] as i16 - 8,
                    y,
                    tile: oam[base + 2],
                    flags: oam[base + 3],
                    oam_index: i,
                };
                self.sprite_count += 1;
            }
        }
        // DMG priority: lower X wins, then lower OAM index
        self.line_sprites[..self.sprite_count].sort_by_key(|s| (s.x, s.oam_index));
    }

    fn dmg_shade(palette: u8, color_id: u8) -> u8 {
        (palette >> (color_id * 2)) & 0x03
    }

    fn tile_pixel(bus: &Bus, tile_addr: u16, row: u16, bit: u8) -> u8 {
        let lo = bus.raw(tile_addr + row * 2);
        let hi = bus.raw(tile_addr + row * 2 + 1);
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    fn render_pixels(&mut self, bus: &Bus, count: usize) {
        let end = (self.render_x + count).min(SCREEN_WIDTH);
        for x in self.render_x..end {
            self.render_pixel(bus, x);
        }
        self.render_x = end;
    }

    fn render_pixel(&mut self, bus: &Bus, x: usize) {
        let lcdc = bus.raw(io::LCDC);
        let ly = bus.raw(io::LY);
        if ly as usize >= SCREEN_HEIGHT {
            return;
        }

        let mut bg_color = 0;
        let mut shade = 0;
        if lcdc & 0x01 != 0 {
            let wx = bus.raw(io::WX);
            let window = lcdc & 0x20 != 0
                && ly >= bus.raw(io::WY)
                && wx <= WINDOW_X_MAX
                && x as u16 + 7 >= wx as u16;
            let (map_base, px, py) = if window {
                self.window_drawn = true;
                let base = if lcdc & 0x40 != 0 {
                    BG_MAP_1_BASE
                } else {
                    BG_MAP_0_BASE
                };
                (base, x as u16 + 7 - wx as u16, self.win_line_counter as u16)
            } else {
                let base = if lcdc & 0x08 != 0 {
                    BG_MAP_1_BASE
                } else {
                    BG_MAP_0_BASE
                };
                let px = (x as u16 + bus.raw(io::SCX) as u16) & 0xFF;
                let py = (ly as u16 + bus.raw(io::SCY) as u16) & 0xFF;
                (base, px, py)
            };

            let tile_index = bus.raw(map_base + (py / 8) * 32 + px / 8);
            let tile_addr = if lcdc & 0x10 != 0 {
                TILE_DATA_0_BASE + tile_index as u16 * 16
            } else {
                TILE_DATA_1_BASE.wrapping_add((tile_index as i8 as i16 * 16) as u16)
            };
            bg_color = Self::tile_pixel(bus, tile_addr, py % 8, 7 - (px % 8) as u8);
            shade = Self::dmg_shade(bus.raw(io::BGP), bg_color);
        }

        if lcdc & 0x02 != 0
            && let Some((color, flags)) = self.sprite_pixel(bus, lcdc, ly, x as i16)
        {
            let hidden = flags & 0x80 != 0 && bg_color != 0;
            if !hidden {
                let palette = if flags & 0x10 != 0 {
                    bus.raw(io::OBP1)
                } else {
                    bus.raw(io::OBP0)
                };
                shade = Self::dmg_shade(palette, color);
            }
        }

        self.framebuffer[ly as usize * SCREEN_WIDTH + x] = shade;
    }

    /// Highest priority opaque sprite pixel at column `sx`.
    fn sprite_pixel(&self, bus: &Bus, lcdc: u8, ly: u8, sx: i16) -> Option<(u8, u8)> {
        let tall = lcdc & 0x04 != 0;
        let height: i16 = if tall { 16 } else { 8 };
        for s in &self.line_sprites[..self.sprite_count] {
            if sx < s.x || sx >= s.x + 8 {
                continue;
            }
            let mut row = ly as i16 - s.y;
            if s.flags & 0x40 != 0 {
                row = height - 1 - row;
            }
            let col = (sx - s.x) as u8;
            let bit = if s.flags & 0x20 != 0 { col } else { 7 - col };
            let tile = if tall { s.tile & 0xFE } else { s.tile };
            let addr = TILE_DATA_0_BASE + tile as u16 * 16;
            let color = Self::tile_pixel(bus, addr, row as u16, bit);
            if color != 0 {
                return Some((color, s.flags));
            }
        }
        None
    }
}
