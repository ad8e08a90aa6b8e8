use pockemu_core::{
    bus::Bus,
    io,
    ppu::{FRAME_CYCLES, Mode, Ppu, SCREEN_WIDTH},
};

const LINE_CYCLES: u32 = 114;

fn ppu() -> (Bus, Ppu) {
    let mut bus = Bus::new();
    let ppu = Ppu::new(&mut bus);
    bus.set_raw(io::IF, 0x00);
    bus.set_raw(io::BGP, 0xE4);
    bus.set_raw(io::OBP0, 0xE4);
    bus.set_raw(io::OBP1, 0xE4);
    (bus, ppu)
}

fn fill_tile(bus: &mut Bus, addr: u16, lo: u8, hi: u8) {
    for row in 0..8 {
        bus.set_raw(addr + row * 2, lo);
        bus.set_raw(addr + row * 2 + 1, hi);
    }
}

fn set_sprite(bus: &mut Bus, index: u16, y: u8, x: u8, tile: u8, flags: u8) {
    let base = io::OAM_START + index * 4;
    bus.set_raw(base, y);
    bus.set_raw(base + 1, x);
    bus.set_raw(base + 2, tile);
    bus.set_raw(base + 3, flags);
}

/// Render line 0 and return its pixels.
fn first_line(bus: &mut Bus, ppu: &mut Ppu) -> Vec<u8> {
    ppu.update(bus, LINE_CYCLES);
    ppu.framebuffer()[..SCREEN_WIDTH].to_vec()
}

#[test]
fn modes_follow_scanline_timing() {
    let (mut bus, mut ppu) = ppu();
    assert_eq!(ppu.mode, Mode::OamSearch);
    assert_eq!(bus.read(io::STAT) & 0x03, 2);

    ppu.update(&mut bus, 20);
    assert_eq!(ppu.mode, Mode::PixelTransfer);
    assert_eq!(bus.read(io::STAT) & 0x03, 3);

    ppu.update(&mut bus, 43);
    assert_eq!(ppu.mode, Mode::HBlank);
    assert_eq!(bus.read(io::STAT) & 0x03, 0);

    ppu.update(&mut bus, 51);
    assert_eq!(ppu.mode, Mode::OamSearch);
    assert_eq!(bus.read(io::LY), 1);
}

#[test]
fn vblank_to_vblank_is_one_frame() {
    let (mut bus, mut ppu) = ppu();
    ppu.update(&mut bus, 144 * LINE_CYCLES - 1);
    assert_eq!(ppu.mode, Mode::HBlank);
    assert_eq!(bus.raw(io::IF) & 0x01, 0);

    ppu.update(&mut bus, 1);
    assert_eq!(ppu.mode, Mode::VBlank);
    assert_eq!(bus.read(io::LY), 144);
    assert_eq!(bus.raw(io::IF) & 0x01, 0x01);
    assert!(ppu.frame_ready());
    assert_eq!(ppu.frames(), 1);

    let mut cycles = 0;
    while ppu.mode == Mode::VBlank {
        ppu.update(&mut bus, 1);
        cycles += 1;
    }
    assert_eq!(bus.read(io::LY), 0);
    while ppu.mode != Mode::VBlank {
        ppu.update(&mut bus, 1);
        cycles += 1;
    }
    assert_eq!(cycles, FRAME_CYCLES);
    assert_eq!(ppu.frames(), 2);
}

#[test]
fn ly_is_read_only() {
    let (mut bus, mut ppu) = ppu();
    ppu.update(&mut bus, 3 * LINE_CYCLES);
    bus.write(io::LY, 0x55);
    assert_eq!(bus.read(io::LY), 3);
}

#[test]
fn lyc_match_raises_stat_interrupt() {
    let (mut bus, mut ppu) = ppu();
    bus.write(io::LYC, 2);
    bus.write(io::STAT, 0x40);

    ppu.update(&mut bus, 2 * LINE_CYCLES - 1);
    assert_eq!(bus.raw(io::IF) & 0x02, 0);
    assert_eq!(bus.read(io::STAT) & 0x04, 0);

    ppu.update(&mut bus, 1);
    assert_eq!(bus.raw(io::IF) & 0x02, 0x02);
    assert_eq!(bus.read(io::STAT) & 0x44, 0x44);
}

#[test]
fn hblank_source_fires_on_mode_0_entry() {
    let (mut bus, mut ppu) = ppu();
    bus.write(io::STAT, 0x08);

    ppu.update(&mut bus, 20 + 43 - 1);
    assert_eq!(ppu.mode, Mode::PixelTransfer);
    assert_eq!(bus.raw(io::IF) & 0x02, 0);

    ppu.update(&mut bus, 1);
    assert_eq!(ppu.mode, Mode::HBlank);
    assert_eq!(bus.raw(io::IF) & 0x02, 0x02);

    // Leaving HBlank for an unselected mode raises nothing.
    bus.set_raw(io::IF, 0x00);
    ppu.update(&mut bus, 51);
    assert_eq!(ppu.mode, Mode::OamSearch);
    assert_eq!(bus.raw(io::IF) & 0x02, 0);
}

#[test]
fn vblank_source_fires_on_mode_1_entry() {
    let (mut bus, mut ppu) = ppu();
    bus.write(io::STAT, 0x10);

    ppu.update(&mut bus, 144 * LINE_CYCLES - 1);
    assert_eq!(bus.raw(io::IF) & 0x02, 0);

    ppu.update(&mut bus, 1);
    assert_eq!(ppu.mode, Mode::VBlank);
    assert_eq!(bus.raw(io::IF) & 0x03, 0x03);

    // The line stays high across the ten VBlank lines.
    bus.set_raw(io::IF, 0x00);
    ppu.update(&mut bus, 10 * LINE_CYCLES - 1);
    assert_eq!(ppu.mode, Mode::VBlank);
    assert_eq!(bus.raw(io::IF) & 0x02, 0);
}

#[test]
fn oam_source_fires_on_mode_2_entry() {
    let (mut bus, mut ppu) = ppu();
    ppu.update(&mut bus, 20 + 43);
    assert_eq!(ppu.mode, Mode::HBlank);
    bus.write(io::STAT, 0x20);
    bus.set_raw(io::IF, 0x00);

    ppu.update(&mut bus, 51 - 1);
    assert_eq!(ppu.mode, Mode::HBlank);
    assert_eq!(bus.raw(io::IF) & 0x02, 0);

    ppu.update(&mut bus, 1);
    assert_eq!(ppu.mode, Mode::OamSearch);
    assert_eq!(bus.read(io::LY), 1);
    assert_eq!(bus.raw(io::IF) & 0x02, 0x02);
}

#[test]
fn stat_mode_bits_ignore_writes() {
    let (mut bus, _ppu) = ppu();
    bus.write(io::STAT, 0xFF);
    assert_eq!(bus.read(io::STAT), 0xFA);
}

#[test]
fn vram_and_oam_blocked_while_in_use() {
    let (mut bus, mut ppu) = ppu();
    bus.write(io::OAM_START, 0x11);
    assert_eq!(bus.raw(io::OAM_START), 0x00);
    bus.write(io::VRAM_START, 0x22);
    assert_eq!(bus.raw(io::VRAM_START), 0x22);

    ppu.update(&mut bus, 20);
    bus.write(io::VRAM_START, 0x33);
    bus.write(io::OAM_START, 0x33);
    assert_eq!(bus.raw(io::VRAM_START), 0x22);
    assert_eq!(bus.raw(io::OAM_START), 0x00);

    ppu.update(&mut bus, 43);
    bus.write(io::VRAM_START, 0x44);
    bus.write(io::OAM_START, 0x44);
    assert_eq!(bus.raw(io::VRAM_START), 0x44);
    assert_eq!(bus.raw(io::OAM_START), 0x44);
}

#[test]
fn lcd_off_freezes_ly_and_framebuffer() {
    let (mut bus, mut ppu) = ppu();
    fill_tile(&mut bus, 0x8000, 0xFF, 0xFF);
    bus.set_raw(io::LCDC, 0x91);
    ppu.update(&mut bus, 4 * LINE_CYCLES + 30);
    let frame = *ppu.framebuffer();

    bus.write(io::LCDC, 0x11);
    ppu.update(&mut bus, 2 * FRAME_CYCLES);
    assert!(!ppu.lcd_enabled());
    assert_eq!(bus.read(io::LY), 0);
    assert_eq!(bus.read(io::STAT) & 0x03, 0);
    assert_eq!(ppu.framebuffer(), &frame);

    // Nothing is blocked while the display is off.
    bus.write(io::OAM_START, 0x99);
    assert_eq!(bus.raw(io::OAM_START), 0x99);

    bus.write(io::LCDC, 0x91);
    ppu.update(&mut bus, 1);
    assert!(ppu.lcd_enabled());
    assert_eq!(ppu.mode, Mode::OamSearch);
    assert_eq!(bus.read(io::LY), 0);
}

#[test]
fn oam_dma_copies_one_byte_per_cycle() {
    let (mut bus, mut ppu) = ppu();
    for i in 0..0xA0u16 {
        bus.write(0xC000 + i, i as u8 ^ 0x5A);
    }
    ppu.start_dma(0xC0);
    ppu.update(&mut bus, 10);
    assert!(ppu.dma_active());
    assert_eq!(bus.raw(io::OAM_START + 9), 9 ^ 0x5A);
    assert_eq!(bus.raw(io::OAM_START + 10), 0);

    ppu.update(&mut bus, 150);
    assert!(!ppu.dma_active());
    for i in 0..0xA0u16 {
        assert_eq!(bus.raw(io::OAM_START + i), i as u8 ^ 0x5A);
    }
}

#[test]
fn equal_x_sprites_prefer_lower_oam_index() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x93);
    fill_tile(&mut bus, 0x8010, 0xFF, 0xFF); // colour 3
    fill_tile(&mut bus, 0x8020, 0xFF, 0x00); // colour 1
    set_sprite(&mut bus, 0, 16, 8, 1, 0);
    set_sprite(&mut bus, 1, 16, 8, 2, 0);

    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(&line[..8], &[3; 8]);
    assert_eq!(line[8], 0);
}

#[test]
fn lower_x_sprite_wins_overlap() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x93);
    fill_tile(&mut bus, 0x8010, 0xFF, 0xFF);
    fill_tile(&mut bus, 0x8020, 0xFF, 0x00);
    set_sprite(&mut bus, 0, 16, 12, 1, 0);
    set_sprite(&mut bus, 1, 16, 8, 2, 0);

    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(&line[..8], &[1; 8]);
    assert_eq!(&line[8..12], &[3; 4]);
}

#[test]
fn at_most_ten_sprites_per_line() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x93);
    fill_tile(&mut bus, 0x8010, 0xFF, 0xFF);
    for i in 0..11u16 {
        set_sprite(&mut bus, i, 16, 8 + 8 * i as u8, 1, 0);
    }

    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(line[79], 3);
    assert_eq!(line[80], 0);
}

#[test]
fn sprite_flips_and_background_priority() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x93);
    // Background tile 0 is colour 1 everywhere.
    fill_tile(&mut bus, 0x8000, 0xFF, 0x00);
    // Sprite tile 1: only the leftmost column is opaque.
    fill_tile(&mut bus, 0x8010, 0x80, 0x80);
    set_sprite(&mut bus, 0, 16, 8, 1, 0x00);
    set_sprite(&mut bus, 1, 16, 16, 1, 0x20);
    set_sprite(&mut bus, 2, 16, 24, 1, 0x80);

    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(line[0], 3);
    assert_eq!(line[1], 1);
    assert_eq!(line[8], 1);
    assert_eq!(line[15], 3);
    // Behind a non-zero background pixel.
    assert_eq!(line[16], 1);
}

#[test]
fn tall_sprites_ignore_tile_low_bit() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x97);
    fill_tile(&mut bus, 0x8020, 0xFF, 0xFF);
    fill_tile(&mut bus, 0x8030, 0xFF, 0x00);
    // Tile 3 is drawn as 2/3; line 0 comes from tile 2.
    set_sprite(&mut bus, 0, 16, 8, 3, 0);
    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(line[0], 3);

    // Vertical flip puts tile 3 on the first line.
    set_sprite(&mut bus, 0, 16, 8, 3, 0x40);
    ppu.update(&mut bus, FRAME_CYCLES - LINE_CYCLES);
    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(line[0], 1);
}

#[test]
fn signed_tile_addressing() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x81);
    bus.set_raw(0x9800, 0x80);
    fill_tile(&mut bus, 0x8800, 0xFF, 0xFF);

    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(&line[..8], &[3; 8]);
    // Tile 0 in this mode lives at 0x9000 and is blank.
    assert_eq!(line[8], 0);
}

#[test]
fn window_covers_background_from_wx() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0xF1);
    fill_tile(&mut bus, 0x8010, 0xFF, 0xFF);
    for i in 0..32 {
        bus.set_raw(0x9C00 + i, 1);
    }
    bus.set_raw(io::WY, 0);
    bus.set_raw(io::WX, 87);

    let line = first_line(&mut bus, &mut ppu);
    assert_eq!(line[79], 0);
    assert_eq!(line[80], 3);
    assert_eq!(line[159], 3);
}

#[test]
fn background_disabled_draws_shade_zero() {
    let (mut bus, mut ppu) = ppu();
    bus.set_raw(io::LCDC, 0x90);
    fill_tile(&mut bus, 0x8000, 0xFF, 0xFF);
    bus.set_raw(io::BGP, 0xFF);

    let line = first_line(&mut bus, &mut ppu);
    assert!(line.iter().all(|&s| s == 0));
}
