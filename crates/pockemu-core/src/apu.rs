use crate::{
    CPU_CLOCK_HZ,
    bus::{Bus, Hook},
    io,
};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

// Master clock ticks per machine cycle
const T_CYCLES: i32 = 4;
const VOLUME_FACTOR: i16 = 64;

// DIV bit whose falling edge clocks the frame sequencer (512 Hz)
const FRAME_SEQUENCER_DIV_BIT: u8 = 0x10;

// Register values left by the boot ROM, 0xFF10-0xFF3F
const POWER_ON_REGS: [u8; 0x30] = [
    0x80, 0xBF, 0xF3, 0xFF, 0xBF, 0xFF, 0x3F, 0x00, 0xFF, 0xBF, 0x7F, 0xFF, 0x9F, 0xFF, 0xBF, 0xFF,
    0xFF, 0x00, 0x00, 0xBF, 0x77, 0xF3, 0xF1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

// Pulse waveforms indexed by NRx1 bits 6-7: 12.5%, 25%, 50%, 75%
const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 0],
];

// Right shift applied to wave samples per NR32 volume code (0 mutes)
const WAVE_SHIFT: [u8; 4] = [4, 0, 1, 2];

/// Bits that read back as 1 for each sound register (write-only or unused).
fn read_or_mask(addr: u16) -> u8 {
    match addr {
        0xFF10 => 0x80,
        0xFF11 => 0x3F,
        0xFF12 => 0x00,
        0xFF13 => 0xFF,
        0xFF14 => 0xBF,
        0xFF16 => 0x3F,
        0xFF17 => 0x00,
        0xFF18 => 0xFF,
        0xFF19 => 0xBF,
        0xFF1A => 0x7F,
        0xFF1B => 0xFF,
        0xFF1C => 0x9F,
        0xFF1D => 0xFF,
        0xFF1E => 0xBF,
        0xFF20 => 0xFF,
        0xFF21 => 0x00,
        0xFF22 => 0x00,
        0xFF23 => 0xBF,
        0xFF24 => 0x00,
        0xFF25 => 0x00,
        0xFF26 => 0x70,
        0xFF30..=0xFF3F => 0x00,
        _ => 0xFF,
    }
}

#[derive(Default, Clone, Copy)]
struct Envelope {
    initial: u8,
    period: u8,
    add: bool,
    volume: u8,
    timer: u8,
}

impl Envelope {
    fn clock(&mut self) {
        if self.period == 0 {
            return;
        }
        if self.timer > 0 {
            self.timer -= 1;
        }
        if self.timer == 0 {
            self.timer = self.period;
            if self.add && self.volume < 15 {
                self.volume += 1;
            } else if !self.add && self.volume > 0 {
                self.volume -= 1;
            }
        }
    }

    fn reset(&mut self, val: u8) {
        self.initial = val >> 4;
        self.volume = self.initial;
        self.period = val & 0x07;
        self.add = val & 0x08 != 0;
        self.timer = self.period;
    }
}

#[derive(Default)]
struct Sweep {
    period: u8,
    negate: bool,
    shift: u8,
    timer: u8,
    shadow: u16,
    enabled: bool,
}

impl Sweep {
    fn calculate(&self) -> u16 {
        let delta = self.shadow >> self.shift;
        if self.negate {
            self.shadow.wrapping_sub(delta)
        } else {
            self.shadow.wrapping_add(delta)
        }
    }

    fn set_params(&mut self, val: u8) {
        self.period = (val >> 4) & 0x07;
        self.negate = val & 0x08 != 0;
        self.shift = val & 0x07;
    }

    fn reload(&mut self, freq: u16) {
        self.shadow = freq;
        self.timer = if self.period == 0 { 8 } else { self.period };
        self.enabled = self.period != 0 || self.shift != 0;
    }
}

#[derive(Default)]
struct SquareChannel {
    enabled: bool,
    dac_enabled: bool,
    length: u8,
    length_enable: bool,
    duty: u8,
    duty_pos: u8,
    frequency: u16,
    timer: i32,
    envelope: Envelope,
    sweep: Option<Sweep>,
}

impl SquareChannel {
    fn new(with_sweep: bool) -> Self {
        Self {
            sweep: with_sweep.then(Sweep::default),
            ..Default::default()
        }
    }

    fn period(&self) -> i32 {
        (2048 - self.frequency as i32) * 4
    }

    fn step(&mut self, cycles: i32) {
        if !self.enabled {
            return;
        }
        self.timer -= cycles;
        while self.timer <= 0 {
            self.timer += self.period();
            self.duty_pos = (self.duty_pos + 1) & 0x07;
        }
    }

    fn output(&self) -> u8 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        DUTY_TABLE[self.duty as usize][self.duty_pos as usize] * self.envelope.volume
    }

    fn trigger(&mut self, nrx2: u8) {
        self.enabled = self.dac_enabled;
        if self.length == 0 {
            self.length = 64;
        }
        self.timer = self.period();
        self.envelope.reset(nrx2);
        let freq = self.frequency;
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.reload(freq);
            if sweep.shift != 0 && sweep.calculate() > 2047 {
                self.enabled = false;
            }
        }
    }

    fn clock_length(&mut self) {
        if self.length_enable && self.length > 0 {
            self.length -= 1;
            if self.length == 0 {
                self.enabled = false;
            }
        }
    }

    /// Returns the new frequency when the sweep rewrote it.
    fn clock_sweep(&mut self) -> Option<u16> {
        let sweep = self.sweep.as_mut()?;
        if sweep.timer > 0 {
            sweep.timer -= 1;
        }
        if sweep.timer != 0 {
            return None;
        }
        sweep.timer = if sweep.period == 0 { 8 } else { sweep.period };
        if !sweep.enabled || sweep.period == 0 {
            return None;
        }
        let new_freq = sweep.calculate();
        if new_freq > 2047 {
            self.enabled = false;
            return None;
        }
        if sweep.shift == 0 {
            return None;
        }
        sweep.shadow = new_freq;
        self.frequency = new_freq;
        if sweep.calculate() > 2047 {
            self.enabled = false;
        }
        Some(new_freq)
    }
}

#[derive(Default)]
struct WaveChannel {
    enabled: bool,
    dac_enabled: bool,
    length: u16,
    length_enable: bool,
    volume: u8,
    position: u8,
    last_sample: u8,
    frequency: u16,
    timer: i32,
}

impl WaveChannel {
    fn period(&self) -> i32 {
        (2048 - self.frequency as i32) * 2
    }

    fn step(&mut self, cycles: i32, wave_ram: &[u8]) {
        if !self.enabled {
            return;
        }
        self.timer -= cycles;
        while self.timer <= 0 {
            self.timer += self.period();
            self.position = (self.position + 1) & 0x1F;
            let byte = wave_ram[(self.position / 2) as usize];
            self.last_sample = if self.position & 1 == 0 {
                byte >> 4
            } else {
                byte & 0x0F
            };
        }
    }

    fn output(&self) -> u8 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        self.last_sample >> WAVE_SHIFT[self.volume as usize & 0x03]
    }

    fn trigger(&mut self) {
        self.enabled = self.dac_enabled;
        if self.length == 0 {
            self.length = 256;
        }
        self.timer = self.period();
        self.position = 0;
    }

    fn clock_length(&mut self) {
        if self.length_enable && self.length > 0 {
            self.length -= 1;
            if self.length == 0 {
                self.enabled = false;
            }
        }
    }
}

#[derive(Default)]
struct NoiseChannel {
    enabled: bool,
    dac_enabled: bool,
    length: u8,
    length_enable: bool,
    envelope: Envelope,
    clock_shift: u8,
    divisor: u8,
    width7: bool,
    lfsr: u16,
    timer: i32,
}

impl NoiseChannel {
    fn period(&self) -> i32 {
        let r = match self.divisor {
            0 => 8,
            _ => (self.divisor as i32) * 16,
        };
        r << self.clock_shift
    }

    fn step(&mut self, cycles: i32) {
        if !self.enabled {
            return;
        }
        // Shifts 14 and 15 stop the LFSR clock.
        if self.clock_shift >= 14 {
            return;
        }
        self.timer -= cycles;
        while self.timer <= 0 {
            self.timer += self.period();
            let bit = (self.lfsr ^ (self.lfsr >> 1)) & 1;
            self.lfsr = (self.lfsr >> 1) | (bit << 14);
            if self.width7 {
                self.lfsr = (self.lfsr & !0x40) | (bit << 6);
            }
        }
    }

    fn output(&self) -> u8 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        if self.lfsr & 1 == 0 {
            self.envelope.volume
        } else {
            0
        }
    }

    fn trigger(&mut self, nr42: u8) {
        self.enabled = self.dac_enabled;
        if self.length == 0 {
            self.length = 64;
        }
        self.timer = self.period();
        self.envelope.reset(nr42);
        self.lfsr = 0x7FFF;
    }

    fn clock_length(&mut self) {
        if self.length_enable && self.length > 0 {
            self.length -= 1;
            if self.length == 0 {
                self.enabled = false;
            }
        }
    }
}

/// One-pole high-pass that removes the DAC bias from one output side.
#[derive(Default, Clone, Copy)]
struct DcBlocker {
    prev_in: f32,
    prev_out: f32,
}

impl DcBlocker {
    fn process(&mut self, input: f32, coef: f32) -> f32 {
        let out = input - self.prev_in + coef * self.prev_out;
        self.prev_in = input;
        self.prev_out = out;
        out
    }
}

struct FrameSequencer {
    step: u8,
}

impl FrameSequencer {
    fn new() -> Self {
        Self { step: 0 }
    }

    fn advance(&mut self) -> u8 {
        let s = self.step;
        self.step = (self.step + 1) & 7;
        s
    }
}

pub struct Apu {
    ch1: SquareChannel,
    ch2: SquareChannel,
    ch3: WaveChannel,
    ch4: NoiseChannel,
    sequencer: FrameSequencer,
    powered: bool,
    last_div: u8,
    sample_rate: u32,
    /// Master clock ticks since the last emitted sample
    sample_timer: u32,
    samples: Vec<(i16, i16)>,
    hp_coef: f32,
    /// Left and right output filters
    dc: [DcBlocker; 2],
}

impl Apu {
    pub fn new(bus: &mut Bus) -> Self {
        for addr in io::NR10..=io::WAVE_RAM_END {
            bus.set_read_mask(addr..=addr, !read_or_mask(addr));
            bus.set_raw(addr, POWER_ON_REGS[(addr - io::NR10) as usize]);
        }
        bus.set_write_mask(io::NR52..=io::NR52, 0x80);
        bus.set_hook(io::NR10..=io::NR52, Hook::Sound);

        let mut apu = Self {
            ch1: SquareChannel::new(true),
            ch2: SquareChannel::new(false),
            ch3: WaveChannel::default(),
            ch4: NoiseChannel::default(),
            sequencer: FrameSequencer::new(),
            powered: true,
            last_div: bus.raw(io::DIV),
            sample_rate: DEFAULT_SAMPLE_RATE,
            sample_timer: 0,
            samples: Vec::new(),
            hp_coef: Self::hp_coef_for(DEFAULT_SAMPLE_RATE),
            dc: [DcBlocker::default(); 2],
        };

        // The boot chime leaves channel 1 running at zero volume.
        let nr11 = bus.raw(io::NR11);
        apu.ch1.duty = nr11 >> 6;
        apu.ch1.dac_enabled = bus.raw(io::NR12) & 0xF8 != 0;
        apu.ch1.enabled = true;
        apu.ch1.frequency = Self::frequency(bus, io::NR13, io::NR14);
        apu.ch1.timer = apu.ch1.period();
        apu
    }

    fn hp_coef_for(rate: u32) -> f32 {
        0.999958f32.powf(CPU_CLOCK_HZ as f32 / rate as f32)
    }

    pub fn set_sample_rate(&mut self, rate: u32) {
        self.sample_rate = rate.max(1);
        self.hp_coef = Self::hp_coef_for(self.sample_rate);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Drain the stereo samples produced since the last call.
    pub fn take_samples(&mut self) -> Vec<(i16, i16)> {
        std::mem::take(&mut self.samples)
    }

    pub fn sequencer_step(&self) -> u8 {
        self.sequencer.step
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    /// Enable flags of channels 1-4 in NR52 order.
    pub fn channel_status(&self) -> u8 {
        (self.ch1.enabled as u8)
            | (self.ch2.enabled as u8) << 1
            | (self.ch3.enabled as u8) << 2
            | (self.ch4.enabled as u8) << 3
    }

    fn frequency(bus: &Bus, lo: u16, hi: u16) -> u16 {
        ((bus.raw(hi) as u16 & 0x07) << 8) | bus.raw(lo) as u16
    }

    /// Sound register write hook.
    pub fn on_write(&mut self, bus: &mut Bus, addr: u16, val: u8) {
        if addr == io::NR52 {
            let on = val & 0x80 != 0;
            if self.powered && !on {
                self.power_off(bus);
            } else if !self.powered && on {
                log::debug!("APU on");
                self.powered = true;
                self.sequencer.step = 0;
            }
            self.refresh_status(bus);
            return;
        }
        if !self.powered {
            // Registers are read-only while the APU is off.
            bus.set_raw(addr, 0);
            return;
        }

        match addr {
            io::NR10 => {
                if let Some(sweep) = self.ch1.sweep.as_mut() {
                    sweep.set_params(val);
                }
            }
            io::NR11 => {
                self.ch1.duty = val >> 6;
                self.ch1.length = 64 - (val & 0x3F);
            }
            io::NR12 => {
                self.ch1.dac_enabled = val & 0xF8 != 0;
                if !self.ch1.dac_enabled {
                    self.ch1.enabled = false;
                }
            }
            io::NR13 | io::NR14 => {
                self.ch1.frequency = Self::frequency(bus, io::NR13, io::NR14);
                if addr == io::NR14 {
                    self.ch1.length_enable = val & 0x40 != 0;
                    if val & 0x80 != 0 {
                        self.ch1.trigger(bus.raw(io::NR12));
                    }
                }
            }
            io::NR21 => {
                self.ch2.duty = val >> 6;
                self.ch2.length = 64 - (val & 0x3F);
            }
            io::NR22 => {
                self.ch2.dac_enabled = val & 0xF8 != 0;
                if !self.ch2.dac_enabled {
                    self.ch2.enabled = false;
                }
            }
            io::NR23 | io::NR24 => {
                self.ch2.frequency = Self::frequency(bus, io::NR23, io::NR24);
                if addr == io::NR24 {
                    self.ch2.length_enable = val & 0x40 != 0;
                    if val & 0x80 != 0 {
                        self.ch2.trigger(bus.raw(io::NR22));
                    }
                }
            }
            io::NR30 => {
                self.ch3.dac_enabled = val & 0x80 != 0;
                if !self.ch3.dac_enabled {
                    self.ch3.enabled = false;
                }
            }
            io::NR31 => self.ch3.length = 256 - val as u16,
            io::NR32 => self.ch3.volume = (val >> 5) & 0x03,
            io::NR33 | io::NR34 => {
                self.ch3.frequency = Self::frequency(bus, io::NR33, io::NR34);
                if addr == io::NR34 {
                    self.ch3.length_enable = val & 0x40 != 0;
                    if val & 0x80 != 0 {
                        self.ch3.trigger();
                    }
                }
            }
            io::NR41 => self.ch4.length = 64 - (val & 0x3F),
            io::NR42 => {
                self.ch4.dac_enabled = val & 0xF8 != 0;
                if !self.ch4.dac_enabled {
                    self.ch4.enabled = false;
                }
            }
            io::NR43 => {
                self.ch4.clock_shift = val >> 4;
                self.ch4.width7 = val & 0x08 != 0;
                self.ch4.divisor = val & 0x07;
            }
            io::NR44 => {
                self.ch4.length_enable = val & 0x40 != 0;
                if val & 0x80 != 0 {
                    self.ch4.trigger(bus.raw(io::NR42));
                }
            }
            _ => {}
        }
        self.refresh_status(bus);
    }

    fn power_off(&mut self, bus: &mut Bus) {
        log::debug!("APU off");
        for addr in io::NR10..io::NR52 {
            bus.set_raw(addr, 0);
        }
        self.ch1 = SquareChannel::new(true);
        self.ch2 = SquareChannel::new(false);
        self.ch3 = WaveChannel::default();
        self.ch4 = NoiseChannel::default();
        self.sequencer.step = 0;
        self.powered = false;
    }

    fn refresh_status(&self, bus: &mut Bus) {
        let power = if self.powered { 0x80 } else { 0 };
        bus.set_raw(io::NR52, power | self.channel_status());
    }

    fn clock_frame_sequencer(&mut self, bus: &mut Bus, step: u8) {
        if matches!(step, 0 | 2 | 4 | 6) {
            self.ch1.clock_length();
            self.ch2.clock_length();
            self.ch3.clock_length();
            self.ch4.clock_length();
        }
        if (step == 2 || step == 6)
            && let Some(freq) = self.ch1.clock_sweep()
        {
            bus.set_raw(io::NR13, freq as u8);
            let nr14 = bus.raw(io::NR14);
            bus.set_raw(io::NR14, (nr14 & 0xF8) | ((freq >> 8) as u8 & 0x07));
        }
        if step == 7 {
            self.ch1.envelope.clock();
            self.ch2.envelope.clock();
            self.ch4.envelope.clock();
        }
    }

    /// Advance by `cycles` machine cycles, emitting samples at the
    /// configured output rate.
    pub fn update(&mut self, bus: &mut Bus, cycles: u32) {
        let div = bus.raw(io::DIV);
        if self.powered
            && self.last_div & FRAME_SEQUENCER_DIV_BIT != 0
            && div & FRAME_SEQUENCER_DIV_BIT == 0
        {
            let step = self.sequencer.advance();
            self.clock_frame_sequencer(bus, step);
        }
        self.last_div = div;

        let cps = (CPU_CLOCK_HZ / self.sample_rate).max(1);
        for _ in 0..cycles {
            if self.powered {
                self.ch1.step(T_CYCLES);
                self.ch2.step(T_CYCLES);
                self.ch3
                    .step(T_CYCLES, bus.raw_slice(io::WAVE_RAM_START..=io::WAVE_RAM_END));
                self.ch4.step(T_CYCLES);
            }
            self.sample_timer += T_CYCLES as u32;
            if self.sample_timer >= cps {
                self.sample_timer -= cps;
                let sample = self.mix_output(bus);
                self.samples.push(sample);
            }
        }
        self.refresh_status(bus);
    }

    fn mix_output(&mut self, bus: &Bus) -> (i16, i16) {
        let dacs_on = self.ch1.dac_enabled
            || self.ch2.dac_enabled
            || self.ch3.dac_enabled
            || self.ch4.dac_enabled;
        if !self.powered || !dacs_on {
            self.dc = [DcBlocker::default(); 2];
            return (0, 0);
        }

        // Each DAC maps 0..15 to -15..15; a DAC that is off contributes nothing.
        let dac = |on: bool, out: u8| if on { out as i16 * 2 - 15 } else { 0 };
        let outputs = [
            dac(self.ch1.dac_enabled, self.ch1.output()),
            dac(self.ch2.dac_enabled, self.ch2.output()),
            dac(self.ch3.dac_enabled, self.ch3.output()),
            dac(self.ch4.dac_enabled, self.ch4.output()),
        ];

        let nr51 = bus.raw(io::NR51);
        let mut left = 0i16;
        let mut right = 0i16;
        for (i, out) in outputs.iter().enumerate() {
            if nr51 & (0x10 << i) != 0 {
                left += out;
            }
            if nr51 & (0x01 << i) != 0 {
                right += out;
            }
        }

        let nr50 = bus.raw(io::NR50);
        let left_vol = ((nr50 >> 4) & 0x07) as i16 + 1;
        let right_vol = (nr50 & 0x07) as i16 + 1;

        self.dc_block(
            left * left_vol * VOLUME_FACTOR,
            right * right_vol * VOLUME_FACTOR,
        )
    }

    fn dc_block(&mut self, left: i16, right: i16) -> (i16, i16) {
        let [l, r] = &mut self.dc;
        let left = l.process(left as f32, self.hp_coef);
        let right = r.process(right as f32, self.hp_coef);
        (left.round() as i16, right.round() as i16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apu() -> (Bus, Apu) {
        let mut bus = Bus::new();
        let apu = Apu::new(&mut bus);
        (bus, apu)
    }

    #[test]
    fn envelope_steps_toward_limit() {
        let mut env = Envelope::default();
        env.reset(0x0A); // volume 0, increase, period 2
        for _ in 0..2 {
            env.clock();
        }
        assert_eq!(env.volume, 1);
        for _ in 0..64 {
            env.clock();
        }
        assert_eq!(env.volume, 15);
    }

    #[test]
    fn envelope_period_zero_holds_volume() {
        let mut env = Envelope::default();
        env.reset(0x90);
        env.clock();
        env.clock();
        assert_eq!(env.volume, 9);
    }

    #[test]
    fn sweep_overflow_disables_channel_on_trigger() {
        let mut ch = SquareChannel::new(true);
        ch.dac_enabled = true;
        ch.frequency = 0x7F0;
        if let Some(sweep) = ch.sweep.as_mut() {
            sweep.set_params(0x11); // period 1, add, shift 1
        }
        ch.trigger(0xF0);
        assert!(!ch.enabled);
    }

    #[test]
    fn sweep_rewrites_frequency() {
        let mut ch = SquareChannel::new(true);
        ch.dac_enabled = true;
        ch.frequency = 0x100;
        if let Some(sweep) = ch.sweep.as_mut() {
            sweep.set_params(0x11);
        }
        ch.trigger(0xF0);
        assert!(ch.enabled);
        assert_eq!(ch.clock_sweep(), Some(0x180));
        assert_eq!(ch.frequency, 0x180);
    }

    #[test]
    fn noise_width7_mirrors_feedback_into_bit6() {
        let mut ch = NoiseChannel {
            enabled: true,
            dac_enabled: true,
            width7: true,
            lfsr: 0x7FFF,
            ..Default::default()
        };
        ch.timer = 1;
        ch.step(1);
        // bit0 ^ bit1 == 0, shifted into bits 14 and 6
        assert_eq!(ch.lfsr, 0x3FBF);
    }

    #[test]
    fn wave_even_position_reads_high_nibble() {
        let mut ch = WaveChannel {
            enabled: true,
            dac_enabled: true,
            volume: 1,
            frequency: 2047,
            ..Default::default()
        };
        let ram = [0xAB; 16];
        ch.timer = 1;
        ch.step(1, &ram);
        assert_eq!(ch.position, 1);
        assert_eq!(ch.output(), 0x0B);
        ch.step(2, &ram);
        assert_eq!(ch.position, 2);
        assert_eq!(ch.output(), 0x0A);
        ch.volume = 2;
        assert_eq!(ch.output(), 0x05);
        ch.volume = 0;
        assert_eq!(ch.output(), 0);
    }

    #[test]
    fn frame_sequencer_wraps_after_eight_steps() {
        let mut seq = FrameSequencer::new();
        let steps: Vec<u8> = (0..9).map(|_| seq.advance()).collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn dc_filter_reduces_constant_input() {
        let (_, mut apu) = apu();
        let first = apu.dc_block(1000, 1000);
        let second = apu.dc_block(1000, 1000);
        assert!(second.0 < first.0);
        assert!(second.1 < first.1);
    }

    #[test]
    fn silent_when_all_dacs_off() {
        let (mut bus, mut apu) = apu();
        apu.on_write(&mut bus, io::NR12, 0x00);
        bus.set_raw(io::NR12, 0x00);
        apu.update(&mut bus, 1000);
        assert!(apu.take_samples().iter().all(|&s| s == (0, 0)));
    }
}
