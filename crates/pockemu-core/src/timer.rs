use crate::{
    bus::{Bus, Hook, Interrupt},
    io,
};

/// Clock bit watched for each TAC frequency selector.
const TIMER_BITS: [u8; 4] = [9, 3, 5, 7];

/// Internal divider value left behind by the boot ROM.
const POST_BOOT_CLOCK: u16 = 0xABCC;

pub struct Timer {
    /// 16-bit internal divider counter. DIV register is the upper 8 bits.
    pub clock: u16,
    last_signal: bool,
    /// TIMA wrapped on the previous cycle; reload and IRQ are due.
    reload_pending: bool,
}

impl Timer {
    /// Register the timer's masks and hooks on `bus` and load post-boot
    /// register values.
    pub fn new(bus: &mut Bus) -> Self {
        bus.set_write_mask(io::DIV..=io::DIV, 0x00);
        bus.set_hook(io::DIV..=io::DIV, Hook::DivReset);
        bus.set_read_mask(io::TAC..=io::TAC, 0x07);

        let timer = Self {
            clock: POST_BOOT_CLOCK,
            last_signal: false,
            reload_pending: false,
        };
        bus.set_raw(io::DIV, timer.div());
        bus.set_raw(io::TIMA, 0x00);
        bus.set_raw(io::TMA, 0x00);
        bus.set_raw(io::TAC, 0x00);
        timer
    }

    pub fn div(&self) -> u8 {
        (self.clock >> 8) as u8
    }

    /// DIV write hook.
    pub fn reset_clock(&mut self, bus: &mut Bus) {
        self.clock = 0;
        bus.set_raw(io::DIV, 0);
    }

    /// Advance by `cycles` machine cycles.
    pub fn update(&mut self, bus: &mut Bus, cycles: u32) {
        for _ in 0..cycles {
            self.clock = self.clock.wrapping_add(4);
            bus.set_raw(io::DIV, self.div());

            if self.reload_pending {
                let tma = bus.raw(io::TMA);
                bus.set_raw(io::TIMA, tma);
                bus.request_interrupt(Interrupt::Timer);
                self.reload_pending = false;
            }

            let signal = Self::signal(self.clock, bus.raw(io::TAC));
            if self.last_signal && !signal {
                let tima = bus.raw(io::TIMA).wrapping_add(1);
                bus.set_raw(io::TIMA, tima);
                if tima == 0 {
                    self.reload_pending = true;
                }
            }
            self.last_signal = signal;
        }
    }

    fn signal(clock: u16, tac: u8) -> bool {
        if tac & 0x04 == 0 {
            return false;
        }
        let bit = TIMER_BITS[(tac & 0x03) as usize];
        (clock >> bit) & 1 != 0
    }
}
