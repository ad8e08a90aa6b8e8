use crate::{
    bus::{Bus, Interrupt},
    io,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
    ];

    /// Bit within the group nibble.
    fn bit(self) -> u8 {
        1 << (self as u8 & 0x03)
    }

    fn is_direction(self) -> bool {
        self as u8 >= Button::Right as u8
    }
}

/// Joypad matrix. Both groups are active-low: a clear bit is a held button.
pub struct Input {
    pub buttons: u8,
    pub directions: u8,
    /// Selected nibble seen on the previous update.
    last_nibble: u8,
}

impl Input {
    pub fn new(bus: &mut Bus) -> Self {
        bus.set_write_mask(io::P1..=io::P1, 0x30);
        bus.set_read_mask(io::P1..=io::P1, 0x3F);
        bus.set_raw(io::P1, 0xCF);
        Self {
            buttons: 0x0F,
            directions: 0x0F,
            last_nibble: 0x0F,
        }
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let group = if button.is_direction() {
            &mut self.directions
        } else {
            &mut self.buttons
        };
        if pressed {
            *group &= !button.bit();
        } else {
            *group |= button.bit();
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        let group = if button.is_direction() {
            self.directions
        } else {
            self.buttons
        };
        group & button.bit() == 0
    }

    /// Refresh the P1 low nibble from the selected groups and raise the
    /// joypad interrupt when the selection goes from nothing held to
    /// something held.
    pub fn update(&mut self, bus: &mut Bus) {
        let select = bus.raw(io::P1) & 0x30;
        let mut nibble = 0x0F;
        if select & 0x10 == 0 {
            nibble &= self.directions;
        }
        if select & 0x20 == 0 {
            nibble &= self.buttons;
        }
        bus.set_raw(io::P1, 0xC0 | select | nibble);

        if self.last_nibble == 0x0F && nibble != 0x0F {
            bus.request_interrupt(Interrupt::Joypad);
        }
        self.last_nibble = nibble;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_group_bits() {
        let mut bus = Bus::new();
        let mut input = Input::new(&mut bus);
        input.set_button(Button::Start, true);
        input.set_button(Button::Down, true);
        assert_eq!(input.buttons, 0x07);
        assert_eq!(input.directions, 0x07);
        assert!(input.is_pressed(Button::Start));
        input.set_button(Button::Start, false);
        assert_eq!(input.buttons, 0x0F);
        assert!(!input.is_pressed(Button::A));
    }
}
