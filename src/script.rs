use pockemu_core::input::Button;
use std::str::FromStr;

/// Frames a scripted press is held when no length is given.
const DEFAULT_HOLD_FRAMES: usize = 5;

/// A `BUTTON@FRAME[:LEN]` input event from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedPress {
    pub button: Button,
    pub frame: usize,
    pub len: usize,
}

impl ScriptedPress {
    pub fn held_at(&self, frame: usize) -> bool {
        frame >= self.frame && frame < self.frame.saturating_add(self.len)
    }
}

fn parse_button(name: &str) -> Option<Button> {
    let button = match name.to_ascii_lowercase().as_str() {
        "a" => Button::A,
        "b" => Button::B,
        "select" => Button::Select,
        "start" => Button::Start,
        "right" => Button::Right,
        "left" => Button::Left,
        "up" => Button::Up,
        "down" => Button::Down,
        _ => return None,
    };
    Some(button)
}

impl FromStr for ScriptedPress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, timing) = s
            .split_once('@')
            .ok_or_else(|| format!("expected BUTTON@FRAME[:LEN], got '{s}'"))?;
        let button = parse_button(name).ok_or_else(|| format!("unknown button '{name}'"))?;
        let (frame, len) = match timing.split_once(':') {
            Some((frame, len)) => (frame, Some(len)),
            None => (timing, None),
        };
        let frame = frame
            .parse()
            .map_err(|e| format!("bad frame '{frame}': {e}"))?;
        let len = match len {
            Some(len) => len.parse().map_err(|e| format!("bad length '{len}': {e}"))?,
            None => DEFAULT_HOLD_FRAMES,
        };
        Ok(Self { button, frame, len })
    }
}

/// Apply every scripted press to the button state for `frame`.
pub fn buttons_at(script: &[ScriptedPress], frame: usize) -> impl Iterator<Item = (Button, bool)> {
    Button::ALL.into_iter().map(move |button| {
        let held = script
            .iter()
            .any(|p| p.button == button && p.held_at(frame));
        (button, held)
    })
}
