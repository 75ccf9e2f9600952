/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from `[gamepad]` in config.toml via `apply_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Step (one cell per press)
///   Start / A             →  Confirm
///   Select                →  Cancel (back to title)
///   Y                     →  Reset room
///
/// Like the keyboard, everything here is edge-triggered.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
use log::{debug, info, warn};

use crate::config::GamepadConfig;
use crate::domain::entity::FrameInput;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-input state: held (level) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Directions in `FrameInput` order.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
#[derive(Clone, Copy)]
enum Dir {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

/// Action-to-button mapping.
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    reset: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::Start, Btn::A],
            cancel: vec![Btn::Select],
            reset: vec![Btn::Y],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,
    connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                debug!("gamepad support ready (connected: {has_pad})");
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;
        #[cfg(not(feature = "gamepad"))]
        debug!("built without gamepad support");

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Replace the default mapping with the configured button names.
    /// An action whose list has no recognizable names keeps its default.
    pub fn apply_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(action: &str, names: &[String]) -> Vec<Btn> {
            names.iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        warn!("gamepad.{action}: unknown button {s:?}");
                    }
                    btn
                })
                .collect()
        }
        let map = &mut self.action_map;
        let cf = parse_list("confirm", &cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ca = parse_list("cancel", &cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
        let rs = parse_list("reset", &cfg.reset);
        if !rs.is_empty() { map.reset = rs; }
    }

    /// Poll pending events. Call once per frame before reading actions.
    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    if !self.connected {
                        info!("gamepad connected");
                    }
                    self.connected = true;
                }
                EventType::Disconnected => {
                    info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Stick → digital directions; a new press needs a return through the deadzone
        self.stick[Dir::Up as usize].set(self.stick_y > STICK_DEADZONE);
        self.stick[Dir::Down as usize].set(self.stick_y < -STICK_DEADZONE);
        self.stick[Dir::Left as usize].set(self.stick_x < -STICK_DEADZONE);
        self.stick[Dir::Right as usize].set(self.stick_x > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d as usize].set(held);
        } else if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn as usize].set(held);
        }
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn dir_pressed(&self, i: usize) -> bool {
        self.dpad[i].just_pressed || self.stick[i].just_pressed
    }

    /// This frame's game actions from the pad.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            up: self.dir_pressed(0),
            down: self.dir_pressed(1),
            left: self.dir_pressed(2),
            right: self.dir_pressed(3),
            reset: self.any_just_pressed(&self.action_map.reset),
            confirm: self.any_just_pressed(&self.action_map.confirm),
            cancel: self.any_just_pressed(&self.action_map.cancel),
        }
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = [BtnState::default(); 4];
        self.stick = [BtnState::default(); 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name(" South "), Some(Btn::A));
        assert_eq!(Btn::from_name("back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn config_overrides_only_valid_lists() {
        let mut pad = GamepadState::new();
        pad.apply_config(&GamepadConfig {
            confirm: vec!["B".into()],
            cancel: vec!["nonsense".into()],
            reset: vec![],
        });
        assert_eq!(pad.action_map.confirm, vec![Btn::B]);
        assert_eq!(pad.action_map.cancel, vec![Btn::Select]);
        assert_eq!(pad.action_map.reset, vec![Btn::Y]);
    }

    #[test]
    fn press_is_an_edge() {
        let mut s = BtnState::default();
        s.set(true);
        assert!(s.just_pressed);
        s.just_pressed = false;
        s.set(true);
        assert!(!s.just_pressed);
        s.set(false);
        s.set(true);
        assert!(s.just_pressed);
    }

    #[test]
    fn mapped_buttons_feed_frame_input() {
        let mut pad = GamepadState::new();
        pad.buttons[Btn::Y as usize].set(true);
        pad.dpad[Dir::Left as usize].set(true);
        let f = pad.frame_input();
        assert!(f.reset && f.left);
        assert!(!f.confirm && !f.up);

        pad.clear_just_pressed();
        assert_eq!(pad.frame_input(), FrameInput::default());
    }
}
