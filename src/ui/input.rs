/// Keyboard input tracker.
///
/// Every game action is edge-triggered: it fires on the frame a key goes
/// down and not again until the key is released. Holding an arrow does not
/// walk; each step is a separate press.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key bindings ──

const UP_KEYS: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT_KEYS: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const RESET_KEYS: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const CONFIRM_KEYS: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const CANCEL_KEYS: &[KeyCode] = &[KeyCode::Esc];
const QUIT_KEYS: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation advances.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);

            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                KeyEventKind::Release => {
                    // No enhancement: timeout expiry handles release
                }
                _ => {
                    let was_held = self.is_held(key.code);
                    self.last_active.insert(key.code, Instant::now());
                    if !was_held {
                        self.fresh_presses.push(key.code);
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// This frame's game actions from the keyboard.
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            up: self.any_pressed(UP_KEYS),
            down: self.any_pressed(DOWN_KEYS),
            left: self.any_pressed(LEFT_KEYS),
            right: self.any_pressed(RIGHT_KEYS),
            reset: self.any_pressed(RESET_KEYS),
            confirm: self.any_pressed(CONFIRM_KEYS),
            cancel: self.any_pressed(CANCEL_KEYS),
        }
    }

    /// `q` quits from the title screen.
    pub fn quit_pressed(&self) -> bool {
        self.any_pressed(QUIT_KEYS)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    #[cfg(test)]
    fn press(&mut self, code: KeyCode) {
        self.fresh_presses.push(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_map_to_directions() {
        let mut input = InputState::new();
        input.press(KeyCode::Up);
        input.press(KeyCode::Char('d'));
        let f = input.frame_input();
        assert!(f.up && f.right);
        assert!(!f.down && !f.left);
    }

    #[test]
    fn action_keys() {
        let mut input = InputState::new();
        input.press(KeyCode::Char('R'));
        input.press(KeyCode::Enter);
        input.press(KeyCode::Esc);
        let f = input.frame_input();
        assert!(f.reset && f.confirm && f.cancel);
        assert!(!input.quit_pressed());
    }

    #[test]
    fn nothing_pressed_is_idle() {
        let input = InputState::new();
        assert_eq!(input.frame_input(), FrameInput::default());
        assert!(!input.ctrl_c_pressed());
    }
}
