/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// One owned struct, passed by `&mut` to the engine (`step`) and the
/// progression controller (`progress`). The renderer and sound only read it.
///
/// ## Room layers
///
///   - `levels`: loaded geometry. Only each cell's `visited` / `state` fields
///     change at runtime; kind, start, goal and mappings never do.
///   - `reset_room()` (in `step`) restores every runtime field of the active
///     room in one call.

use crate::config::TimingConfig;
use crate::domain::entity::{Player, Slide};
use crate::domain::room::{LevelData, RoomData};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    StartLevel,
    StartRoom,
    Play,
    EndRoom,
    EndLevel,
    GameEnd,
}

pub struct WorldState {
    // ── Levels ──
    pub levels: Vec<LevelData>,
    pub level_index: usize,
    pub room_index: usize,

    // ── Entities ──
    pub player: Player,
    /// Active ice slide; input is ignored while set.
    pub slide: Option<Slide>,

    // ── Progression ──
    pub phase: Phase,
    /// Seconds spent in the current phase.
    pub phase_elapsed: f32,
    pub timing: TimingConfig,

    // ── UI ──
    pub message: String,
    /// Seconds left before `message` clears.
    pub message_timer: f32,
}

// ── Construction ──

impl WorldState {
    pub fn new(levels: Vec<LevelData>, timing: TimingConfig) -> Self {
        WorldState {
            levels,
            level_index: 0,
            room_index: 0,
            player: Player::new(0, 0),
            slide: None,
            phase: Phase::Title,
            phase_elapsed: 0.0,
            timing,
            message: String::new(),
            message_timer: 0.0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: f32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the status message.
    pub fn tick_message(&mut self, dt: f32) {
        if self.message_timer > 0.0 {
            self.message_timer -= dt;
            if self.message_timer <= 0.0 {
                self.message_timer = 0.0;
                self.message.clear();
            }
        }
    }
}

// ── Read-only queries ──

impl WorldState {
    pub fn current_level(&self) -> Option<&LevelData> {
        self.levels.get(self.level_index)
    }

    pub fn current_room(&self) -> Option<&RoomData> {
        self.current_level()?.rooms.get(self.room_index)
    }

    pub fn current_room_mut(&mut self) -> Option<&mut RoomData> {
        self.levels.get_mut(self.level_index)?.rooms.get_mut(self.room_index)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn room_count(&self) -> usize {
        self.current_level().map_or(0, |l| l.room_count())
    }

    pub fn is_last_room(&self) -> bool {
        self.room_index + 1 >= self.room_count()
    }

    pub fn is_last_level(&self) -> bool {
        self.level_index + 1 >= self.level_count()
    }

    pub fn is_sliding(&self) -> bool {
        self.slide.is_some()
    }

    /// Screen cover: 1.0 = fully dark, 0.0 = clear.
    ///
    /// `StartLevel` stays dark while the title holds, then fades in.
    /// `EndLevel` fades out. Every other phase is clear.
    pub fn fade_alpha(&self) -> f32 {
        let t = &self.timing;
        match self.phase {
            Phase::StartLevel => {
                let hold = t.level_title_hold();
                if self.phase_elapsed < hold {
                    1.0
                } else {
                    1.0 - ratio(self.phase_elapsed - hold, t.fade())
                }
            }
            Phase::EndLevel => ratio(self.phase_elapsed, t.fade()),
            _ => 0.0,
        }
    }

    /// Is the level title card showing (before the fade-in starts)?
    pub fn showing_level_title(&self) -> bool {
        self.phase == Phase::StartLevel && self.phase_elapsed < self.timing.level_title_hold()
    }
}

/// `elapsed / duration` clamped to 0..=1. A zero duration is already done.
pub fn ratio(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::embedded_levels;

    fn world() -> WorldState {
        WorldState::new(embedded_levels(), TimingConfig::default())
    }

    #[test]
    fn starts_on_title_at_first_room() {
        let w = world();
        assert_eq!(w.phase, Phase::Title);
        assert_eq!((w.level_index, w.room_index), (0, 0));
        assert!(w.current_room().is_some());
        assert_eq!(w.room_count(), 2);
        assert!(!w.is_last_room());
    }

    #[test]
    fn no_levels_means_no_room() {
        let w = WorldState::new(vec![], TimingConfig::default());
        assert!(w.current_room().is_none());
        assert_eq!(w.room_count(), 0);
        assert!(w.is_last_level());
    }

    #[test]
    fn start_level_fade_holds_then_clears() {
        let mut w = world();
        w.phase = Phase::StartLevel;
        w.phase_elapsed = 0.5;
        assert_eq!(w.fade_alpha(), 1.0);
        assert!(w.showing_level_title());

        w.phase_elapsed = w.timing.level_title_hold() + w.timing.fade() / 2.0;
        assert!((w.fade_alpha() - 0.5).abs() < 1e-4);
        assert!(!w.showing_level_title());

        w.phase_elapsed = w.timing.level_title_hold() + w.timing.fade() * 2.0;
        assert_eq!(w.fade_alpha(), 0.0);
    }

    #[test]
    fn end_level_fades_out() {
        let mut w = world();
        w.phase = Phase::EndLevel;
        w.phase_elapsed = 0.0;
        assert_eq!(w.fade_alpha(), 0.0);
        w.phase_elapsed = w.timing.fade();
        assert_eq!(w.fade_alpha(), 1.0);
    }

    #[test]
    fn play_is_clear() {
        let mut w = world();
        w.phase = Phase::Play;
        assert_eq!(w.fade_alpha(), 0.0);
    }

    #[test]
    fn zero_duration_ratio_is_complete() {
        assert_eq!(ratio(0.0, 0.0), 1.0);
        assert_eq!(ratio(-1.0, 2.0), 0.0);
    }

    #[test]
    fn message_expires() {
        let mut w = world();
        w.set_message("hi", 0.1);
        w.tick_message(0.05);
        assert_eq!(w.message, "hi");
        w.tick_message(0.06);
        assert!(w.message.is_empty());
    }
}
