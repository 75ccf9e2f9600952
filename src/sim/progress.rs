/// Progression controller: sequences phases around the traversal engine.
///
/// ```text
///   Title ──confirm──▶ StartLevel ──hold+fade──▶ StartRoom ──scale 0→1──▶ Play
///                          ▲                          ▲                   │ RoomSolved
///                          │ levels remain            │ rooms remain      ▼
///   GameEnd ◀──last── EndLevel ◀────────last room──── EndRoom ◀──scale 1→0─┘
///      │
///      └──confirm / cancel──▶ Title
/// ```
///
/// Each phase counts `phase_elapsed` up by the frame delta. When its duration
/// is reached the transition fires and the counter restarts at 0; any
/// overshoot is dropped.

use log::{debug, info};

use crate::domain::entity::FrameInput;
use super::event::GameEvent;
use super::step;
use super::world::{ratio, Phase, WorldState};

/// How long the "finished" banner stays in the HUD message line.
const MESSAGE_SECS: f32 = 3.0;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Advance the whole game by one frame of `dt` seconds.
pub fn advance(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    world.tick_message(dt);

    match world.phase {
        Phase::Title => {
            if input.confirm {
                start_game(world, &mut events);
            }
        }
        Phase::StartLevel => tick_start_level(world, dt),
        Phase::StartRoom => tick_start_room(world, dt),
        Phase::Play => {
            let step_events = step::step(world, input, dt);
            if step_events.contains(&GameEvent::RoomSolved) {
                enter(world, Phase::EndRoom);
            }
            events.extend(step_events);
        }
        Phase::EndRoom => tick_end_room(world, dt),
        Phase::EndLevel => tick_end_level(world, dt, &mut events),
        Phase::GameEnd => {
            if input.confirm || input.cancel {
                return_to_title(world);
            }
        }
    }
    events
}

/// Begin at level 0. Stays on the title when there is nothing to play.
pub fn start_game(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.levels.is_empty() {
        world.set_message("No levels loaded", MESSAGE_SECS);
        return;
    }
    world.level_index = 0;
    begin_level(world, events);
}

pub fn return_to_title(world: &mut WorldState) {
    world.slide = None;
    world.player.scale = 0.0;
    enter(world, Phase::Title);
}

// ══════════════════════════════════════════════════════════════
// Phase ticks
// ══════════════════════════════════════════════════════════════

fn tick_start_level(world: &mut WorldState, dt: f32) {
    world.phase_elapsed += dt;
    let t = &world.timing;
    if world.phase_elapsed >= t.level_title_hold() + t.fade() {
        enter(world, Phase::StartRoom);
    }
}

fn tick_start_room(world: &mut WorldState, dt: f32) {
    world.phase_elapsed += dt;
    let duration = world.timing.scale();
    world.player.scale = ratio(world.phase_elapsed, duration);
    if world.phase_elapsed >= duration {
        world.player.scale = 1.0;
        enter(world, Phase::Play);
    }
}

fn tick_end_room(world: &mut WorldState, dt: f32) {
    world.phase_elapsed += dt;
    let duration = world.timing.scale();
    world.player.scale = 1.0 - ratio(world.phase_elapsed, duration);
    if world.phase_elapsed < duration {
        return;
    }

    world.player.scale = 0.0;
    if world.is_last_room() {
        enter(world, Phase::EndLevel);
    } else {
        world.room_index += 1;
        step::reset_room(world);
        enter(world, Phase::StartRoom);
    }
}

fn tick_end_level(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    world.phase_elapsed += dt;
    if world.phase_elapsed < world.timing.fade() {
        return;
    }

    if world.is_last_level() {
        info!("Finished all levels!");
        world.set_message("Finished all levels!", MESSAGE_SECS);
        events.push(GameEvent::GameComplete);
        enter(world, Phase::GameEnd);
    } else {
        world.level_index += 1;
        begin_level(world, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

fn begin_level(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    step::reset_level(world);
    world.player.scale = 0.0;
    if let Some(level) = world.current_level() {
        info!("level {}: {}", world.level_index + 1, level.name);
    }
    events.push(GameEvent::LevelStarted { index: world.level_index });
    enter(world, Phase::StartLevel);
}

fn enter(world: &mut WorldState, phase: Phase) {
    debug!("phase {:?} -> {phase:?}", world.phase);
    world.phase = phase;
    world.phase_elapsed = 0.0;
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::domain::entity::MoveDir;
    use crate::sim::level::{embedded_levels, parse_level};

    /// Longer than any phase duration.
    const LONG: f32 = 60.0;

    fn confirm() -> FrameInput {
        FrameInput { confirm: true, ..Default::default() }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn go(w: &mut WorldState, dir: MoveDir) -> Vec<GameEvent> {
        advance(w, FrameInput::moving(dir), 0.0)
    }

    /// Two levels: the first has two corridor rooms, the second one.
    fn small_world() -> WorldState {
        let a = parse_level("a", "2\n3 1\n..@\n0 0\n3 1\n@..\n2 0\n").unwrap();
        let b = parse_level("b", "1\n3 1\n..@\n0 0\n").unwrap();
        WorldState::new(vec![a, b], TimingConfig::default())
    }

    /// From the title, run until the first `Play` frame.
    fn into_play(w: &mut WorldState) {
        advance(w, confirm(), 0.0);
        while w.phase != Phase::Play {
            advance(w, idle(), LONG);
        }
    }

    #[test]
    fn confirm_on_title_starts_first_level() {
        let mut w = small_world();
        let events = advance(&mut w, confirm(), 0.0);
        assert_eq!(events, vec![GameEvent::LevelStarted { index: 0 }]);
        assert_eq!(w.phase, Phase::StartLevel);
        assert_eq!(w.phase_elapsed, 0.0);
        assert_eq!((w.player.x, w.player.y), (0, 0));
        assert_eq!(w.player.scale, 0.0);
    }

    #[test]
    fn title_without_levels_stays_put() {
        let mut w = WorldState::new(vec![], TimingConfig::default());
        advance(&mut w, confirm(), 0.0);
        assert_eq!(w.phase, Phase::Title);
        assert!(!w.message.is_empty());
    }

    #[test]
    fn start_level_holds_then_fades() {
        let mut w = small_world();
        advance(&mut w, confirm(), 0.0);
        let (hold, fade) = (w.timing.level_title_hold(), w.timing.fade());
        advance(&mut w, idle(), hold);
        assert_eq!(w.phase, Phase::StartLevel);
        assert_eq!(w.fade_alpha(), 1.0);
        advance(&mut w, idle(), fade / 2.0);
        assert_eq!(w.phase, Phase::StartLevel);
        assert!(w.fade_alpha() < 1.0 && w.fade_alpha() > 0.0);
        advance(&mut w, idle(), fade);
        assert_eq!(w.phase, Phase::StartRoom);
    }

    #[test]
    fn start_room_grows_player_and_ignores_movement() {
        let mut w = small_world();
        advance(&mut w, confirm(), 0.0);
        advance(&mut w, idle(), LONG);
        assert_eq!(w.phase, Phase::StartRoom);

        let half = w.timing.scale() / 2.0;
        advance(&mut w, FrameInput::moving(MoveDir::Right), half);
        assert!((w.player.scale - 0.5).abs() < 1e-4);
        assert_eq!((w.player.x, w.player.y), (0, 0));

        advance(&mut w, idle(), half);
        assert_eq!(w.phase, Phase::Play);
        assert_eq!(w.player.scale, 1.0);
    }

    #[test]
    fn overshoot_is_not_carried() {
        let mut w = small_world();
        advance(&mut w, confirm(), 0.0);
        advance(&mut w, idle(), LONG);
        assert_eq!(w.phase, Phase::StartRoom);
        assert_eq!(w.phase_elapsed, 0.0);
        assert_eq!(w.player.scale, 0.0);
    }

    #[test]
    fn solving_a_room_moves_to_next_room() {
        let mut w = small_world();
        into_play(&mut w);
        go(&mut w, MoveDir::Right);
        let events = go(&mut w, MoveDir::Right);
        assert!(events.contains(&GameEvent::RoomSolved));
        assert_eq!(w.phase, Phase::EndRoom);

        let half = w.timing.scale() / 2.0;
        advance(&mut w, idle(), half);
        assert!(w.player.scale > 0.0 && w.player.scale < 1.0);
        advance(&mut w, idle(), LONG);
        assert_eq!(w.phase, Phase::StartRoom);
        assert_eq!((w.level_index, w.room_index), (0, 1));
        assert_eq!((w.player.x, w.player.y), (2, 0));
        assert!(w.current_room().unwrap().cell(2, 0).unwrap().visited);
    }

    #[test]
    fn last_room_of_level_moves_to_next_level() {
        let mut w = small_world();
        into_play(&mut w);
        go(&mut w, MoveDir::Right);
        go(&mut w, MoveDir::Right);
        advance(&mut w, idle(), LONG);
        while w.phase != Phase::Play {
            advance(&mut w, idle(), LONG);
        }
        go(&mut w, MoveDir::Left);
        go(&mut w, MoveDir::Left);
        assert_eq!(w.phase, Phase::EndRoom);
        advance(&mut w, idle(), LONG);
        assert_eq!(w.phase, Phase::EndLevel);

        let half = w.timing.fade() / 2.0;
        advance(&mut w, idle(), half);
        assert!(w.fade_alpha() > 0.0 && w.fade_alpha() < 1.0);
        let events = advance(&mut w, idle(), LONG);
        assert_eq!(events, vec![GameEvent::LevelStarted { index: 1 }]);
        assert_eq!(w.phase, Phase::StartLevel);
        assert_eq!((w.level_index, w.room_index), (1, 0));
    }

    #[test]
    fn final_goal_ends_the_game() {
        let mut w = small_world();
        w.level_index = 1;
        step::reset_level(&mut w);
        w.phase = Phase::Play;
        w.player.scale = 1.0;

        go(&mut w, MoveDir::Right);
        let events = go(&mut w, MoveDir::Right);
        assert!(events.contains(&GameEvent::RoomSolved));
        assert_eq!(w.phase, Phase::EndRoom);

        advance(&mut w, idle(), LONG);
        assert_eq!(w.phase, Phase::EndLevel);
        let events = advance(&mut w, idle(), LONG);
        assert_eq!(events, vec![GameEvent::GameComplete]);
        assert_eq!(w.phase, Phase::GameEnd);
        assert_ne!(w.phase, Phase::StartRoom);

        // Terminal until a UI signal.
        advance(&mut w, idle(), LONG);
        assert_eq!(w.phase, Phase::GameEnd);
        advance(&mut w, FrameInput { cancel: true, ..Default::default() }, 0.0);
        assert_eq!(w.phase, Phase::Title);
    }

    #[test]
    fn reset_during_play_keeps_phase() {
        let mut w = small_world();
        into_play(&mut w);
        go(&mut w, MoveDir::Right);
        let events = advance(&mut w, FrameInput { reset: true, ..Default::default() }, 0.0);
        assert_eq!(events, vec![GameEvent::RoomReset]);
        assert_eq!(w.phase, Phase::Play);
        assert_eq!((w.player.x, w.player.y), (0, 0));
    }

    #[test]
    fn replay_after_game_end_starts_fresh() {
        let mut w = small_world();
        into_play(&mut w);
        go(&mut w, MoveDir::Right);
        return_to_title(&mut w);
        into_play(&mut w);
        assert_eq!((w.level_index, w.room_index), (0, 0));
        assert!(!w.current_room().unwrap().cell(1, 0).unwrap().visited);
    }

    #[test]
    fn embedded_levels_are_solvable() {
        use MoveDir::*;
        let solutions: [&[&[MoveDir]]; 3] = [
            &[
                &[Right, Right, Right, Right],
                &[Right, Right, Right, Down, Down, Left, Left, Left, Up],
            ],
            &[&[Right, Down, Left, Down, Right, Right, Up, Right, Up, Right, Down, Down]],
            &[&[Right, Down, Left, Left, Left, Left, Left, Down]],
        ];

        let mut w = WorldState::new(embedded_levels(), TimingConfig::default());
        into_play(&mut w);
        let slide_dt = w.timing.slide_interval();

        for rooms in solutions {
            for moves in rooms {
                assert_eq!(w.phase, Phase::Play);
                for &dir in moves.iter() {
                    go(&mut w, dir);
                    while w.is_sliding() {
                        advance(&mut w, idle(), slide_dt);
                    }
                }
                assert_eq!(w.phase, Phase::EndRoom, "level {} room {}", w.level_index, w.room_index);
                while w.phase != Phase::Play && w.phase != Phase::GameEnd {
                    advance(&mut w, idle(), LONG);
                }
            }
        }
        assert_eq!(w.phase, Phase::GameEnd);
    }
}
