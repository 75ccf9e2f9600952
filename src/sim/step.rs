/// The traversal engine: advances the `Play` phase by one frame.
///
/// Processing order:
///   1. Reset request (cancels any slide)
///   2. Active slide: tick the timer, step once when it fires
///   3. Otherwise: one move attempt in the resolved input direction
///
/// A move attempt (`try_move`):
///   - rejected with no state change unless `rules::move_target` allows it
///   - enters the cell, marking it visited unless it is Ice
///   - applies the kind effect (switch press, goal solve, slide start/stop)
///   - re-checks room completion and unlocks the goal
///
/// Progression (what happens after `RoomSolved`) lives in `progress`.

use log::debug;

use crate::domain::cell::{CellKind, CellState};
use crate::domain::entity::{FrameInput, MoveDir, Slide};
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if world.phase != Phase::Play { return vec![]; }

    let mut events = Vec::new();

    if input.reset {
        reset_room(world);
        events.push(GameEvent::RoomReset);
        return events;
    }

    if world.slide.is_some() {
        resolve_slide(world, dt, &mut events);
        return events;
    }

    if let Some(dir) = input.direction() {
        try_move(world, dir, &mut events);
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Slide
// ══════════════════════════════════════════════════════════════

fn resolve_slide(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let interval = world.timing.slide_interval();
    let Some(slide) = world.slide.as_mut() else { return };
    if !slide.tick(dt) { return; }

    // Leftover time is dropped; one slide step per frame at most.
    slide.remaining = interval;
    let dir = slide.dir;

    if !try_move(world, dir, events) {
        world.slide = None;
        events.push(GameEvent::SlideStopped);
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

/// Attempt one step. Returns false (and changes nothing) when blocked.
pub fn try_move(world: &mut WorldState, dir: MoveDir, events: &mut Vec<GameEvent>) -> bool {
    let (px, py) = (world.player.x, world.player.y);
    let Some(room) = world.current_room_mut() else { return false };
    let Some((nx, ny)) = rules::move_target(room, px, py, dir) else { return false };

    let kind = room.kind_at(nx, ny);
    let mut solved = false;

    if let Some(cell) = room.cell_mut(nx, ny) {
        if !kind.is_slippery() {
            cell.visited = true;
        }
    }
    events.push(GameEvent::PlayerMoved { x: nx, y: ny });

    match kind {
        CellKind::Switch => {
            let unpressed = room.cell(nx, ny).map_or(false, |c| c.state == CellState::UNPRESSED);
            if let (true, Some(id)) = (unpressed, room.switch_id_at(nx, ny)) {
                if let Some(c) = room.cell_mut(nx, ny) {
                    c.state = CellState::PRESSED;
                }
                events.push(GameEvent::SwitchPressed { id, x: nx, y: ny });

                if let Some((dx, dy)) = room.door_for_switch(nx, ny) {
                    if let Some(door) = room.cell_mut(dx, dy) {
                        door.state = CellState::UNLOCKED;
                        events.push(GameEvent::DoorUnlocked { id, x: dx, y: dy });
                    }
                }
            }
        }
        CellKind::Goal => {
            solved = room.cell(nx, ny).map_or(false, |c| c.is_unlocked_goal());
        }
        _ => {}
    }

    if rules::is_room_complete(room) {
        let (gx, gy) = room.goal;
        if let Some(goal) = room.cell_mut(gx, gy) {
            if goal.state != CellState::UNLOCKED {
                goal.state = CellState::UNLOCKED;
                events.push(GameEvent::GoalUnlocked);
            }
        }
    }

    world.player.x = nx;
    world.player.y = ny;

    if kind.is_slippery() {
        if world.slide.is_none() {
            events.push(GameEvent::SlideStarted);
        }
        world.slide = Some(Slide::new(dir, world.timing.slide_interval()));
    } else if world.slide.take().is_some() {
        events.push(GameEvent::SlideStopped);
    }

    if solved {
        debug!("room {} solved", world.room_index + 1);
        events.push(GameEvent::RoomSolved);
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Reset
// ══════════════════════════════════════════════════════════════

/// Restore the active room to its loaded state and put the player on start.
pub fn reset_room(world: &mut WorldState) {
    world.slide = None;
    let Some(room) = world.current_room_mut() else { return };

    for cell in room.cells.iter_mut() {
        cell.reset();
    }

    let (sx, sy) = room.start;
    if let Some(start) = room.cell_mut(sx, sy) {
        if start.kind == CellKind::Floor {
            start.visited = true;
        }
    }

    let (gx, gy) = room.goal;
    if let Some(goal) = room.cell_mut(gx, gy) {
        goal.state = CellState::LOCKED;
    }

    world.player.x = sx;
    world.player.y = sy;
}

/// Back to the first room of the current level.
pub fn reset_level(world: &mut WorldState) {
    world.room_index = 0;
    reset_room(world);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
