/// Movement and completion rules, truth-table driven.
///
/// Pure functions over a room; no side effects.
/// These encode "what is legal" without performing the action.
///
/// ## Traversibility Truth Table
///
/// A move is denied if ANY row in the "deny" column matches.
/// ┌──────────────────────────┬─────────┬──────────────────────┐
/// │ Condition                │ Allow?  │ Notes                │
/// ├──────────────────────────┼─────────┼──────────────────────┤
/// │ Dest out of bounds       │ DENY    │ room edge            │
/// │ Dest is Wall             │ DENY    │                      │
/// │ Dest already visited     │ DENY    │ each tile once       │
/// │ Dest is Door, locked     │ DENY    │ press its switch     │
/// │ Otherwise                │ ALLOW   │ Ice never visited    │
/// └──────────────────────────┴─────────┴──────────────────────┘
///
/// ## Room Completion
///
/// Complete iff every `Floor` cell is visited. Switch, Door, Ice, Goal and
/// Empty cells never count.

use super::cell::Cell;
use super::entity::MoveDir;
use super::room::RoomData;

/// Can the player step onto this cell? `None` (out of bounds) is never traversible.
pub fn is_traversible(cell: Option<&Cell>) -> bool {
    match cell {
        None => false,
        Some(c) => !c.kind.is_solid() && !c.visited && !c.is_locked_door(),
    }
}

/// Destination of a one-step move from (x, y), if that move is legal.
pub fn move_target(room: &RoomData, x: usize, y: usize, dir: MoveDir) -> Option<(usize, usize)> {
    let (nx, ny) = dir.apply(x, y)?;
    if is_traversible(room.cell(nx, ny)) {
        Some((nx, ny))
    } else {
        None
    }
}

/// Every Floor cell visited?
pub fn is_room_complete(room: &RoomData) -> bool {
    room.cells
        .iter()
        .all(|(_, _, c)| !c.kind.is_required() || c.visited)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
