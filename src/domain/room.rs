/// Rooms and levels: the static geometry plus per-cell runtime state.
///
/// A `RoomData` is built once by the loader. Its geometry, start, goal and
/// switch/door mappings never change afterwards; only the `Cell` runtime
/// fields (`visited`, `state`) are mutated during play and restored on reset.

use std::collections::{BTreeMap, HashMap};

use super::cell::{Cell, CellKind};
use super::grid::Grid;

/// A switch and the door it unlocks, paired by a shared letter.
/// Either side may be missing in a sloppy level; lookups then fail to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SwitchDoorMapping {
    pub id: char,
    pub switch: Option<(usize, usize)>,
    pub door: Option<(usize, usize)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomData {
    pub cells: Grid<Cell>,
    pub start: (usize, usize),
    pub goal: (usize, usize),
    /// Keyed by the lowercase letter from the level file.
    mappings: BTreeMap<char, SwitchDoorMapping>,
    /// Reverse indexes, built alongside `mappings`.
    switch_ids: HashMap<(usize, usize), char>,
    door_ids: HashMap<(usize, usize), char>,
}

impl RoomData {
    /// An empty room of the given size (all cells `Empty`).
    pub fn new(width: usize, height: usize) -> Self {
        RoomData {
            cells: Grid::new(width, height),
            start: (0, 0),
            goal: (0, 0),
            mappings: BTreeMap::new(),
            switch_ids: HashMap::new(),
            door_ids: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(x, y)
    }

    #[inline]
    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.cells.get_mut(x, y)
    }

    /// Kind at (x, y); out of bounds reads as `Wall`.
    pub fn kind_at(&self, x: usize, y: usize) -> CellKind {
        self.cell(x, y).map_or(CellKind::Wall, |c| c.kind)
    }

    // ── Switch / door pairing ──

    /// Record a switch cell for `id` (case-insensitive).
    /// Returns the earlier switch with the same letter, which loses its id.
    pub fn register_switch(&mut self, id: char, x: usize, y: usize) -> Option<(usize, usize)> {
        let id = id.to_ascii_lowercase();
        let entry = self.mappings.entry(id).or_insert_with(|| SwitchDoorMapping {
            id,
            ..Default::default()
        });
        let old = entry.switch.replace((x, y));
        if let Some(pos) = old {
            self.switch_ids.remove(&pos);
        }
        self.switch_ids.insert((x, y), id);
        self.cells.set(x, y, Cell::new(CellKind::Switch));
        old
    }

    /// Record a door cell for `id` (case-insensitive).
    /// Returns the earlier door with the same letter, which loses its id.
    pub fn register_door(&mut self, id: char, x: usize, y: usize) -> Option<(usize, usize)> {
        let id = id.to_ascii_lowercase();
        let entry = self.mappings.entry(id).or_insert_with(|| SwitchDoorMapping {
            id,
            ..Default::default()
        });
        let old = entry.door.replace((x, y));
        if let Some(pos) = old {
            self.door_ids.remove(&pos);
        }
        self.door_ids.insert((x, y), id);
        self.cells.set(x, y, Cell::new(CellKind::Door));
        old
    }

    /// Switch identifier of the switch at (x, y), if any.
    pub fn switch_id_at(&self, x: usize, y: usize) -> Option<char> {
        self.switch_ids.get(&(x, y)).copied()
    }

    /// Switch identifier of the door at (x, y), if any.
    pub fn door_id_at(&self, x: usize, y: usize) -> Option<char> {
        self.door_ids.get(&(x, y)).copied()
    }

    pub fn mapping(&self, id: char) -> Option<&SwitchDoorMapping> {
        self.mappings.get(&id.to_ascii_lowercase())
    }

    pub fn mappings(&self) -> impl Iterator<Item = &SwitchDoorMapping> {
        self.mappings.values()
    }

    /// Door paired with the switch at (x, y). `None` when either side is missing.
    pub fn door_for_switch(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        self.switch_id_at(x, y)
            .and_then(|id| self.mapping(id))
            .and_then(|m| m.door)
    }

    // ── Counts (HUD) ──

    pub fn floor_total(&self) -> usize {
        self.cells.iter().filter(|(_, _, c)| c.kind.is_required()).count()
    }

    pub fn floor_visited(&self) -> usize {
        self.cells
            .iter()
            .filter(|(_, _, c)| c.kind.is_required() && c.visited)
            .count()
    }
}

/// An ordered sequence of rooms, solved one after another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelData {
    pub name: String,
    pub rooms: Vec<RoomData>,
}

impl LevelData {
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_and_door_pair_by_letter() {
        let mut room = RoomData::new(5, 5);
        room.register_switch('a', 2, 2);
        room.register_door('A', 4, 4);
        assert_eq!(room.switch_id_at(2, 2), Some('a'));
        assert_eq!(room.door_id_at(4, 4), Some('a'));
        assert_eq!(room.door_for_switch(2, 2), Some((4, 4)));
        assert_eq!(room.kind_at(2, 2), CellKind::Switch);
        assert_eq!(room.kind_at(4, 4), CellKind::Door);
    }

    #[test]
    fn unpaired_switch_resolves_to_no_door() {
        let mut room = RoomData::new(3, 1);
        room.register_switch('q', 0, 0);
        assert_eq!(room.switch_id_at(0, 0), Some('q'));
        assert_eq!(room.door_for_switch(0, 0), None);
        assert_eq!(room.door_for_switch(1, 0), None);
    }

    #[test]
    fn lone_door_has_mapping_without_switch() {
        let mut room = RoomData::new(3, 1);
        room.register_door('Z', 2, 0);
        let m = room.mapping('z').unwrap();
        assert_eq!(m.switch, None);
        assert_eq!(m.door, Some((2, 0)));
    }

    #[test]
    fn duplicate_switch_letter_keeps_last() {
        let mut room = RoomData::new(4, 1);
        assert_eq!(room.register_switch('b', 0, 0), None);
        assert_eq!(room.register_switch('b', 3, 0), Some((0, 0)));
        assert_eq!(room.switch_id_at(0, 0), None);
        assert_eq!(room.switch_id_at(3, 0), Some('b'));
        assert_eq!(room.mappings().count(), 1);
    }

    #[test]
    fn kind_at_out_of_bounds_is_wall() {
        let room = RoomData::new(2, 2);
        assert_eq!(room.kind_at(5, 0), CellKind::Wall);
        assert_eq!(room.kind_at(0, 0), CellKind::Empty);
    }

    #[test]
    fn floor_counts() {
        let mut room = RoomData::new(3, 1);
        room.cells.set(0, 0, Cell::new(CellKind::Floor));
        room.cells.set(1, 0, Cell::new(CellKind::Floor));
        room.cells.set(2, 0, Cell::new(CellKind::Ice));
        if let Some(c) = room.cell_mut(0, 0) { c.visited = true; }
        assert_eq!(room.floor_total(), 2);
        assert_eq!(room.floor_visited(), 1);
    }
}
