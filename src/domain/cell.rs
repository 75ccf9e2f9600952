/// Cell kinds and per-cell runtime state.
/// Kind properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellKind {
    #[default]
    Empty,
    Floor,  // Must be visited to complete the room
    Switch, // Unlocks its paired door when stepped on
    Door,   // Blocks until its switch is pressed
    Wall,
    Ice,    // Never marked visited, slides the player onward
    Goal,   // Unlocks once every floor cell is visited
}

impl CellKind {
    /// Map a level-file symbol to a cell kind.
    /// Letters are handled by the loader (switch/door pairing), so they map to
    /// Switch/Door here without an identifier.
    pub fn from_symbol(ch: char) -> CellKind {
        match ch {
            '#' => CellKind::Wall,
            '@' => CellKind::Goal,
            '.' => CellKind::Floor,
            '*' => CellKind::Ice,
            c if c.is_ascii_lowercase() => CellKind::Switch,
            c if c.is_ascii_uppercase() => CellKind::Door,
            _ => CellKind::Empty,
        }
    }

    /// Can never be entered, whatever its state.
    pub fn is_solid(self) -> bool {
        matches!(self, CellKind::Wall)
    }

    /// Does this kind count towards room completion?
    pub fn is_required(self) -> bool {
        matches!(self, CellKind::Floor)
    }

    /// Is the visited flag left untouched on entry?
    pub fn is_slippery(self) -> bool {
        matches!(self, CellKind::Ice)
    }
}

/// Two-valued cell state. Its meaning depends on the kind:
/// switch unpressed/pressed, door locked/unlocked, goal locked/unlocked.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Off,
    On,
}

impl CellState {
    pub const UNPRESSED: CellState = CellState::Off;
    pub const PRESSED: CellState = CellState::On;
    pub const LOCKED: CellState = CellState::Off;
    pub const UNLOCKED: CellState = CellState::On;
}

/// One grid location: static kind plus runtime state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cell {
    pub kind: CellKind,
    pub visited: bool,
    pub state: CellState,
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Cell { kind, visited: false, state: CellState::default() }
    }

    /// Locked door: the only stateful kind that blocks movement.
    pub fn is_locked_door(&self) -> bool {
        self.kind == CellKind::Door && self.state == CellState::LOCKED
    }

    pub fn is_pressed_switch(&self) -> bool {
        self.kind == CellKind::Switch && self.state == CellState::PRESSED
    }

    pub fn is_unlocked_goal(&self) -> bool {
        self.kind == CellKind::Goal && self.state == CellState::UNLOCKED
    }

    /// Restore the runtime part to its initial values.
    pub fn reset(&mut self) {
        self.visited = false;
        self.state = CellState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_map_to_kinds() {
        assert_eq!(CellKind::from_symbol('#'), CellKind::Wall);
        assert_eq!(CellKind::from_symbol('@'), CellKind::Goal);
        assert_eq!(CellKind::from_symbol('.'), CellKind::Floor);
        assert_eq!(CellKind::from_symbol('*'), CellKind::Ice);
        assert_eq!(CellKind::from_symbol('b'), CellKind::Switch);
        assert_eq!(CellKind::from_symbol('B'), CellKind::Door);
        assert_eq!(CellKind::from_symbol(' '), CellKind::Empty);
        assert_eq!(CellKind::from_symbol('~'), CellKind::Empty);
    }

    #[test]
    fn default_state_is_locked_and_unpressed() {
        let door = Cell::new(CellKind::Door);
        assert!(door.is_locked_door());
        let switch = Cell::new(CellKind::Switch);
        assert!(!switch.is_pressed_switch());
        let goal = Cell::new(CellKind::Goal);
        assert!(!goal.is_unlocked_goal());
    }

    #[test]
    fn reset_clears_runtime_state() {
        let mut c = Cell::new(CellKind::Door);
        c.visited = true;
        c.state = CellState::UNLOCKED;
        c.reset();
        assert!(!c.visited);
        assert_eq!(c.state, CellState::LOCKED);
        assert_eq!(c.kind, CellKind::Door);
    }
}
