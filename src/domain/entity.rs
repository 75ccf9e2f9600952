/// Entities: Player, the ice Slide sub-state, and per-frame input.

/// Cardinal movement direction (one step per attempt).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    /// Unit vector `(dx, dy)`; y grows downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }

    /// Neighbor of (x, y) in this direction. `None` if it would go below 0.
    /// The upper bound is the grid's business.
    pub fn apply(self, x: usize, y: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.delta();
        Some((x.checked_add_signed(dx)?, y.checked_add_signed(dy)?))
    }
}

/// One frame of input, sampled once per frame.
/// Every flag is edge-triggered: true only on the frame the key went down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub reset: bool,
    pub confirm: bool,
    pub cancel: bool,
}

impl FrameInput {
    /// Resolve the raw sample to at most one direction.
    /// Vertical beats horizontal; up beats down; left beats right.
    pub fn direction(&self) -> Option<MoveDir> {
        if self.up {
            Some(MoveDir::Up)
        } else if self.down {
            Some(MoveDir::Down)
        } else if self.left {
            Some(MoveDir::Left)
        } else if self.right {
            Some(MoveDir::Right)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn moving(dir: MoveDir) -> Self {
        let mut input = FrameInput::default();
        match dir {
            MoveDir::Up => input.up = true,
            MoveDir::Down => input.down = true,
            MoveDir::Left => input.left = true,
            MoveDir::Right => input.right = true,
        }
        input
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    /// Visual scale, 0.0 (hidden) ..= 1.0 (full). Cosmetic only.
    pub scale: f32,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player { x, y, scale: 0.0 }
    }
}

/// Active ice slide: input is ignored until it ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slide {
    pub dir: MoveDir,
    /// Seconds until the next automatic step.
    pub remaining: f32,
}

impl Slide {
    pub fn new(dir: MoveDir, interval: f32) -> Self {
        Slide { dir, remaining: interval }
    }

    /// Advance by `dt`. Returns true when the next step is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_beats_horizontal() {
        let input = FrameInput { up: true, right: true, ..Default::default() };
        assert_eq!(input.direction(), Some(MoveDir::Up));
        let input = FrameInput { down: true, left: true, ..Default::default() };
        assert_eq!(input.direction(), Some(MoveDir::Down));
    }

    #[test]
    fn fixed_priority_within_axis() {
        let input = FrameInput { up: true, down: true, ..Default::default() };
        assert_eq!(input.direction(), Some(MoveDir::Up));
        let input = FrameInput { left: true, right: true, ..Default::default() };
        assert_eq!(input.direction(), Some(MoveDir::Left));
    }

    #[test]
    fn no_direction_without_movement_keys() {
        let input = FrameInput { reset: true, confirm: true, ..Default::default() };
        assert_eq!(input.direction(), None);
    }

    #[test]
    fn apply_rejects_negative_coords() {
        assert_eq!(MoveDir::Left.apply(0, 3), None);
        assert_eq!(MoveDir::Up.apply(3, 0), None);
        assert_eq!(MoveDir::Right.apply(0, 3), Some((1, 3)));
        assert_eq!(MoveDir::Down.apply(2, 2), Some((2, 3)));
    }

    #[test]
    fn slide_timer_fires_after_interval() {
        let mut s = Slide::new(MoveDir::Right, 0.1);
        assert!(!s.tick(0.05));
        assert!(s.tick(0.06));
    }
}
