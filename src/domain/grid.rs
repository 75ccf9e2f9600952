/// Dense 2D storage with bounds-checked access.
///
/// Row-major buffer: `(x, y)` lives at `y * width + x`.
/// Every accessor checks bounds first; out-of-range coordinates resolve
/// to `None` (reads) or are ignored (writes). Nothing here panics.

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Grid { width: 0, height: 0, cells: vec![] };
        grid.resize(width, height);
        grid
    }

    /// Reallocate as `width × height` default cells. Prior contents are discarded.
    /// A size whose cell count overflows `usize` leaves an empty 0×0 grid.
    pub fn resize(&mut self, width: usize, height: usize) {
        let Some(len) = width.checked_mul(height) else {
            self.width = 0;
            self.height = 0;
            self.cells = Vec::new();
            return;
        };
        self.width = width;
        self.height = height;
        self.cells = vec![T::default(); len];
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_valid_location(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if self.is_valid_location(x, y) {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if self.is_valid_location(x, y) {
            self.cells.get_mut(y * self.width + x)
        } else {
            None
        }
    }

    /// Write `value` at (x, y). Silently ignored out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = value;
        }
    }

    /// Iterate `(x, y, &cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let w = self.width.max(1);
        self.cells.iter().enumerate().map(move |(i, c)| (i % w, i / w, c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_allocates_defaults() {
        let mut g: Grid<u8> = Grid::default();
        assert_eq!(g.width(), 0);
        g.resize(3, 2);
        assert_eq!((g.width(), g.height()), (3, 2));
        assert!(g.iter().all(|(_, _, v)| *v == 0));
        assert_eq!(g.iter().count(), 6);
    }

    #[test]
    fn overflowing_resize_leaves_empty_grid() {
        let mut g: Grid<u8> = Grid::new(2, 2);
        g.resize(usize::MAX, 2);
        assert_eq!((g.width(), g.height()), (0, 0));
        assert_eq!(g.get(0, 0), None);
    }

    #[test]
    fn resize_discards_contents() {
        let mut g: Grid<u8> = Grid::new(2, 2);
        g.set(1, 1, 9);
        g.resize(2, 2);
        assert_eq!(g.get(1, 1), Some(&0));
    }

    #[test]
    fn valid_location_bounds() {
        let g: Grid<u8> = Grid::new(4, 3);
        assert!(g.is_valid_location(0, 0));
        assert!(g.is_valid_location(3, 2));
        assert!(!g.is_valid_location(4, 0));
        assert!(!g.is_valid_location(0, 3));
        assert!(!g.is_valid_location(usize::MAX, 0));
    }

    #[test]
    fn out_of_bounds_is_none_and_set_is_noop() {
        let mut g: Grid<u8> = Grid::new(2, 2);
        assert_eq!(g.get(2, 0), None);
        assert!(g.get_mut(0, 5).is_none());
        g.set(7, 7, 1);
        assert!(g.iter().all(|(_, _, v)| *v == 0));
    }

    #[test]
    fn set_and_get_row_major() {
        let mut g: Grid<u8> = Grid::new(3, 2);
        g.set(2, 1, 5);
        assert_eq!(g.get(2, 1), Some(&5));
        let (x, y, _) = g.iter().find(|(_, _, v)| **v == 5).unwrap();
        assert_eq!((x, y), (2, 1));
    }

    #[test]
    fn empty_grid_is_safe() {
        let g: Grid<u8> = Grid::new(0, 0);
        assert_eq!(g.get(0, 0), None);
        assert_eq!(g.iter().count(), 0);
    }
}
