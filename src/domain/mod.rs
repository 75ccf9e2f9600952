/// Puzzle data model and pure rules. No I/O, no timing.

pub mod cell;
pub mod entity;
pub mod grid;
pub mod room;
pub mod rules;
