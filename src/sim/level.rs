/// Level loader.
///
/// ## Sources (priority order):
///   1. Level files listed in config (`general.levels`), relative to `levels_dir`
///   2. Every `*.dat` in `levels_dir` (when the list is empty), by file name
///   3. Built-in embedded levels (when nothing else loads)
///
/// ## Level format (`.dat`):
///   ```text
///   <room count>
///   <width> <height>          ┐
///   <height rows of width>    │ repeated per room
///   <startX> <startY>         ┘
///   ```
///
/// Integer headers are whitespace separated and may span lines; the rest of
/// the line holding the last header token is discarded. Grid rows follow
/// immediately and are taken verbatim (a row of spaces is a row of Empty).
///
/// ## Cell legend:
///   '#' = Wall       '.' = Floor      '*' = Ice       '@' = Goal
///   'a'..'z' = Switch (letter is the id)
///   'A'..'Z' = Door opened by the switch with the same letter
///   anything else = Empty

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::config::GameConfig;
use crate::domain::cell::{Cell, CellKind};
use crate::domain::room::{LevelData, RoomData};

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

/// Largest room accepted, in cells.
pub const MAX_ROOM_CELLS: usize = 256 * 256;

/// Why a level could not be loaded. Rooms are numbered from 1 in messages.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected {what}, found end of file")]
    MissingNumber { what: &'static str, line: usize },

    #[error("line {line}: {what} must be a non-negative integer, found {token:?}")]
    InvalidNumber { what: &'static str, line: usize, token: String },

    #[error("level has no rooms")]
    NoRooms,

    #[error("room {}: width or height is 0 ({width}x{height})", .room + 1)]
    EmptyRoom { room: usize, width: usize, height: usize },

    #[error("room {}: {width}x{height} exceeds {} cells", .room + 1, MAX_ROOM_CELLS)]
    RoomTooLarge { room: usize, width: usize, height: usize },

    #[error("room {}: grid row {} missing at end of file", .room + 1, .row + 1)]
    MissingRow { room: usize, row: usize },

    #[error("room {}: player start ({x}, {y}) is outside the grid", .room + 1)]
    StartOutOfBounds { room: usize, x: usize, y: usize },

    #[error("room {}: no goal cell '@'", .room + 1)]
    MissingGoal { room: usize },
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load every configured level. Failures are logged and skipped;
/// if nothing loads, the embedded levels are used instead.
pub fn load_levels(config: &GameConfig) -> Vec<LevelData> {
    let paths = level_paths(config);
    let mut levels = Vec::with_capacity(paths.len());

    for (i, path) in paths.iter().enumerate() {
        match load_level_file(path) {
            Ok(level) => {
                info!(
                    "Successfully loaded level {i} ({}, {} rooms)",
                    path.display(),
                    level.room_count()
                );
                levels.push(level);
            }
            Err(e) => error!("Failed to load level {i}: {e}"),
        }
    }

    if levels.is_empty() {
        warn!(
            "no level loaded from {}; using built-in levels",
            config.levels_dir.display()
        );
        levels = embedded_levels();
    }
    levels
}

/// Read and parse one level file. The level is named after the file stem.
pub fn load_level_file(path: &Path) -> Result<LevelData, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_level(&name, &content)
}

/// Parse level text into a fresh `LevelData`.
pub fn parse_level(name: &str, content: &str) -> Result<LevelData, LoadError> {
    let mut cursor = LineCursor::new(content);

    let room_count = cursor.read_numbers::<1>("room count")?[0];
    if room_count == 0 {
        return Err(LoadError::NoRooms);
    }

    let mut rooms = Vec::with_capacity(room_count);
    for index in 0..room_count {
        rooms.push(parse_room(&mut cursor, index)?);
    }

    if cursor.has_content() {
        debug!("level {name:?}: ignoring trailing content after {room_count} rooms");
    }

    Ok(LevelData { name: name.to_string(), rooms })
}

// ══════════════════════════════════════════════════════════════
// Room parsing
// ══════════════════════════════════════════════════════════════

fn parse_room(cursor: &mut LineCursor, index: usize) -> Result<RoomData, LoadError> {
    let [width, height] = cursor.read_numbers::<2>("room width and height")?;
    if width == 0 || height == 0 {
        return Err(LoadError::EmptyRoom { room: index, width, height });
    }
    if width.checked_mul(height).map_or(true, |cells| cells > MAX_ROOM_CELLS) {
        return Err(LoadError::RoomTooLarge { room: index, width, height });
    }
    let available = cursor.remaining();
    if height > available {
        return Err(LoadError::MissingRow { room: index, row: available });
    }

    let mut room = RoomData::new(width, height);
    let mut goal: Option<(usize, usize)> = None;

    for y in 0..height {
        let row = cursor.next_row().ok_or(LoadError::MissingRow { room: index, row: y })?;
        let len = row.chars().count();
        if len < width {
            warn!("room {}: row {} is {len} wide, padding to {width}", index + 1, y + 1);
        } else if len > width {
            warn!("room {}: row {} is {len} wide, truncating to {width}", index + 1, y + 1);
        }

        for (x, ch) in row.chars().take(width).enumerate() {
            if ch.is_ascii_lowercase() {
                if let Some((ox, oy)) = room.register_switch(ch, x, y) {
                    warn!(
                        "room {}: switch '{ch}' at ({x}, {y}) replaces ({ox}, {oy}), which is now inert",
                        index + 1
                    );
                }
            } else if ch.is_ascii_uppercase() {
                if let Some((ox, oy)) = room.register_door(ch, x, y) {
                    warn!(
                        "room {}: door '{ch}' at ({x}, {y}) replaces ({ox}, {oy}), which can never open",
                        index + 1
                    );
                }
            } else {
                let kind = CellKind::from_symbol(ch);
                if kind == CellKind::Goal {
                    if let Some((gx, gy)) = goal {
                        warn!("room {}: extra goal at ({x}, {y}) replaces ({gx}, {gy})", index + 1);
                    }
                    goal = Some((x, y));
                }
                room.cells.set(x, y, Cell::new(kind));
            }
        }
    }

    let [start_x, start_y] = cursor.read_numbers::<2>("player start")?;
    if !room.cells.is_valid_location(start_x, start_y) {
        return Err(LoadError::StartOutOfBounds { room: index, x: start_x, y: start_y });
    }
    room.start = (start_x, start_y);
    room.goal = goal.ok_or(LoadError::MissingGoal { room: index })?;

    match room.kind_at(start_x, start_y) {
        CellKind::Wall | CellKind::Door => warn!(
            "room {}: player starts on a {:?} at ({start_x}, {start_y})",
            index + 1,
            room.kind_at(start_x, start_y)
        ),
        _ => {}
    }

    for m in room.mappings() {
        match (m.switch, m.door) {
            (Some(_), None) => warn!("room {}: switch '{}' has no door", index + 1, m.id),
            (None, Some(_)) => warn!(
                "room {}: door '{}' has no switch and can never open",
                index + 1,
                m.id.to_ascii_uppercase()
            ),
            _ => {}
        }
    }

    Ok(room)
}

/// Line-oriented reader mixing integer headers and verbatim grid rows.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        LineCursor {
            lines: content.lines().map(|l| l.strip_suffix('\r').unwrap_or(l)).collect(),
            pos: 0,
        }
    }

    /// Read `N` integers, skipping blank lines and crossing line breaks.
    /// Whatever follows the last token on its line is discarded.
    fn read_numbers<const N: usize>(&mut self, what: &'static str) -> Result<[usize; N], LoadError> {
        let mut out = [0usize; N];
        let mut filled = 0;

        while filled < N {
            let Some(line) = self.lines.get(self.pos) else {
                return Err(LoadError::MissingNumber { what, line: self.pos + 1 });
            };
            let line_no = self.pos + 1;
            self.pos += 1;

            for token in line.split_whitespace() {
                if filled == N {
                    break;
                }
                out[filled] = token.parse::<usize>().map_err(|_| LoadError::InvalidNumber {
                    what,
                    line: line_no,
                    token: token.to_string(),
                })?;
                filled += 1;
            }
        }
        Ok(out)
    }

    fn next_row(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Lines not yet consumed.
    fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.pos)
    }

    fn has_content(&self) -> bool {
        self.lines[self.pos.min(self.lines.len())..]
            .iter()
            .any(|l| !l.trim().is_empty())
    }
}

// ══════════════════════════════════════════════════════════════
// Directory loading
// ══════════════════════════════════════════════════════════════

fn level_paths(config: &GameConfig) -> Vec<PathBuf> {
    let dir = &config.levels_dir;
    if !config.level_files.is_empty() {
        return config.level_files.iter().map(|f| dir.join(f)).collect();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("cannot scan {}: {e}", dir.display());
            return vec![];
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |x| x == "dat"))
        .collect();
    paths.sort();
    paths
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[(&str, &str)] = &[
    ("First Steps", "\
2
7 3
#######
#....@#
#######
1 1
6 5
######
#....#
#@##.#
#....#
######
1 1
"),
    ("Switchback", "\
1
7 5
#######
#.a#..#
#..A..#
#...#@#
#######
1 1
"),
    ("Thin Ice", "\
1
8 5
########
#.****.#
#......#
#@######
########
1 1
"),
];

pub fn embedded_levels() -> Vec<LevelData> {
    EMBEDDED.iter()
        .filter_map(|(name, text)| match parse_level(name, text) {
            Ok(level) => Some(level),
            Err(e) => {
                error!("built-in level {name:?} is broken: {e}");
                None
            }
        })
        .collect()
}
