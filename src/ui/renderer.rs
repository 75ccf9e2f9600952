/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Glyph)
///   2. Compare each glyph with `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each room cell is two terminal columns wide. The renderer only reads the
/// world; fades are applied by blending every color toward the background.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::{Cell, CellKind};
use crate::domain::room::RoomData;
use crate::sim::world::{Phase, WorldState};

// ── Palette ──

const BASE_BG: (u8, u8, u8) = (22, 22, 35);
const HUD_BG: (u8, u8, u8) = (20, 20, 60);
const MSG_BG: (u8, u8, u8) = (200, 180, 50);
const WALL: (u8, u8, u8) = (90, 90, 115);
const FLOOR: (u8, u8, u8) = (45, 45, 60);
const VISITED: (u8, u8, u8) = (30, 95, 110);
const ICE: (u8, u8, u8) = (150, 200, 235);
const DOOR: (u8, u8, u8) = (130, 80, 40);
const GOAL_LOCKED: (u8, u8, u8) = (200, 60, 60);
const GOAL_OPEN: (u8, u8, u8) = (80, 230, 90);
const SWITCH: (u8, u8, u8) = (255, 210, 60);
const PLAYER: (u8, u8, u8) = (255, 255, 255);
const TEXT: (u8, u8, u8) = (230, 230, 230);
const DIM: (u8, u8, u8) = (110, 110, 130);
const ACCENT: (u8, u8, u8) = (80, 255, 80);
const TITLE: (u8, u8, u8) = (255, 200, 50);

fn rgb(c: (u8, u8, u8)) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

/// Blend `c` toward the background by `amount` (0 = unchanged, 1 = background).
fn fade(c: (u8, u8, u8), amount: f32) -> (u8, u8, u8) {
    let a = amount.clamp(0.0, 1.0);
    let mix = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * a).round() as u8;
    (mix(c.0, BASE_BG.0), mix(c.1, BASE_BG.1), mix(c.2, BASE_BG.2))
}

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    const BLANK: Glyph = Glyph {
        ch: ' ',
        fg: Color::Rgb { r: 230, g: 230, b: 230 },
        bg: Color::Rgb { r: BASE_BG.0, g: BASE_BG.1, b: BASE_BG.2 },
    };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real glyph, so every position will be diff'd.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> Self {
        Glyph { ch, fg: rgb(fg), bg: rgb(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, glyphs: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.glyphs = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.glyphs.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: (u8, u8, u8), bg: (u8, u8, u8)) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    /// Write a string centered horizontally on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: (u8, u8, u8)) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, BASE_BG);
    }

    /// Fill a whole row with `bg`, then write `s` from the left edge.
    fn put_bar(&mut self, y: usize, s: &str, fg: (u8, u8, u8), bg: (u8, u8, u8)) {
        for x in 0..self.width {
            self.set(x, y, Glyph::new(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Renderer ──

/// Terminal columns per room cell.
const CELL_W: usize = 2;

/// Vertical layout
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(rgb(BASE_BG)),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.glyphs.fill(Glyph::INVALID);
        Ok(())
    }

    /// Ask the terminal to report key releases. Returns whether it agreed.
    pub fn enable_key_release(&mut self) -> bool {
        if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            return false;
        }
        self.key_release = execute!(
            self.writer,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.glyphs.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(rgb(BASE_BG)), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.glyphs.fill(Glyph::INVALID);
            queue!(self.writer, SetBackgroundColor(rgb(BASE_BG)), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::GameEnd => self.compose_game_end(world),
            Phase::StartLevel if world.showing_level_title() => self.compose_level_title(world),
            _ => self.compose_game(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Glyph::BLANK.fg;
        let mut last_bg = Glyph::BLANK.bg;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }
                queue!(self.writer, Print(g.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let Some(room) = w.current_room() else { return };
        let cover = w.fade_alpha();

        // ── HUD row ──
        let level_name = w.current_level().map_or("", |l| l.name.as_str());
        let hud = format!(
            " Level {}/{}: {}   Room {}/{}   Floor {}/{} ",
            w.level_index + 1,
            w.level_count(),
            level_name,
            w.room_index + 1,
            w.room_count(),
            room.floor_visited(),
            room.floor_total(),
        );
        self.front.put_bar(HUD_ROW, &hud, fade(TEXT, cover), fade(HUD_BG, cover));

        // ── Map, centered ──
        let map_cols = room.width() * CELL_W;
        let left = self.front.width.saturating_sub(map_cols) / 2;
        for y in 0..room.height() {
            let row = MAP_ROW + y;
            if row >= self.front.height { break; }
            for x in 0..room.width() {
                let [a, b] = cell_glyphs(room, x, y);
                let col = left + x * CELL_W;
                self.front.set(col, row, faded(a, cover));
                self.front.set(col + 1, row, faded(b, cover));
            }
        }

        // ── Player ──
        if let Some(ch) = player_char(w.player.scale) {
            let (px, py) = (w.player.x, w.player.y);
            let bg = room.cell(px, py).map_or(FLOOR, |c| cell_colors(c).1);
            let col = left + px * CELL_W;
            self.front.set(col, MAP_ROW + py, faded(Glyph::new(ch, PLAYER, bg), cover));
            self.front.set(col + 1, MAP_ROW + py, faded(Glyph::new(' ', PLAYER, bg), cover));
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + room.height() + 1;
        if !w.message.is_empty() && msg_row < self.front.height {
            let msg = format!(" * {} ", w.message);
            self.front.put_bar(msg_row, &msg, (0, 0, 0), MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + room.height() + 3;
        if help_row < self.front.height {
            let help = " Arrows/WASD: Move   R: Reset room   ESC: Title  |  Pad: D-pad  Y: Reset";
            self.front.put_str(0, help_row, help, DIM, BASE_BG);
        }
    }

    fn compose_level_title(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        let heading = format!("Level {}", w.level_index + 1);
        self.front.put_centered(mid.saturating_sub(1), &heading, TITLE);
        if let Some(level) = w.current_level() {
            self.front.put_centered(mid + 1, &level.name, TEXT);
        }
    }

    fn compose_title(&mut self, w: &WorldState) {
        let banner = [
            "+-------------------------------------+",
            "|                                     |",
            "|        H A M I L T O N I A N        |",
            "|             E S C A P E             |",
            "|                                     |",
            "+-------------------------------------+",
        ];
        for (i, line) in banner.iter().enumerate() {
            self.front.put_centered(2 + i, line, TITLE);
        }

        self.front.put_centered(9, "Visit every floor tile exactly once,", TEXT);
        self.front.put_centered(10, "then reach the exit.", TEXT);

        self.front.put_centered(13, "ENTER   Play", ACCENT);
        self.front.put_centered(14, "  Q     Quit", TEXT);

        let legend = [
            ".. floor    ## wall    ** ice    [] exit",
            "a  switch opens door  A  with the same letter",
        ];
        for (i, line) in legend.iter().enumerate() {
            self.front.put_centered(17 + i, line, DIM);
        }

        let info = format!("{} levels loaded", w.level_count());
        self.front.put_centered(20, &info, DIM);

        if !w.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            let msg = format!(" * {} ", w.message);
            self.front.put_bar(msg_row, &msg, (0, 0, 0), MSG_BG);
        }
    }

    fn compose_game_end(&mut self, w: &WorldState) {
        let mid = self.front.height / 2;
        self.front.put_centered(mid.saturating_sub(2), "Finished all levels!", TITLE);
        let count = format!("{} levels cleared", w.level_count());
        self.front.put_centered(mid, &count, ACCENT);
        self.front.put_centered(mid + 2, "ENTER / ESC: Back to Title", DIM);
    }
}

// ── Cell appearance ──

/// (foreground, background) for a cell.
fn cell_colors(c: &Cell) -> ((u8, u8, u8), (u8, u8, u8)) {
    match c.kind {
        CellKind::Empty => (TEXT, BASE_BG),
        CellKind::Wall => (WALL, WALL),
        CellKind::Floor if c.visited => (VISITED, VISITED),
        CellKind::Floor => (DIM, FLOOR),
        CellKind::Ice => ((255, 255, 255), ICE),
        CellKind::Switch if c.is_pressed_switch() => (DIM, VISITED),
        CellKind::Switch => (SWITCH, FLOOR),
        CellKind::Door if c.is_locked_door() => (SWITCH, DOOR),
        CellKind::Door => (DIM, if c.visited { VISITED } else { FLOOR }),
        CellKind::Goal if c.is_unlocked_goal() => (GOAL_OPEN, FLOOR),
        CellKind::Goal => (GOAL_LOCKED, FLOOR),
    }
}

fn cell_glyphs(room: &RoomData, x: usize, y: usize) -> [Glyph; 2] {
    let Some(c) = room.cell(x, y) else { return [Glyph::BLANK; 2] };
    let (fg, bg) = cell_colors(c);
    let chars = match c.kind {
        CellKind::Floor if !c.visited => ['·', ' '],
        CellKind::Ice => ['░', '░'],
        CellKind::Switch => [room.switch_id_at(x, y).unwrap_or('?'), ' '],
        CellKind::Door => [
            room.door_id_at(x, y).map_or('?', |id| id.to_ascii_uppercase()),
            ' ',
        ],
        CellKind::Goal => ['[', ']'],
        _ => [' ', ' '],
    };
    [Glyph::new(chars[0], fg, bg), Glyph::new(chars[1], fg, bg)]
}

/// Player glyph for a visual scale: hidden, small or full.
fn player_char(scale: f32) -> Option<char> {
    if scale <= 0.05 {
        None
    } else if scale < 0.6 {
        Some('•')
    } else {
        Some('●')
    }
}

fn faded(g: Glyph, cover: f32) -> Glyph {
    if cover <= 0.0 {
        return g;
    }
    let un = |c: Color| match c {
        Color::Rgb { r, g, b } => rgb(fade((r, g, b), cover)),
        other => other,
    };
    Glyph { ch: g.ch, fg: un(g.fg), bg: un(g.bg) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::CellState;

    #[test]
    fn fade_blends_toward_background() {
        assert_eq!(fade(WALL, 0.0), WALL);
        assert_eq!(fade(WALL, 1.0), BASE_BG);
        assert_eq!(fade((255, 255, 255), 2.0), BASE_BG);
    }

    #[test]
    fn player_glyph_follows_scale() {
        assert_eq!(player_char(0.0), None);
        assert_eq!(player_char(0.3), Some('•'));
        assert_eq!(player_char(1.0), Some('●'));
    }

    #[test]
    fn doors_and_switches_show_their_letter() {
        let mut room = RoomData::new(2, 1);
        room.register_switch('k', 0, 0);
        room.register_door('K', 1, 0);
        assert_eq!(cell_glyphs(&room, 0, 0)[0].ch, 'k');
        assert_eq!(cell_glyphs(&room, 1, 0)[0].ch, 'K');
    }

    #[test]
    fn pressed_switch_is_dimmed() {
        let mut c = Cell::new(CellKind::Switch);
        assert_eq!(cell_colors(&c), (SWITCH, FLOOR));
        c.state = CellState::PRESSED;
        assert_eq!(cell_colors(&c), (DIM, VISITED));
    }

    #[test]
    fn goal_color_changes_when_unlocked() {
        let mut c = Cell::new(CellKind::Goal);
        assert_eq!(cell_colors(&c).0, GOAL_LOCKED);
        c.state = CellState::UNLOCKED;
        assert_eq!(cell_colors(&c).0, GOAL_OPEN);
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.put_str(1, 0, "abc", TEXT, BASE_BG);
        assert_eq!(fb.get(1, 0).ch, 'a');
        assert_eq!(fb.get(2, 0).ch, 'b');
        assert_eq!(fb.get(3, 0), Glyph::BLANK);
    }
}
