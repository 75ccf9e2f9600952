/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{debug, warn};
use serde::Deserialize;
use std::path::PathBuf;

const DATA_DIR_NAME: &str = "hamiltonian-escape";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    /// Ordered level files, relative to `levels_dir`. Empty = every `*.dat`.
    pub level_files: Vec<String>,
    /// Optional looping background track.
    pub music: Option<PathBuf>,
}

/// Frame pacing and animation durations, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub slide_interval_ms: u64,
    pub level_title_hold_ms: u64,
    pub fade_ms: u64,
    pub scale_ms: u64,
}

impl TimingConfig {
    pub fn slide_interval(&self) -> f32 { secs(self.slide_interval_ms) }
    pub fn level_title_hold(&self) -> f32 { secs(self.level_title_hold_ms) }
    pub fn fade(&self) -> f32 { secs(self.fade_ms) }
    pub fn scale(&self) -> f32 { secs(self.scale_ms) }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            frame_ms: default_frame(),
            slide_interval_ms: default_slide_interval(),
            level_title_hold_ms: default_title_hold(),
            fade_ms: default_fade(),
            scale_ms: default_scale(),
        }
    }
}

fn secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub reset: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_slide_interval")]
    slide_interval_ms: u64,
    #[serde(default = "default_title_hold")]
    level_title_hold_ms: u64,
    #[serde(default = "default_fade")]
    fade_ms: u64,
    #[serde(default = "default_scale")]
    scale_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_reset")]
    reset: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_levels")]
    levels: Vec<String>,
    #[serde(default)]
    music: String,
}

// ── Defaults ──

fn default_frame() -> u64 { 16 }
fn default_slide_interval() -> u64 { 90 }
fn default_title_hold() -> u64 { 1200 }
fn default_fade() -> u64 { 700 }
fn default_scale() -> u64 { 250 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_reset() -> Vec<String> { vec!["Y".into()] }
fn default_levels_dir() -> String { "levels".into() }
fn default_levels() -> Vec<String> {
    vec!["level0.dat".into(), "level1.dat".into(), "level2.dat".into()]
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame(),
            slide_interval_ms: default_slide_interval(),
            level_title_hold_ms: default_title_hold(),
            fade_ms: default_fade(),
            scale_ms: default_scale(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            reset: default_reset(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            levels: default_levels(),
            music: String::new(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, XDG data home, system data dir.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    /// Build from TOML text; used by `load` and by tests.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir = resolve_dir(&toml_cfg.general.levels_dir, search_dirs);

        let music = if toml_cfg.general.music.trim().is_empty() {
            None
        } else {
            let p = PathBuf::from(toml_cfg.general.music.trim());
            if p.is_absolute() {
                Some(p)
            } else {
                // Relative music paths are searched like the levels dir
                Some(search_dirs.iter()
                    .map(|d| d.join(&p))
                    .find(|c| c.is_file())
                    .unwrap_or(p))
            }
        };

        let t = toml_cfg.timing;
        GameConfig {
            timing: TimingConfig {
                frame_ms: t.frame_ms.max(1),
                slide_interval_ms: t.slide_interval_ms,
                level_title_hold_ms: t.level_title_hold_ms,
                fade_ms: t.fade_ms,
                scale_ms: t.scale_ms,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                reset: toml_cfg.gamepad.reset,
            },
            levels_dir,
            level_files: toml_cfg.general.levels,
            music,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

/// Absolute paths are kept; relative ones are looked up in the search dirs,
/// falling back to CWD-relative.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its data
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(DATA_DIR_NAME);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share").join(DATA_DIR_NAME);
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        debug!("Config file: {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.timing, TimingConfig::default());
        assert_eq!(cfg.level_files.len(), 3);
        assert_eq!(cfg.levels_dir, PathBuf::from("levels"));
        assert!(cfg.music.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[timing]\nslide_interval_ms = 40\n\n[general]\nlevels = []\n",
        ).unwrap();
        assert_eq!(cfg.timing.slide_interval_ms, 40);
        assert_eq!(cfg.timing.fade_ms, default_fade());
        assert!(cfg.level_files.is_empty());
    }

    #[test]
    fn durations_convert_to_seconds() {
        let t = TimingConfig { fade_ms: 500, ..TimingConfig::default() };
        assert!((t.fade() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_frame_time_is_clamped() {
        let cfg = GameConfig::parse("[timing]\nframe_ms = 0\n").unwrap();
        assert_eq!(cfg.timing.frame_ms, 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(GameConfig::parse("[timing\n").is_err());
    }
}
