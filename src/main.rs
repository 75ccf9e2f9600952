/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use log::info;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level::load_levels;
use sim::progress;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{Sfx, SoundEngine};

/// The terminal is in raw alternate-screen mode, so logs go to a file.
const LOG_FILE: &str = "hamiltonian-escape.log";

/// Longest frame delta fed to the simulation (e.g. after a terminal stall).
const MAX_DT: f32 = 0.25;

fn main() {
    init_logging();

    let config = GameConfig::load();
    let levels = load_levels(&config);
    info!("{} levels ready", levels.len());

    let mut world = WorldState::new(levels, config.timing.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut sound = SoundEngine::new();
    if let (Some(engine), Some(path)) = (sound.as_mut(), config.music.as_deref()) {
        engine.play_music(path);
    }

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Hamiltonian Escape!");
}

/// `RUST_LOG` overrides the default `info` filter. No file, no logs.
fn init_logging() {
    let Ok(file) = File::create(LOG_FILE) else { return };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.enable_key_release();
    let mut gp = GamepadState::new();
    gp.apply_config(&config.gamepad);

    let frame = Duration::from_millis(config.timing.frame_ms);
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut input = merge(kb.frame_input(), gp.frame_input());
        match world.phase {
            Phase::Title if input.cancel || kb.quit_pressed() => break,
            Phase::Title | Phase::GameEnd => {}
            _ if input.cancel => {
                info!("back to title from level {}", world.level_index + 1);
                progress::return_to_title(world);
                input = FrameInput::default();
            }
            _ => {}
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32().min(MAX_DT);
        last_frame = now;

        let events = progress::advance(world, input, dt);
        process_sound_events(sound, &events);
        for event in &events {
            match event {
                GameEvent::DoorUnlocked { id, .. } => {
                    world.set_message(&format!("Door {} opened", id.to_ascii_uppercase()), 1.5);
                }
                GameEvent::RoomReset => world.set_message("Room reset", 1.5),
                _ => {}
            }
        }

        renderer.render(world)?;
        std::thread::sleep(frame);
    }

    Ok(())
}

/// Keyboard and pad both count; an action fires if either source pressed it.
fn merge(a: FrameInput, b: FrameInput) -> FrameInput {
    FrameInput {
        up: a.up || b.up,
        down: a.down || b.down,
        left: a.left || b.left,
        right: a.right || b.right,
        reset: a.reset || b.reset,
        confirm: a.confirm || b.confirm,
        cancel: a.cancel || b.cancel,
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };

    // One effect per frame: the most significant event wins
    let pick = events.iter()
        .filter_map(|e| match e {
            GameEvent::PlayerMoved { .. } => Some(Sfx::Step),
            GameEvent::SlideStarted => Some(Sfx::Slide),
            GameEvent::SwitchPressed { .. } => Some(Sfx::Switch),
            GameEvent::GoalUnlocked => Some(Sfx::Unlock),
            GameEvent::RoomSolved => Some(Sfx::Clear),
            GameEvent::GameComplete => Some(Sfx::Complete),
            _ => None,
        })
        .max();

    if let Some(s) = pick {
        sfx.play(s);
    }
}
