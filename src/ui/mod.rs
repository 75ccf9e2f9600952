/// Presentation glue: terminal rendering, keyboard, gamepad, sound.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
