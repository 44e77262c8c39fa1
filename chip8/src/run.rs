use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use log::{info, warn};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use thiserror::Error;

use emu8_core::{Chip8, Fault};
use emu8_display::{Display, DisplayError};

use crate::config::Config;
use crate::keymap::keymap;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("sdl2: {0}")]
    Sdl(String),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error("machine fault: {0}")]
    Fault(#[from] Fault),
}

pub fn run(config: &Config) -> Result<(), RunError> {
    let mut chip8 = match config.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };

    // Get SDL2 context
    let sdl = sdl2::init().map_err(RunError::Sdl)?;
    let mut display = Display::new(&sdl, "Emu-8", config.scale)?;
    let mut events = sdl.event_pump().map_err(RunError::Sdl)?;

    // Load ROM
    match File::open(&config.rom) {
        Ok(file) => {
            let mut reader = BufReader::new(file);
            if let Err(e) = chip8.load_rom(&mut reader) {
                warn!("{} while loading {:?}; continuing execution", e, config.rom);
            }
        }
        Err(e) => warn!("unable to open {:?} ({}); continuing execution", config.rom, e),
    }
    display.render(chip8.frame(), chip8.row_pitch())?;

    // Set initial timing
    let cycle_time = Duration::from_millis(config.cycle_period);
    let mut last_cycle = Instant::now();

    // Whether or not the configured clock speed should be respected
    let mut fast_forward = false;

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Space, _) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        chip8.cycle()?;

        // Only redraw when the frame changed
        let pitch = chip8.row_pitch();
        if let Some(frame) = chip8.take_frame() {
            display.render(frame, pitch)?;
        }

        // Handle timing
        let current_time = Instant::now();
        let elapsed_cycle_time = current_time - last_cycle;
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    info!("exiting");
    Ok(())
}
