use std::{
    path::Path,
    time::Instant,
};

use anyhow::Error;
use macroquad::{
    audio::{
        load_sound_from_bytes,
        play_sound,
        stop_sound,
        PlaySoundParams,
        Sound,
    },
    color::{
        self,
        Color,
    },
    input::{
        is_key_down,
        is_key_pressed,
        KeyCode,
    },
    shapes::draw_rectangle,
    window::{
        clear_background,
        next_frame,
        Conf,
    },
};

use crate::{
    config::Config,
    display::Display,
    emulator::{
        Emulator,
        EmulatorError,
    },
};

const LIT: Color = Color {
    r: 0.0,
    g: 0.5,
    b: 0.0,
    a: 1.0,
};

#[rustfmt::skip]
const KEY_MAP: [(KeyCode, u8); 16] = [
    (KeyCode::Key1, 0x1), (KeyCode::Key2, 0x2), (KeyCode::Key3, 0x3), (KeyCode::Key4, 0xC),
    (KeyCode::Q, 0x4),    (KeyCode::W, 0x5),    (KeyCode::E, 0x6),    (KeyCode::R, 0xD),
    (KeyCode::A, 0x7),    (KeyCode::S, 0x8),    (KeyCode::D, 0x9),    (KeyCode::F, 0xE),
    (KeyCode::Z, 0xA),    (KeyCode::X, 0x0),    (KeyCode::C, 0xB),    (KeyCode::V, 0xF),
];

const SAMPLE_RATE: u32 = 44_100;
const BEEP_HZ: u32 = 440;

pub fn window_conf(config: &Config) -> Conf {
    Conf {
        window_title: "chip8vm".to_owned(),
        window_width: (Display::WIDTH as u32 * config.pixel_size) as i32,
        window_height: (Display::HEIGHT as u32 * config.pixel_size) as i32,
        window_resizable: false,
        ..Default::default()
    }
}

/// One second of a square wave as a 16 bit mono WAV file.
fn beep_wav() -> Vec<u8> {
    let samples: Vec<i16> = (0..SAMPLE_RATE)
        .map(|i| if (i * BEEP_HZ * 2 / SAMPLE_RATE) % 2 == 0 { 8_000 } else { -8_000 })
        .collect();
    let data_len = samples.len() as u32 * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    samples.iter().for_each(|s| wav.extend_from_slice(&s.to_le_bytes()));

    wav
}

struct Beeper {
    sound: Sound,
    playing: bool,
}

impl Beeper {
    async fn new() -> Result<Self, Error> {
        let sound = load_sound_from_bytes(&beep_wav()).await?;
        Ok(Self { sound, playing: false })
    }

    fn update(&mut self, active: bool) {
        match (active, self.playing) {
            (true, false) => play_sound(
                &self.sound,
                PlaySoundParams {
                    looped: true,
                    volume: 0.5,
                },
            ),
            (false, true) => stop_sound(&self.sound),
            _ => {}
        }
        self.playing = active;
    }
}

fn poll_keys(emulator: &mut Emulator) {
    let keypad = emulator.keypad_mut();
    for (code, key) in KEY_MAP {
        keypad.set(key, is_key_down(code));
    }
}

fn render(display: &Display, pixel_size: f32) {
    clear_background(color::BLACK);
    for (y, row) in display.rows().enumerate() {
        for (x, _) in row.iter().enumerate().filter(|(_, lit)| **lit) {
            draw_rectangle(x as f32 * pixel_size, y as f32 * pixel_size, pixel_size, pixel_size, LIT);
        }
    }
}

fn session_fault(rom: &Path, fault: EmulatorError) -> Error {
    Error::from(fault).context(format!("{} stopped", rom.display()))
}

/// Drives the emulator in real time until Escape is pressed or a fault occurs.
pub async fn run(config: Config, mut emulator: Emulator) -> Result<(), Error> {
    let mut beeper = Beeper::new().await?;
    let pixel_size = config.pixel_size as f32;
    let ms_per_instruction = config.ms_per_instruction();
    let ms_per_tick = config.ms_per_tick();

    let mut last = Instant::now();
    let mut instruction_budget = 0.0;
    let mut tick_budget = 0.0;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        poll_keys(&mut emulator);

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;
        instruction_budget += elapsed;
        tick_budget += elapsed;

        while tick_budget >= ms_per_tick {
            tick_budget -= ms_per_tick;
            emulator.tick_timers();
        }
        while instruction_budget >= ms_per_instruction {
            instruction_budget -= ms_per_instruction;
            if let Err(fault) = emulator.cycle() {
                beeper.update(false);
                return Err(session_fault(&config.rom, fault));
            }
        }

        beeper.update(emulator.sound_active());
        render(emulator.display(), pixel_size);
        next_frame().await;
    }

    beeper.update(false);
    Ok(())
}
