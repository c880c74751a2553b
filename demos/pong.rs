use chipvm::{AsKeyboard, Config, Emulator, Key, TimerClock, HEIGHT, WIDTH};
use device_query::{DeviceQuery, DeviceState, Keycode};
use minifb::{ScaleMode, Window, WindowOptions};
use std::time::Duration;

const LIT: u32 = 0x00FF_FFFF;
const DARK: u32 = 0;

struct Keyboard(pub DeviceState);

impl AsKeyboard for Keyboard {
    fn keys_down(&self) -> Vec<Key> {
        self.0
            .get_keys()
            .iter()
            .filter_map(|key: &Keycode| match key {
                Keycode::Key1 => Some(Key::Key1),
                Keycode::Key2 => Some(Key::Key2),
                Keycode::Key3 => Some(Key::Key3),
                Keycode::Key4 => Some(Key::C),
                Keycode::Q => Some(Key::Key4),
                Keycode::W => Some(Key::Key5),
                Keycode::E => Some(Key::Key6),
                Keycode::R => Some(Key::D),
                Keycode::A => Some(Key::Key7),
                Keycode::S => Some(Key::Key8),
                Keycode::D => Some(Key::Key9),
                Keycode::F => Some(Key::E),
                Keycode::Z => Some(Key::A),
                Keycode::X => Some(Key::Key0),
                Keycode::C => Some(Key::B),
                Keycode::V => Some(Key::F),
                _ => None,
            })
            .collect()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut window: Window = Window::new(
        "CHIP-8 (chipvm)",
        WIDTH,
        HEIGHT,
        WindowOptions {
            resize: true,
            scale_mode: ScaleMode::UpperLeft,
            ..WindowOptions::default()
        },
    )?;

    // Limit to max update rate. This only needs about 60 Hz, which is 16ms
    window.limit_update_rate(Some(Duration::from_millis(16)));

    // create the emulator and load the pong game file
    let config = Config::default();
    let cycles_per_frame = config.cycles_per_frame;
    let mut emulator = Emulator::with_game_file("games/PONG", None, config)?;

    // setup keyboard
    let keyboard = Keyboard(DeviceState::new());
    let mut clock = TimerClock::new();

    while window.is_open() {
        // check for key press changes and update the Emulator with which keys are up or down
        emulator.handle_key_input(&keyboard);

        for _ in 0..cycles_per_frame {
            emulator.cycle()?;
        }
        for _ in 0..clock.ticks_elapsed() {
            emulator.tick_timers();
        }

        // draw the display if it changed
        if emulator.take_redraw() {
            let display = emulator.graphics().to_argb(LIT, DARK);
            window.update_with_buffer(&display, WIDTH, HEIGHT)?;
        } else {
            window.update();
        }
    }
    Ok(())
}
