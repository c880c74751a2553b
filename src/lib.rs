//! A CHIP-8 interpreter core. It owns the machine state, decodes and executes
//! instructions one cycle at a time, and leaves presentation, input polling and
//! real time pacing to the host.

// # Interpreter
// * 4096 (0x1000) bytes of memory
// * the built-in hex font lives in the first 80 (0x50) bytes
// * programs are loaded at 512 (0x200) and may use the rest of memory
// * 16 8-bit registers: V0 - VF
// * VF if used is the carry flag in addition operations, "no borrow" flag in subtraction, shifted
// out bit in shifts, and in the draw operation the VF flag is set to denote pixel collision
// * the address register I is 16 bits wide
// * the stack is only used to store return addresses when subroutines are called

// # Timers
// * two timers counting down at 60 hertz
//  - delay timer is used for events, it can be set and read
//  - sound timer beeps when its value is nonzero
// The host decides when a tick happens, see `tick_timers` and `TimerClock`

// # Input
// there is a 16 symbol hex keyboard with values 0 - F. There are 3 opcode that deal with handling input
//  - one skips an instruction if a specific key is pressed
//  - one skips an instruction if a specific key is NOT pressed
//  - waits for a key press and stores it in a register once it detects it

// # Graphics
// 64x32 monochrome pixels, sprites are XORed on

mod config;
mod error;
pub mod graphics;
mod keyboard;
mod op;
mod timer;


pub use config::Config;
pub use error::{Error, Result};
pub use graphics::{Graphics, HEIGHT, WIDTH};
pub use keyboard::{AsKeyboard, Key, Keyboard};
pub use op::{DispatchTable, Op};
pub use timer::{TimerClock, TIMER_HZ, TIMER_INTERVAL};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slog::{debug, error, info, o, trace, Discard, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;
use std::path::Path;

pub const MEMORY_SIZE: usize = 4096;
/// where programs get loaded, and where the program counter starts
pub const STARTING_MEMORY_BYTE: usize = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - STARTING_MEMORY_BYTE;
pub const STACK_SIZE: usize = 16;
pub const NUM_REGISTERS: usize = 16;
pub const NUM_BYTES_IN_FONT_CHAR: u8 = 5;

const FLAG: usize = 0xF;

/// the 16 5-byte hex glyphs, stored at the bottom of memory
const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Build a logger that writes to stderr at `level`, for hosts that want to see
/// what the interpreter is doing
pub fn terminal_logger(level: Severity) -> Result<Logger> {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(level);
    builder.destination(Destination::Stderr);
    builder.build().map_err(|e| Error::Logger(e.to_string()))
}

pub struct Emulator {
    memory: [u8; MEMORY_SIZE], // 4k of RAM

    stack: [u16; STACK_SIZE], // program stack. CHIP 8 can hold up to 16 return addresses
    sp: usize,                // number of return addresses on the stack

    addr: u16, // address instruction register, I
    pc: u16,   // program counter
    instr: u16, // most recently fetched instruction word

    // 16 8-bit registers. VF is used as a flag by several of the opcodes (see @Op)
    v: [u8; NUM_REGISTERS],

    graphics: Graphics, // 64x32 pixel monochrome screen
    redraw: bool,       // set whenever `graphics` changes, cleared by the host

    delay_timer: u8, // 60 Hz timer that can be set and read
    sound_timer: u8, // 60 Hz timer that beeps whenever it is nonzero

    keyboard: Keyboard,
    dispatch: DispatchTable,
    rng: StdRng, // seeded once, drawn from by CXNN
    config: Config,
    logger: Logger,
}

impl Emulator {
    /// Create a machine with the font loaded, nothing else in memory, and the
    /// program counter at 0x200. Logs go nowhere unless a logger is passed in
    pub fn new(logger: Option<Logger>, config: Config) -> Self {
        let logger = logger.unwrap_or_else(|| Logger::root(Discard, o!()));

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut memory = [0; MEMORY_SIZE];
        memory[..FONT_SET.len()].copy_from_slice(&FONT_SET);

        info!(logger, "created emulator"; "config" => ?config);

        Emulator {
            memory,
            stack: [0; STACK_SIZE],
            sp: 0,
            addr: 0,
            pc: STARTING_MEMORY_BYTE as u16,
            instr: 0,
            v: [0; NUM_REGISTERS],
            graphics: Graphics::new(),
            redraw: true,
            delay_timer: 0,
            sound_timer: 0,
            keyboard: Keyboard::new(),
            dispatch: DispatchTable::new(),
            rng,
            config,
            logger,
        }
    }

    /// Create a machine and load the program image at `path` into it
    pub fn with_game_file<P: AsRef<Path>>(
        path: P,
        logger: Option<Logger>,
        config: Config,
    ) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let mut emulator = Emulator::new(logger, config);
        emulator.load_program(&bytes)?;
        Ok(emulator)
    }

    /// Copy a raw program image into memory starting at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.is_empty() {
            return Err(Error::EmptyProgram);
        }
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Error::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let end = STARTING_MEMORY_BYTE + program.len();
        self.memory[STARTING_MEMORY_BYTE..end].copy_from_slice(program);
        debug!(self.logger, "loaded program"; "bytes" => program.len());
        Ok(())
    }

    /// Run one instruction: fetch the word at the program counter, decode it
    /// and execute it. Returns the op that ran
    pub fn cycle(&mut self) -> Result<Op> {
        let word = self.fetch()?;
        let op = self.dispatch.decode(word);
        trace!(self.logger, "cycle"; "pc" => format!("{:#05X}", self.pc - 2), "word" => format!("{:#06X}", word), "op" => %op);

        self.execute(op)?;

        if self.config.couple_timers_to_cycles {
            self.tick_timers();
        }
        Ok(op)
    }

    /// Run `cycles_per_frame` instructions followed by a single timer tick,
    /// one 60th of a second worth of work
    pub fn run_frame(&mut self) -> Result<()> {
        for _ in 0..self.config.cycles_per_frame {
            self.cycle()?;
        }
        self.tick_timers();
        Ok(())
    }

    /// Count both timers down by one, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Read the big-endian word at the program counter and move past it
    fn fetch(&mut self) -> Result<u16> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            error!(self.logger, "program counter ran off the end of memory"; "pc" => self.pc);
            return Err(Error::ProgramCounterOutOfBounds { pc: self.pc });
        }

        self.instr = u16::from(self.memory[pc]) << 8 | u16::from(self.memory[pc + 1]);
        self.pc += 2;
        Ok(self.instr)
    }

    /// Execute a single decoded op. The program counter is expected to already
    /// point past the instruction, as `cycle` leaves it. Operands wider than an
    /// instruction word could encode are masked down first
    pub fn execute(&mut self, op: Op) -> Result<()> {
        match op.masked() {
            Op::DispClear => {
                self.graphics.clear();
                self.redraw = true;
            }
            Op::Return => {
                if self.sp == 0 {
                    error!(self.logger, "return with empty stack"; "pc" => self.pc);
                    return Err(Error::StackUnderflow { pc: self.pc });
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp];
            }
            Op::Goto(addr) => self.pc = addr,
            Op::GotoSubRtn(addr) => {
                if self.sp == STACK_SIZE {
                    error!(self.logger, "call with full stack"; "pc" => self.pc);
                    return Err(Error::StackOverflow { pc: self.pc });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = addr;
            }
            Op::CondVxEq(x, nn) => self.skip_if(self.v[x as usize] == nn),
            Op::CondVxNe(x, nn) => self.skip_if(self.v[x as usize] != nn),
            Op::CondVxVyEq(x, y) => self.skip_if(self.v[x as usize] == self.v[y as usize]),
            Op::ConstSetVx(x, nn) => self.v[x as usize] = nn,
            Op::ConstAddVx(x, nn) => {
                self.v[x as usize] = self.v[x as usize].wrapping_add(nn);
            }
            Op::AssignVyToVx(x, y) => self.v[x as usize] = self.v[y as usize],
            Op::BitOpOr(x, y) => self.v[x as usize] |= self.v[y as usize],
            Op::BitOpAnd(x, y) => self.v[x as usize] &= self.v[y as usize],
            Op::BitOpXor(x, y) => self.v[x as usize] ^= self.v[y as usize],
            Op::MathVxAddVy(x, y) => {
                let (sum, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
                self.v[FLAG] = carry as u8;
                self.v[x as usize] = sum;
            }
            Op::MathVxMinusVy(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[FLAG] = (vx >= vy) as u8;
                self.v[x as usize] = vx.wrapping_sub(vy);
            }
            Op::BitOpRtShift(x) => {
                let vx = self.v[x as usize];
                self.v[FLAG] = vx & 1;
                self.v[x as usize] = vx >> 1;
            }
            Op::MathVyMinusVx(x, y) => {
                let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
                self.v[FLAG] = (vy >= vx) as u8;
                self.v[x as usize] = vy.wrapping_sub(vx);
            }
            Op::BitOpLftShift(x) => {
                let vx = self.v[x as usize];
                self.v[FLAG] = (vx >> 7) & 1;
                self.v[x as usize] = vx << 1;
            }
            Op::CondVxVyNe(x, y) => self.skip_if(self.v[x as usize] != self.v[y as usize]),
            Op::MemSetI(addr) => self.addr = addr,
            Op::GotoPlusV0(addr) => self.pc = u16::from(self.v[0]) + addr,
            Op::Rand(x, nn) => self.v[x as usize] = self.rng.gen::<u8>() & nn,
            Op::DispDraw(x, y, height) => self.draw_sprite(x, y, height)?,
            Op::KeyOpEqVx(x) => {
                let key_down = self.keyboard.get_key_state(self.v[x as usize] as usize);
                self.skip_if(key_down);
            }
            Op::KeyOpNeVx(x) => {
                let key_down = self.keyboard.get_key_state(self.v[x as usize] as usize);
                self.skip_if(!key_down);
            }
            Op::DelayGet(x) => self.v[x as usize] = self.delay_timer,
            Op::KeyOpGet(x) => match self.keyboard.first_key_down() {
                Some(key) => self.v[x as usize] = key,
                None => {
                    // run this same instruction again next cycle
                    self.pc = self.pc.wrapping_sub(2);
                    debug!(self.logger, "waiting for key press"; "pc" => self.pc);
                }
            },
            Op::DelaySet(x) => self.delay_timer = self.v[x as usize],
            Op::SoundSet(x) => self.sound_timer = self.v[x as usize],
            Op::MemIPlusEqVx(x) => {
                self.addr = self.addr.wrapping_add(u16::from(self.v[x as usize]));
            }
            Op::MemISetSprite(x) => {
                self.addr = u16::from((self.v[x as usize] & 0xF) * NUM_BYTES_IN_FONT_CHAR);
            }
            Op::Bcd(x) => {
                let vx = self.v[x as usize];
                let start = self.checked_range(3)?;
                self.memory[start] = vx / 100;
                self.memory[start + 1] = (vx / 10) % 10;
                self.memory[start + 2] = vx % 10;
            }
            Op::RegDump(x) => {
                let count = x as usize + 1;
                let start = self.checked_range(count)?;
                self.memory[start..start + count].copy_from_slice(&self.v[..count]);
                self.advance_index_after_transfer(count);
            }
            Op::RegLoad(x) => {
                let count = x as usize + 1;
                let start = self.checked_range(count)?;
                self.v[..count].copy_from_slice(&self.memory[start..start + count]);
                self.advance_index_after_transfer(count);
            }
            Op::NoOp(word) => {
                debug!(self.logger, "ignoring unrecognized instruction"; "word" => format!("{:#06X}", word));
            }
        }
        Ok(())
    }

    /// Skip the next instruction when `cond` holds
    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.pc += 2;
        }
    }

    /// XOR an `height` row sprite read from memory at I onto the screen at
    /// (Vx, Vy). Each pixel wraps around the screen edges on its own
    fn draw_sprite(&mut self, x: u8, y: u8, height: u8) -> Result<()> {
        let start = self.checked_range(height as usize)?;
        let x_origin = self.v[x as usize] as usize;
        let y_origin = self.v[y as usize] as usize;

        self.v[FLAG] = 0;
        for row in 0..height as usize {
            let sprite_byte = self.memory[start + row];
            for col in 0..8 {
                if (sprite_byte >> (7 - col)) & 1 == 1
                    && self.graphics.toggle(x_origin + col, y_origin + row)
                {
                    self.v[FLAG] = 1;
                }
            }
        }

        self.redraw = true;
        Ok(())
    }

    /// Check that `len` bytes starting at I all lie inside memory, returning I
    /// as an index
    fn checked_range(&self, len: usize) -> Result<usize> {
        let start = self.addr as usize;
        if start + len > MEMORY_SIZE {
            error!(self.logger, "memory access out of bounds"; "address" => start, "len" => len);
            return Err(Error::AddressOutOfBounds {
                address: start,
                len,
            });
        }
        Ok(start)
    }

    fn advance_index_after_transfer(&mut self, count: usize) {
        if self.config.increment_index_on_transfer {
            self.addr += count as u16;
        }
    }

    /// Ask `keyboard` which keys are held and make that the machine's key state
    pub fn handle_key_input(&mut self, keyboard: &impl AsKeyboard) {
        self.keyboard.update_keyboard(&keyboard.keys_down());
    }

    /// Press or release a single key
    pub fn set_key(&mut self, key: Key, down: bool) {
        if down {
            self.keyboard.handle_key_down(key);
        } else {
            self.keyboard.handle_key_up(key);
        }
    }

    pub fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    /// True when the pixel buffer changed since the host last took it
    pub fn redraw_pending(&self) -> bool {
        self.redraw
    }

    /// Return whether a redraw is pending, and clear it
    pub fn take_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.redraw, false)
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.v
    }

    pub fn index_register(&self) -> u16 {
        self.addr
    }

    pub fn program_counter(&self) -> u16 {
        self.pc
    }

    pub fn stack_pointer(&self) -> usize {
        self.sp
    }

    /// The word fetched by the most recent cycle
    pub fn current_instruction(&self) -> u16 {
        self.instr
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// True while the sound timer is counting, i.e. while a tone should play
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }
}
