use std::ops::Range;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_TABLE_BASE, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    SPRITE_SHEET, STACK_DEPTH,
};
use crate::error::Fault;
use crate::opcode::Opcode;

/// The FrameBuffer is row-major and indexed as `[y * DISPLAY_WIDTH + x]`
pub type FrameBuffer = [u32; DISPLAY_WIDTH * DISPLAY_HEIGHT];

/// The Chip-8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) an 8-bit stack pointer; the number of active frames
///
/// Timers
/// - 2 8-bit timers (delay & sound), each decremented once per cycle while nonzero
///
/// ## Memory
/// - 16 frame stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x200 is reserved; the sprite sheet lives at `GLYPH_TABLE_BASE`
///     - programs are loaded at 0x200
/// - 64x32 frame buffer of on/off pixels
///
/// ## Input
/// - 16 pressed flags for keys 0..F, written by whoever polls the keyboard
#[derive(Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub keypad: [bool; KEY_COUNT],
    pub opcode: Opcode,
    pub redraw: bool,
    pub rng: StdRng,
}

impl State {
    /// A fresh machine whose random source is seeded from the OS
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A fresh machine whose random source is seeded with `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let base = usize::from(GLYPH_TABLE_BASE);
        memory[base..base + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            keypad: [false; KEY_COUNT],
            opcode: Opcode::default(),
            redraw: false,
            rng,
        }
    }

    /// The memory range `start..start + len`, if it lies entirely within memory
    pub fn span(&self, start: u16, len: usize) -> Result<Range<usize>, Fault> {
        let start = usize::from(start);
        let end = start + len;
        if end > MEMORY_SIZE {
            return Err(Fault::MemoryOutOfBounds {
                address: end.saturating_sub(1).max(start),
            });
        }
        Ok(start..end)
    }

    /// Ticks both timers towards zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
