/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded here; everything below is reserved for the interpreter
pub const PROGRAM_START: u16 = 0x200;

/// The largest program that fits between `PROGRAM_START` and the end of memory
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Number of return addresses the call stack can hold
pub const STACK_DEPTH: usize = 16;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// A lit pixel; unlit pixels are 0
pub const PIXEL_ON: u32 = 0xFFFF_FFFF;

/// Length of a single frame buffer row in bytes
pub const ROW_PITCH: usize = DISPLAY_WIDTH * std::mem::size_of::<u32>();

/// Sprite sheet location in reserved memory
pub const GLYPH_TABLE_BASE: u16 = 50;

/// Bytes per glyph in the sprite sheet
pub const GLYPH_SIZE: u16 = 5;

/// # Sprite Sheet
/// 16 hexadecimal glyphs (0..F), each 4 pixels wide and 5 rows tall.
/// Only the high nibble of each byte is drawn.
/// ```text
/// 0xF0 ****
/// 0x90 *  *
/// 0x90 *  *
/// 0x90 *  *
/// 0xF0 ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
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

/// Default wall-clock time between cycles in milliseconds
pub const CYCLE_PERIOD_MS: u64 = 3;
