use std::io::Read;

use log::{debug, info};

use crate::constants::{KEY_COUNT, MAX_PROGRAM_SIZE, PROGRAM_START, ROW_PITCH};
use crate::dispatch::dispatch;
use crate::error::Fault;
use crate::opcode::Opcode;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Owns the machine `state` and supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the machine by a single cycle
/// - inspecting its frame buffer for rendering by some display
/// - inspecting its timers
///
/// The machine has no notion of wall-clock time; callers decide how often to
/// call `cycle`.
pub struct Chip8 {
    state: State,
}

impl Chip8 {
    /// A machine whose random source is seeded from the OS
    pub fn new() -> Self {
        Chip8 {
            state: State::new(),
        }
    }

    /// A machine whose random source is seeded with `seed`, for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Chip8 {
            state: State::with_seed(seed),
        }
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a reader that yields the entire ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), Fault> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Copy `program` into memory starting at `PROGRAM_START`
    ///
    /// Programs that don't fit are rejected without touching memory.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Fault> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Fault::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = usize::from(PROGRAM_START);
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        info!("loaded {} byte program at {:#05X}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Advances the machine by a single instruction and a single timer tick
    /// - fetches the opcode at the pc and moves the pc past it
    /// - executes the opcode
    /// - decrements both timers
    ///
    /// On a fault the machine is left as it was before the call.
    pub fn cycle(&mut self) -> Result<(), Fault> {
        let pc = self.state.pc;
        let opcode = self.fetch()?;
        let latched = self.state.opcode;

        self.state.opcode = opcode;
        self.state.pc = pc.wrapping_add(0x2);
        if let Err(fault) = dispatch(&mut self.state) {
            debug!("{} faulted at {:#05X}: {}", opcode, pc, fault);
            self.state.pc = pc;
            self.state.opcode = latched;
            return Err(fault);
        }

        self.state.tick_timers();
        Ok(())
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn fetch(&self) -> Result<Opcode, Fault> {
        let bytes = self.state.span(self.state.pc, 2)?;
        let word = &self.state.memory[bytes];
        Ok(Opcode::from_bytes(word[0], word[1]))
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.state.keypad[usize::from(key) % KEY_COUNT] = true;
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.state.keypad[usize::from(key) % KEY_COUNT] = false;
    }

    /// The pressed status of every key, for input handlers that track the whole keypad
    pub fn keypad_mut(&mut self) -> &mut [bool; KEY_COUNT] {
        &mut self.state.keypad
    }

    /// The current FrameBuffer
    pub fn frame(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<&FrameBuffer> {
        if std::mem::take(&mut self.state.redraw) {
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Length of a FrameBuffer row in bytes
    pub fn row_pitch(&self) -> usize {
        ROW_PITCH
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Whether a beep should be sounding
    pub fn is_beeping(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GLYPH_TABLE_BASE, MEMORY_SIZE, PIXEL_ON, SPRITE_SHEET};

    fn with_program(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::with_seed(0);
        chip8.load_program(program).unwrap();
        chip8
    }

    #[test]
    fn test_chip8_fetches_op() {
        let chip8 = with_program(&[0xAA, 0xBB]);
        assert_eq!(chip8.fetch().unwrap(), Opcode(0xAABB));
    }

    #[test]
    fn test_cycle_advances_pc() {
        // a cls opcode
        let mut chip8 = with_program(&[0x00, 0xE0]);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.opcode, Opcode(0x00E0));
    }

    #[test]
    fn test_cycle_over_empty_memory_is_harmless() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_cycle_jumps() {
        let mut chip8 = with_program(&[0x12, 0x00]);
        for _ in 0..3 {
            chip8.cycle().unwrap();
            assert_eq!(chip8.state.pc, 0x200);
        }
    }

    #[test]
    fn test_cycle_ticks_timers() {
        // DT = V0; ST = V0
        let mut chip8 = with_program(&[0x60, 0x02, 0xF0, 0x15, 0xF0, 0x18, 0x00, 0xE0]);
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        // set this cycle, then ticked once
        assert_eq!(chip8.delay_timer(), 1);
        chip8.cycle().unwrap();
        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 1);
        assert!(chip8.is_beeping());
        chip8.cycle().unwrap();
        assert_eq!(chip8.sound_timer(), 0);
        assert!(!chip8.is_beeping());
    }

    #[test]
    fn test_cycle_waits_for_key() {
        let mut chip8 = with_program(&[0xF3, 0x0A]);
        chip8.cycle().unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x200);

        chip8.key_press(0xB);
        chip8.key_press(0x4);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.v[0x3], 0x4);
    }

    #[test]
    fn test_fault_leaves_state_untouched() {
        // V0 = 5; return with an empty stack
        let mut chip8 = with_program(&[0x60, 0x05, 0x00, 0xEE]);
        chip8.state.delay_timer = 3;
        chip8.cycle().unwrap();
        let fault = chip8.cycle().unwrap_err();
        assert_eq!(fault, Fault::StackUnderflow { pc: 0x202 });
        assert_eq!(chip8.state.pc, 0x202);
        assert_eq!(chip8.state.opcode, Opcode(0x6005));
        assert_eq!(chip8.delay_timer(), 2);
    }

    #[test]
    fn test_fetch_past_memory_faults() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.state.pc = (MEMORY_SIZE - 1) as u16;
        assert_eq!(
            chip8.cycle(),
            Err(Fault::MemoryOutOfBounds { address: MEMORY_SIZE })
        );
    }

    #[test]
    fn test_loads_program_verbatim() {
        let program: Vec<u8> = (0..=255).collect();
        let chip8 = with_program(&program);
        assert_eq!(chip8.state.memory[0x200..0x300], program[..]);
        assert_eq!(chip8.state.memory[0x300], 0);
    }

    #[test]
    fn test_loads_rom_from_reader() {
        let mut chip8 = Chip8::with_seed(0);
        let mut rom: &[u8] = &[0x00, 0xE0, 0x12, 0x00];
        chip8.load_rom(&mut rom).unwrap();
        assert_eq!(chip8.state.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_loads_largest_program() {
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        let chip8 = with_program(&program);
        assert_eq!(chip8.state.memory[MEMORY_SIZE - 1], 0xAB);
        let base = usize::from(GLYPH_TABLE_BASE);
        assert_eq!(chip8.state.memory[base..base + 80], SPRITE_SHEET);
    }

    #[test]
    fn test_rejects_oversized_program() {
        let mut chip8 = Chip8::with_seed(0);
        let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            chip8.load_program(&program),
            Err(Fault::ProgramTooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max: MAX_PROGRAM_SIZE
            })
        );
        assert!(chip8.state.memory[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_take_frame_only_after_drawing() {
        // I = glyph 0; draw it at (V0, V0)
        let [hi, lo] = (0xA000 | GLYPH_TABLE_BASE).to_be_bytes();
        let mut chip8 = with_program(&[hi, lo, 0xD0, 0x05]);
        assert!(chip8.take_frame().is_none());
        chip8.cycle().unwrap();
        assert!(chip8.take_frame().is_none());
        chip8.cycle().unwrap();
        let frame = chip8.take_frame().unwrap();
        assert_eq!(frame[0], PIXEL_ON);
        assert!(chip8.take_frame().is_none());
        assert_eq!(chip8.frame()[0], PIXEL_ON);
    }

    #[test]
    fn test_keys_track_press_and_release() {
        let mut chip8 = Chip8::with_seed(0);
        chip8.key_press(0x7);
        assert!(chip8.state.keypad[0x7]);
        chip8.key_release(0x7);
        assert!(!chip8.state.keypad[0x7]);
        chip8.keypad_mut()[0xF] = true;
        assert!(chip8.state.keypad[0xF]);
    }

    #[test]
    fn test_row_pitch() {
        assert_eq!(Chip8::with_seed(0).row_pitch(), 256);
    }
}
