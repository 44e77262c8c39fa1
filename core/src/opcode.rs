use std::fmt;

/// # Opcodes
///
/// Opcodes are 16 bits each, fetched most significant byte first.
/// The leading nibble selects an instruction family; four families
/// (`0x0`, `0x8`, `0xE`, `0xF`) are further split on some other field:
/// - `[___n]` the low nibble for `0x0`, `0x8` and `0xE`
/// - `[__kk]` the low byte for `0xF`
///
/// The remaining fields carry operands.
/// - `[_nnn]` a 12-bit address
/// - `[__kk]` an immediate byte
/// - `[_x__]` the register Vx, or the range V0..=Vx
/// - `[__y_]` the register Vy
/// - `[___n]` a sprite height
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Combines two subsequent bytes of memory, `high` first.
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode(u16::from(high) << 8 | u16::from(low))
    }

    /// `[f___]`
    pub fn family(self) -> usize {
        usize::from((self.0 & 0xF000) >> 12)
    }

    /// `[_x__]`
    pub fn x(self) -> usize {
        usize::from((self.0 & 0x0F00) >> 8)
    }

    /// `[__y_]`
    pub fn y(self) -> usize {
        usize::from((self.0 & 0x00F0) >> 4)
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// `[_nnn]`
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
