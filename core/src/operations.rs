//! Instruction handlers.
//!
//! Every handler reads its operands from the latched `state.opcode`. The
//! program counter has already been moved past the instruction, so skips add
//! another 2 and jumps simply overwrite it.

use rand::Rng;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_SIZE, GLYPH_TABLE_BASE, KEY_COUNT, PIXEL_ON, STACK_DEPTH,
};
use crate::error::Fault;
use crate::state::State;

pub type Outcome = Result<(), Fault>;

fn skip_if(state: &mut State, condition: bool) {
    if condition {
        state.pc = state.pc.wrapping_add(0x2);
    }
}

/// Unknown opcodes do nothing
pub fn noop(_state: &mut State) -> Outcome {
    Ok(())
}

/// clear
pub fn clr(state: &mut State) -> Outcome {
    state.frame_buffer.fill(0);
    state.redraw = true;
    Ok(())
}

/// PC = STACK.pop()
pub fn rts(state: &mut State) -> Outcome {
    if state.sp == 0 {
        return Err(Fault::StackUnderflow {
            pc: state.pc.wrapping_sub(0x2),
        });
    }
    state.sp -= 1;
    state.pc = state.stack[usize::from(state.sp)];
    Ok(())
}

/// PC = nnn
pub fn jump(state: &mut State) -> Outcome {
    state.pc = state.opcode.nnn();
    Ok(())
}

/// STACK.push(PC); PC = nnn
pub fn call(state: &mut State) -> Outcome {
    if usize::from(state.sp) >= STACK_DEPTH {
        return Err(Fault::StackOverflow {
            pc: state.pc.wrapping_sub(0x2),
        });
    }
    state.stack[usize::from(state.sp)] = state.pc;
    state.sp += 1;
    state.pc = state.opcode.nnn();
    Ok(())
}

/// if Vx == kk then pc += 2
pub fn ske(state: &mut State) -> Outcome {
    let op = state.opcode;
    let condition = state.v[op.x()] == op.kk();
    skip_if(state, condition);
    Ok(())
}

/// if Vx != kk then pc += 2
pub fn skne(state: &mut State) -> Outcome {
    let op = state.opcode;
    let condition = state.v[op.x()] != op.kk();
    skip_if(state, condition);
    Ok(())
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State) -> Outcome {
    let op = state.opcode;
    let condition = state.v[op.x()] == state.v[op.y()];
    skip_if(state, condition);
    Ok(())
}

/// Vx = kk
pub fn load(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] = op.kk();
    Ok(())
}

/// Vx += kk
/// Overflow wraps and VF is left alone
pub fn add(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] = state.v[op.x()].wrapping_add(op.kk());
    Ok(())
}

/// Vx = Vy
pub fn mv(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] = state.v[op.y()];
    Ok(())
}

/// Vx |= Vy
pub fn or(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] |= state.v[op.y()];
    Ok(())
}

/// Vx &= Vy
pub fn and(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] &= state.v[op.y()];
    Ok(())
}

/// Vx ^= Vy
pub fn xor(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] ^= state.v[op.y()];
    Ok(())
}

/// Vx += Vy; VF = carry
pub fn addr(state: &mut State) -> Outcome {
    let op = state.opcode;
    let (res, carry) = state.v[op.x()].overflowing_add(state.v[op.y()]);
    state.v[0xF] = u8::from(carry);
    state.v[op.x()] = res;
    Ok(())
}

/// Vx -= Vy; VF = Vx > Vy
pub fn sub(state: &mut State) -> Outcome {
    let op = state.opcode;
    let (vx, vy) = (state.v[op.x()], state.v[op.y()]);
    state.v[0xF] = u8::from(vx > vy);
    state.v[op.x()] = vx.wrapping_sub(vy);
    Ok(())
}

/// Vx >>= 1; VF = lsb
pub fn shr(state: &mut State) -> Outcome {
    let op = state.opcode;
    let vx = state.v[op.x()];
    state.v[0xF] = vx & 0x1;
    state.v[op.x()] = vx >> 1;
    Ok(())
}

/// Vx = Vy - Vx; VF = Vy > Vx
pub fn subn(state: &mut State) -> Outcome {
    let op = state.opcode;
    let (vx, vy) = (state.v[op.x()], state.v[op.y()]);
    state.v[0xF] = u8::from(vy > vx);
    state.v[op.x()] = vy.wrapping_sub(vx);
    Ok(())
}

/// Vx <<= 1; VF = msb
pub fn shl(state: &mut State) -> Outcome {
    let op = state.opcode;
    let vx = state.v[op.x()];
    state.v[0xF] = (vx & 0x80) >> 7;
    state.v[op.x()] = vx << 1;
    Ok(())
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State) -> Outcome {
    let op = state.opcode;
    let condition = state.v[op.x()] != state.v[op.y()];
    skip_if(state, condition);
    Ok(())
}

/// I = nnn
pub fn loadi(state: &mut State) -> Outcome {
    state.i = state.opcode.nnn();
    Ok(())
}

/// PC = V0 + nnn
pub fn jumpi(state: &mut State) -> Outcome {
    state.pc = u16::from(state.v[0x0]) + state.opcode.nnn();
    Ok(())
}

/// Vx = rand_byte & kk
pub fn rand(state: &mut State) -> Outcome {
    let op = state.opcode;
    let byte: u8 = state.rng.gen();
    state.v[op.x()] = byte & op.kk();
    Ok(())
}

/// draw_sprite(x=Vx y=Vy size=n)
///
/// XORs the n byte sprite at memory I..I+n onto the FrameBuffer at (Vx, Vy).
/// The origin wraps onto the screen but the sprite itself does not: pixels
/// past the right edge bleed into the next row and pixels past the last row
/// are dropped.
///
/// Sets VF if any pixel was turned off.
pub fn draw(state: &mut State) -> Outcome {
    let op = state.opcode;
    let sprite = state.span(state.i, usize::from(op.n()))?;
    let x = usize::from(state.v[op.x()]) % DISPLAY_WIDTH;
    let y = usize::from(state.v[op.y()]) % DISPLAY_HEIGHT;

    state.v[0xF] = 0x0;
    for (row, byte) in state.memory[sprite].iter().enumerate() {
        for column in 0..8 {
            if byte & (0x80 >> column) == 0 {
                continue;
            }
            let cell = (y + row) * DISPLAY_WIDTH + x + column;
            if let Some(pixel) = state.frame_buffer.get_mut(cell) {
                if *pixel == PIXEL_ON {
                    state.v[0xF] = 0x1;
                }
                *pixel ^= PIXEL_ON;
            }
        }
    }

    state.redraw = true;
    Ok(())
}

fn key_in(state: &State) -> bool {
    let key = usize::from(state.v[state.opcode.x()]) % KEY_COUNT;
    state.keypad[key]
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &mut State) -> Outcome {
    let pressed = key_in(state);
    skip_if(state, pressed);
    Ok(())
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &mut State) -> Outcome {
    let pressed = key_in(state);
    skip_if(state, !pressed);
    Ok(())
}

/// Vx = DT
pub fn moved(state: &mut State) -> Outcome {
    let op = state.opcode;
    state.v[op.x()] = state.delay_timer;
    Ok(())
}

/// Vx = lowest pressed key
/// Repeats this instruction next cycle if nothing is pressed
pub fn keyd(state: &mut State) -> Outcome {
    let op = state.opcode;
    match state.keypad.iter().position(|&pressed| pressed) {
        Some(key) => state.v[op.x()] = key as u8,
        None => state.pc = state.pc.wrapping_sub(0x2),
    }
    Ok(())
}

/// DT = Vx
pub fn loads(state: &mut State) -> Outcome {
    state.delay_timer = state.v[state.opcode.x()];
    Ok(())
}

/// ST = Vx
pub fn ld(state: &mut State) -> Outcome {
    state.sound_timer = state.v[state.opcode.x()];
    Ok(())
}

/// I += Vx
pub fn addi(state: &mut State) -> Outcome {
    state.i = state.i.wrapping_add(u16::from(state.v[state.opcode.x()]));
    Ok(())
}

/// I = address of the glyph for Vx
/// See constants::SPRITE_SHEET
pub fn ldspr(state: &mut State) -> Outcome {
    state.i = GLYPH_TABLE_BASE + GLYPH_SIZE * u16::from(state.v[state.opcode.x()]);
    Ok(())
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(state: &mut State) -> Outcome {
    let vx = state.v[state.opcode.x()];
    let digits = state.span(state.i, 3)?;
    state.memory[digits].copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
    Ok(())
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &mut State) -> Outcome {
    let x = state.opcode.x();
    let dest = state.span(state.i, x + 1)?;
    state.memory[dest].copy_from_slice(&state.v[..=x]);
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &mut State) -> Outcome {
    let x = state.opcode.x();
    let src = state.span(state.i, x + 1)?;
    state.v[..=x].copy_from_slice(&state.memory[src]);
    Ok(())
}
