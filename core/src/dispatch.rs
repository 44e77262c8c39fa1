//! Opcode dispatch.
//!
//! The leading nibble of an opcode indexes `PRIMARY`. Families that share a
//! leading nibble are redirected to a second table keyed on their low nibble
//! (`0x0`, `0x8`, `0xE`) or low byte (`0xF`). Holes in any table are `noop`.

use crate::operations::*;
use crate::state::State;

/// Executes the latched opcode against the state
pub type Handler = fn(&mut State) -> Outcome;

const PRIMARY: [Handler; 16] = [
    family_0, jump, call, ske, skne, skre, load, add, family_8, skrne, loadi, jumpi, rand, draw,
    family_e, family_f,
];

/// `00E_` keyed on `[___n]`
const FAMILY_0: [Handler; 16] = {
    let mut table = [noop as Handler; 16];
    table[0x0] = clr;
    table[0xE] = rts;
    table
};

/// `8xy_` keyed on `[___n]`
const FAMILY_8: [Handler; 16] = {
    let mut table = [noop as Handler; 16];
    table[0x0] = mv;
    table[0x1] = or;
    table[0x2] = and;
    table[0x3] = xor;
    table[0x4] = addr;
    table[0x5] = sub;
    table[0x6] = shr;
    table[0x7] = subn;
    table[0xE] = shl;
    table
};

/// `Ex__` keyed on `[___n]`
const FAMILY_E: [Handler; 16] = {
    let mut table = [noop as Handler; 16];
    table[0x1] = skup;
    table[0xE] = skpr;
    table
};

/// `Fx__` keyed on `[__kk]`
const FAMILY_F: [Handler; 0x66] = {
    let mut table = [noop as Handler; 0x66];
    table[0x07] = moved;
    table[0x0A] = keyd;
    table[0x15] = loads;
    table[0x18] = ld;
    table[0x1E] = addi;
    table[0x29] = ldspr;
    table[0x33] = bcd;
    table[0x55] = stor;
    table[0x65] = read;
    table
};

/// Runs the handler for `state.opcode`
pub fn dispatch(state: &mut State) -> Outcome {
    PRIMARY[state.opcode.family()](state)
}

fn family_0(state: &mut State) -> Outcome {
    FAMILY_0[usize::from(state.opcode.n())](state)
}

fn family_8(state: &mut State) -> Outcome {
    FAMILY_8[usize::from(state.opcode.n())](state)
}

fn family_e(state: &mut State) -> Outcome {
    FAMILY_E[usize::from(state.opcode.n())](state)
}

fn family_f(state: &mut State) -> Outcome {
    let handler = FAMILY_F
        .get(usize::from(state.opcode.kk()))
        .copied()
        .unwrap_or(noop);
    handler(state)
}
