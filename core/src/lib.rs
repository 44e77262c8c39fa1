pub use chip8::Chip8;
pub use error::Fault;
pub use opcode::Opcode;
pub use state::{FrameBuffer, State};

mod chip8;
pub mod constants;
mod dispatch;
mod error;
mod opcode;
mod operations;
pub mod state;
