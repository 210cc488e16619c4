//! Bitcoin Script: binary/ASM encoding, template classifiers, and the
//! stack-machine interpreter (spec §4.6, §4.7).

pub mod asm;
pub mod chunk;
pub mod classify;
pub mod interpreter;
pub mod opcode;

pub use chunk::{Chunk, Script};
pub use interpreter::{Interpreter, SighashFn};
pub use opcode::Opcode;
