//! Wire protocol spoken by the instruments: ASCII lines of the form
//! `<note>,<duration_ms>\n`.

mod decoder;
mod note;

pub use decoder::{DecodeError, decode, decode_with};
pub use note::{Dialect, NoteToken};
