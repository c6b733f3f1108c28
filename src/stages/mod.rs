//! Built-in collaborator stages shipped with the standalone binary.

pub mod base;
pub mod text;

pub use base::StageBase;
pub use text::{LineFilter, Printer, TextReader, TextWriter};
