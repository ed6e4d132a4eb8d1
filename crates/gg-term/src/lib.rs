//! Terminal capability records, control sequence templating, and
//! environment-based terminal detection.
pub mod seq;
pub mod termdb;
pub mod terminfo;

pub use seq::{ParseResult, SEQ_ARGS_MAX, SEQ_COUNT, SEQ_LENGTH_MAX, SeqKind, TermQuirks};
pub use termdb::TermDb;
pub use terminfo::{TermError, TermInfo};
