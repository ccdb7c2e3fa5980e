//! Comment subsystem: language dialects and the comment block locator.

pub mod dialects;
pub mod locator;

pub use dialects::{CommentStyle, Language};
pub use locator::{locate_blocks, CommentBlock};
