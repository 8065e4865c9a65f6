//! Run-length, Huffman and LZW codecs for text, plus the dispatch layer that
//! picks a codec by name for a hosting service or command-line tool.

pub mod cs;
pub mod dispatch;

pub use cs::compression;
pub use cs::error::{Error, Result};
