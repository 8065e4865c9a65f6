//! Lossless text compression algorithms.
//!
//! This module provides three classic codecs over in-memory text:
//! - Run-length encoding (RLE)
//! - Huffman coding with a canonical code table
//! - Lempel-Ziv-Welch (LZW) over a seeded base alphabet
//!
//! Every call builds its own tables, trees and dictionaries and drops them
//! before returning, so codecs can be shared freely between threads.
//!
//! # Examples
//!
//! ```rust
//! use text_codecs::cs::compression::{Huffman, Lzw, Rle, TextCodec};
//!
//! let text = "TOBEORNOTTOBEORTOBEORNOT";
//!
//! let runs = Rle.encode("aaabccccd").unwrap();
//! assert_eq!(runs, "a3b1c4d1");
//!
//! let packed = Huffman.encode(text).unwrap();
//! assert_eq!(Huffman.decode(&packed).unwrap(), text);
//!
//! let codes = Lzw::default().encode(text).unwrap();
//! assert_eq!(Lzw::default().decode(&codes).unwrap(), text);
//! ```

pub use crate::cs::error::Error;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for text codecs.
///
/// `Encoded` is whatever the codec needs to get the text back. For Huffman
/// that includes the code table, which cannot be recovered from the bits.
pub trait TextCodec {
    /// Compressed form produced by [`TextCodec::encode`].
    type Encoded;

    /// Compress the input text
    fn encode(&self, text: &str) -> Result<Self::Encoded>;

    /// Decompress a value produced by `encode`
    fn decode(&self, encoded: &Self::Encoded) -> Result<String>;
}

pub mod huffman;
pub mod lzw;
pub mod rle;

pub use huffman::{
    build_code_table, build_frequency_table, build_huffman_tree, huffman_decode, huffman_encode,
    CodeTable, FrequencyTable, Huffman, HuffmanEncoded, HuffmanNode,
};
pub use lzw::{Dictionary, Lzw, ASCII_ALPHABET_SIZE};
pub use rle::{Rle, Run, RunTable};
