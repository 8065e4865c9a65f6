pub mod compression;
pub mod error;

// Re-export the codecs
pub use compression::{Huffman, Lzw, Rle, TextCodec};
