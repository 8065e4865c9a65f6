//! Error type shared by the codecs and the dispatch layer.

use thiserror::Error;

/// Errors raised by the text codecs and by request dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Huffman encode, or a compress request, was given no text.
    #[error("input text is empty")]
    EmptyInput,

    /// An RLE symbol was not followed by a valid run length.
    #[error("malformed run for symbol {symbol:?} at position {position}")]
    MalformedRun { symbol: char, position: usize },

    /// RLE input contains decimal digits, which the run format cannot escape.
    #[error("symbol {symbol:?} at position {position} is a decimal digit and cannot round-trip through RLE")]
    AmbiguousDigitSymbol { symbol: char, position: usize },

    /// A supplied Huffman code table is not a valid prefix-free code.
    #[error("corrupt code table: {0}")]
    CorruptCodeTable(String),

    /// The Huffman bitstream ended in the middle of a code.
    #[error("bitstream ends with unmatched bits {trailing:?}")]
    IncompleteStream { trailing: String },

    /// A Huffman bitstream contained something other than '0' or '1'.
    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { found: char, position: usize },

    /// Huffman decode was requested without a code table.
    #[error("huffman decode requires a code table")]
    MissingCodeTable,

    /// The code table has no code for a symbol of the text being encoded.
    #[error("no code for symbol {symbol:?}")]
    MissingSymbol { symbol: char },

    /// LZW decode was given no codes.
    #[error("code stream is empty")]
    EmptyStream,

    /// An LZW code is neither in the dictionary nor the next code to be assigned.
    #[error("unexpected code {code} at position {position} (next code is {next_code})")]
    CorruptStream {
        code: usize,
        position: usize,
        next_code: usize,
    },

    /// LZW encode met a symbol outside the base alphabet.
    #[error("symbol {symbol:?} at position {position} is outside the base alphabet")]
    UnsupportedSymbol { symbol: char, position: usize },

    /// Decoding would produce more characters than allowed.
    #[error("decoded output exceeds {limit} characters")]
    OutputTooLarge { limit: usize },

    /// Algorithm name is not one of `rle`, `huffman` or `lzw`.
    #[error("invalid algorithm: {0}")]
    InvalidAlgorithm(String),

    /// Operation name is not `compress` or `decompress`.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A request lacks the payload field its algorithm and operation need.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A codec or dispatcher setting is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Status code a hosting service should answer with for this error.
    ///
    /// Every kind here is caused by the caller's input or request, so the
    /// answer is always in the 4xx range.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::OutputTooLarge { .. } => 413,
            _ => 400,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EmptyInput => "EmptyInput",
            Error::MalformedRun { .. } => "MalformedRun",
            Error::AmbiguousDigitSymbol { .. } => "AmbiguousDigitSymbol",
            Error::CorruptCodeTable(_) => "CorruptCodeTable",
            Error::IncompleteStream { .. } => "IncompleteStream",
            Error::InvalidBit { .. } => "InvalidBit",
            Error::MissingCodeTable => "MissingCodeTable",
            Error::MissingSymbol { .. } => "MissingSymbol",
            Error::EmptyStream => "EmptyStream",
            Error::CorruptStream { .. } => "CorruptStream",
            Error::UnsupportedSymbol { .. } => "UnsupportedSymbol",
            Error::OutputTooLarge { .. } => "OutputTooLarge",
            Error::InvalidAlgorithm(_) => "InvalidAlgorithm",
            Error::InvalidOperation(_) => "InvalidOperation",
            Error::MissingField(_) => "MissingField",
            Error::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

/// Result type for codec and dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;
