//! Run-length encoding over text.
//!
//! A run is serialized as its symbol followed by the decimal digits of its
//! length, with no separators: `"aaabccccd"` becomes `"a3b1c4d1"`.
//!
//! # Limitation
//!
//! Digits are not escaped. Text that contains ASCII digits produces a stream
//! in which literal digit symbols run into the counts, so it cannot be decoded
//! back. [`check_digit_free`] finds the offending symbol before encoding.

use super::{Error, Result, TextCodec};

/// A maximal run of one repeated symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub symbol: char,
    /// Always at least 1.
    pub length: usize,
}

/// Runs in input order. Expanding every run in turn gives back the input.
pub type RunTable = Vec<Run>;

/// Split `input` into maximal runs of identical symbols.
pub fn runs(input: &str) -> RunTable {
    let mut table: RunTable = Vec::new();
    for ch in input.chars() {
        match table.last_mut() {
            Some(run) if run.symbol == ch => run.length += 1,
            _ => table.push(Run {
                symbol: ch,
                length: 1,
            }),
        }
    }
    table
}

/// Encode `input` as `symbol count` pairs.
///
/// Returns an empty string for empty input.
///
/// # Example
///
/// ```
/// use text_codecs::cs::compression::rle::encode;
///
/// assert_eq!(encode("aaabccccd"), "a3b1c4d1");
/// assert_eq!(encode(""), "");
/// ```
pub fn encode(input: &str) -> String {
    runs(input)
        .iter()
        .map(|run| format!("{}{}", run.symbol, run.length))
        .collect()
}

/// Parse a run-encoded string back into its runs.
///
/// Each run is one symbol followed by one or more ASCII digits. A symbol with
/// no digits after it, a zero count, or a count too large for `usize` is a
/// [`Error::MalformedRun`].
pub fn parse_runs(encoded: &str) -> Result<RunTable> {
    let mut table = Vec::new();
    let mut chars = encoded.char_indices().peekable();

    while let Some((position, symbol)) = chars.next() {
        let malformed = Error::MalformedRun { symbol, position };
        let mut length: usize = 0;
        let mut digits = 0;
        while let Some(&(_, digit)) = chars.peek() {
            let Some(value) = digit.to_digit(10) else {
                break;
            };
            length = length
                .checked_mul(10)
                .and_then(|n| n.checked_add(value as usize))
                .ok_or_else(|| malformed.clone())?;
            digits += 1;
            chars.next();
        }
        if digits == 0 || length == 0 {
            return Err(malformed);
        }
        table.push(Run { symbol, length });
    }
    Ok(table)
}

/// Decode a run-encoded string.
///
/// # Example
///
/// ```
/// use text_codecs::cs::compression::rle::decode;
///
/// assert_eq!(decode("a3b1c12").unwrap(), "aaabcccccccccccc");
/// assert!(decode("a3b").is_err());
/// ```
pub fn decode(encoded: &str) -> Result<String> {
    let table = parse_runs(encoded)?;
    Ok(expand(&table))
}

/// Decode a run-encoded string, refusing to produce more than `limit` symbols.
///
/// The limit is checked against the parsed run lengths before anything is
/// allocated, so a tiny input such as `"a99999999999"` fails fast.
pub fn decode_bounded(encoded: &str, limit: usize) -> Result<String> {
    let table = parse_runs(encoded)?;
    let total = table
        .iter()
        .try_fold(0usize, |acc, run| acc.checked_add(run.length))
        .filter(|&total| total <= limit);
    if total.is_none() {
        return Err(Error::OutputTooLarge { limit });
    }
    Ok(expand(&table))
}

fn expand(table: &[Run]) -> String {
    let mut output = String::new();
    for run in table {
        output.extend(std::iter::repeat(run.symbol).take(run.length));
    }
    output
}

/// Fail with [`Error::AmbiguousDigitSymbol`] on the first ASCII digit in
/// `input`, since its encoding could not be decoded.
pub fn check_digit_free(input: &str) -> Result<()> {
    match input.char_indices().find(|(_, ch)| ch.is_ascii_digit()) {
        Some((position, symbol)) => Err(Error::AmbiguousDigitSymbol { symbol, position }),
        None => Ok(()),
    }
}

/// Run-length codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rle;

impl TextCodec for Rle {
    type Encoded = String;

    fn encode(&self, text: &str) -> Result<String> {
        Ok(encode(text))
    }

    fn decode(&self, encoded: &String) -> Result<String> {
        decode(encoded)
    }
}
