//! Lempel-Ziv-Welch coding over text.
//!
//! The dictionary starts with one entry per symbol of a base alphabet, code
//! equal to the symbol's scalar value, and grows by one entry per emitted code.
//! Both sides rebuild it from scratch on every call, so it is never sent.
//!
//! Code width is unbounded and the dictionary is never reset.

use super::{Error, Result, TextCodec};
use std::collections::HashMap;

/// Size of the 7-bit ASCII base alphabet.
pub const ASCII_ALPHABET_SIZE: usize = 128;

/// Largest alphabet whose every code is a valid `char` (everything below the
/// surrogate range).
pub const MAX_ALPHABET_SIZE: usize = 0xD800;

/// Phrase dictionary used while encoding.
///
/// A phrase longer than one symbol is stored as the code of the phrase without
/// its last symbol plus that symbol, which names the same string as a
/// string-keyed map would without copying it.
#[derive(Debug, Clone)]
pub struct Dictionary {
    alphabet_size: usize,
    phrases: HashMap<(usize, char), usize>,
    next_code: usize,
}

impl Dictionary {
    /// Creates a dictionary holding only the base alphabet.
    pub fn new(alphabet_size: usize) -> Self {
        Self {
            alphabet_size,
            phrases: HashMap::new(),
            next_code: alphabet_size,
        }
    }

    /// Code the next inserted phrase will receive.
    pub fn next_code(&self) -> usize {
        self.next_code
    }

    /// Number of codes assigned so far, alphabet included.
    pub fn len(&self) -> usize {
        self.next_code
    }

    pub fn is_empty(&self) -> bool {
        self.next_code == 0
    }

    /// Code of a single symbol, if it belongs to the base alphabet.
    pub fn symbol_code(&self, symbol: char) -> Option<usize> {
        let code = symbol as usize;
        (code < self.alphabet_size).then_some(code)
    }

    /// Code of the phrase `prefix` + `symbol`, if present.
    pub fn lookup(&self, prefix: usize, symbol: char) -> Option<usize> {
        self.phrases.get(&(prefix, symbol)).copied()
    }

    /// Adds the phrase `prefix` + `symbol` and returns its code.
    pub fn insert(&mut self, prefix: usize, symbol: char) -> usize {
        let code = self.next_code;
        self.phrases.insert((prefix, symbol), code);
        self.next_code += 1;
        code
    }
}

/// Compresses text with the 7-bit ASCII base alphabet.
///
/// Returns an empty vector for empty input. Fails with
/// [`Error::UnsupportedSymbol`] on a non-ASCII symbol.
///
/// # Example
///
/// ```
/// use text_codecs::cs::compression::lzw::compress;
///
/// let codes = compress("TOBEORNOT").unwrap();
/// assert_eq!(codes, vec![84, 79, 66, 69, 79, 82, 78, 79, 84]);
/// ```
pub fn compress(input: &str) -> Result<Vec<usize>> {
    compress_with_alphabet(input, ASCII_ALPHABET_SIZE)
}

/// Compresses text with a base alphabet of the first `alphabet_size` scalar values.
pub fn compress_with_alphabet(input: &str, alphabet_size: usize) -> Result<Vec<usize>> {
    check_alphabet_size(alphabet_size)?;
    let mut dict = Dictionary::new(alphabet_size);
    let mut result = Vec::new();
    // Code of the longest phrase matched so far.
    let mut current: Option<usize> = None;

    for (position, ch) in input.char_indices() {
        let symbol = dict
            .symbol_code(ch)
            .ok_or(Error::UnsupportedSymbol {
                symbol: ch,
                position,
            })?;
        current = match current {
            None => Some(symbol),
            Some(prefix) => match dict.lookup(prefix, ch) {
                Some(code) => Some(code),
                None => {
                    result.push(prefix);
                    dict.insert(prefix, ch);
                    Some(symbol)
                }
            },
        };
    }

    if let Some(code) = current {
        result.push(code);
    }
    Ok(result)
}

/// Decompresses codes produced with the 7-bit ASCII base alphabet.
///
/// The slice is only read. Fails with [`Error::EmptyStream`] on no codes and
/// [`Error::CorruptStream`] on a code that is neither known nor the next one
/// to be assigned.
///
/// # Example
///
/// ```
/// use text_codecs::cs::compression::lzw::{compress, decompress};
///
/// let codes = compress("abababab").unwrap();
/// assert_eq!(decompress(&codes).unwrap(), "abababab");
/// ```
pub fn decompress(codes: &[usize]) -> Result<String> {
    decompress_with_alphabet(codes, ASCII_ALPHABET_SIZE, None)
}

/// Decompresses codes with a base alphabet of `alphabet_size` scalar values,
/// failing with [`Error::OutputTooLarge`] once the output would pass `limit`
/// characters.
pub fn decompress_with_alphabet(
    codes: &[usize],
    alphabet_size: usize,
    limit: Option<usize>,
) -> Result<String> {
    check_alphabet_size(alphabet_size)?;
    let (&first, rest) = codes.split_first().ok_or(Error::EmptyStream)?;

    // Code to phrase, seeded the same way the encoder's dictionary is.
    let mut phrases: Vec<String> = (0..alphabet_size)
        .filter_map(|code| u32::try_from(code).ok().and_then(char::from_u32))
        .map(String::from)
        .collect();
    let corrupt = |code, position, next_code| Error::CorruptStream {
        code,
        position,
        next_code,
    };

    let mut previous = phrases
        .get(first)
        .cloned()
        .ok_or_else(|| corrupt(first, 0, phrases.len()))?;
    let mut result = previous.clone();
    let mut produced = previous.chars().count();
    check_limit(produced, limit)?;

    for (offset, &code) in rest.iter().enumerate() {
        let position = offset + 1;
        let next_code = phrases.len();
        let entry = match phrases.get(code) {
            Some(phrase) => phrase.clone(),
            // The encoder defined this phrase in the same step it emitted it.
            None if code == next_code => {
                let head =
                    first_symbol(&previous).ok_or_else(|| corrupt(code, position, next_code))?;
                let mut phrase = previous.clone();
                phrase.push(head);
                phrase
            }
            None => return Err(corrupt(code, position, next_code)),
        };

        produced += entry.chars().count();
        check_limit(produced, limit)?;
        result.push_str(&entry);

        let head = first_symbol(&entry).ok_or_else(|| corrupt(code, position, next_code))?;
        previous.push(head);
        phrases.push(previous);
        previous = entry;
    }
    Ok(result)
}

/// Sizes in `1..=MAX_ALPHABET_SIZE` seed both sides with the same codes.
fn check_alphabet_size(alphabet_size: usize) -> Result<()> {
    if !(1..=MAX_ALPHABET_SIZE).contains(&alphabet_size) {
        return Err(Error::InvalidConfig(format!(
            "LZW alphabet size must be between 1 and {MAX_ALPHABET_SIZE}, got {alphabet_size}"
        )));
    }
    Ok(())
}

fn first_symbol(phrase: &str) -> Option<char> {
    phrase.chars().next()
}

fn check_limit(produced: usize, limit: Option<usize>) -> Result<()> {
    match limit {
        Some(limit) if produced > limit => Err(Error::OutputTooLarge { limit }),
        _ => Ok(()),
    }
}

/// LZW codec over a configurable base alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lzw {
    alphabet_size: usize,
    max_output_len: Option<usize>,
}

impl Default for Lzw {
    fn default() -> Self {
        Self {
            alphabet_size: ASCII_ALPHABET_SIZE,
            max_output_len: None,
        }
    }
}

impl Lzw {
    /// Codec seeded with the 7-bit ASCII alphabet.
    pub fn ascii() -> Self {
        Self::default()
    }

    /// Codec seeded with the first `alphabet_size` scalar values.
    ///
    /// Accepts `1..=MAX_ALPHABET_SIZE`; 256 covers Latin-1.
    pub fn with_alphabet_size(alphabet_size: usize) -> Result<Self> {
        check_alphabet_size(alphabet_size)?;
        Ok(Self {
            alphabet_size,
            max_output_len: None,
        })
    }

    /// Caps the number of characters a decode may produce.
    pub fn with_output_limit(mut self, limit: Option<usize>) -> Self {
        self.max_output_len = limit;
        self
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }
}

impl TextCodec for Lzw {
    type Encoded = Vec<usize>;

    fn encode(&self, text: &str) -> Result<Vec<usize>> {
        compress_with_alphabet(text, self.alphabet_size)
    }

    fn decode(&self, encoded: &Vec<usize>) -> Result<String> {
        decompress_with_alphabet(encoded, self.alphabet_size, self.max_output_len)
    }
}
