//! Huffman coding over text.
//!
//! Codes are rendered as strings of `'0'` and `'1'`. The code table is not
//! recoverable from the bits, so [`huffman_encode`] returns it next to the
//! bitstring and [`huffman_decode`] requires it.
//!
//! Tree construction is deterministic: leaves enter the heap in ascending
//! symbol order and every node carries a sequence number that breaks weight
//! ties. The final table is canonical. Code lengths come from the tree and
//! codes are handed out in `(length, symbol)` order, so identical input
//! always yields an identical table.

use super::{Error, Result, TextCodec};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

/// Occurrence count of every symbol in a text.
pub type FrequencyTable = HashMap<char, usize>;

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node contains a character and its frequency.
    Leaf { ch: char, freq: usize },
    /// An internal node with left (`0`) and right (`1`) children and combined frequency.
    Internal {
        freq: usize,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// Heap entry ordered so that the lightest, then oldest, node pops first.
#[derive(Debug)]
struct HeapEntry {
    seq: usize,
    node: HuffmanNode,
}

impl HeapEntry {
    fn key(&self) -> (usize, usize) {
        (self.node.freq(), self.seq)
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Mapping from symbol to its code, written as a string of `'0'`/`'1'`.
///
/// Serializes as a plain map, e.g. `{"a": "0", "b": "10", "c": "11"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeTable {
    codes: BTreeMap<char, String>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `symbol`, if any.
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    /// Sets the code for `symbol`, returning the one it replaces.
    pub fn insert(&mut self, symbol: char, code: impl Into<String>) -> Option<String> {
        self.codes.insert(symbol, code.into())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates over `(symbol, code)` pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.codes.iter().map(|(&ch, code)| (ch, code.as_str()))
    }

    /// Checks that the table is a usable prefix-free code and returns its
    /// inverse, code to symbol.
    ///
    /// Fails with [`Error::CorruptCodeTable`] on an empty code, a character
    /// other than `'0'`/`'1'`, two symbols sharing a code, or a code that is a
    /// prefix of another.
    pub fn inverse(&self) -> Result<HashMap<&str, char>> {
        let mut inverse = HashMap::with_capacity(self.codes.len());
        for (&ch, code) in &self.codes {
            if code.is_empty() {
                return Err(Error::CorruptCodeTable(format!("empty code for {ch:?}")));
            }
            if let Some(bad) = code.chars().find(|&b| b != '0' && b != '1') {
                return Err(Error::CorruptCodeTable(format!(
                    "code {code:?} for {ch:?} contains {bad:?}"
                )));
            }
            if let Some(other) = inverse.insert(code.as_str(), ch) {
                return Err(Error::CorruptCodeTable(format!(
                    "code {code:?} is shared by {other:?} and {ch:?}"
                )));
            }
        }

        // In sorted order a code that prefixes others sits right before one of them.
        let mut sorted: Vec<&str> = inverse.keys().copied().collect();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|w| w[1].starts_with(w[0])) {
            return Err(Error::CorruptCodeTable(format!(
                "code {:?} is a prefix of {:?}",
                pair[0], pair[1]
            )));
        }
        Ok(inverse)
    }
}

impl From<BTreeMap<char, String>> for CodeTable {
    fn from(codes: BTreeMap<char, String>) -> Self {
        Self { codes }
    }
}

impl FromIterator<(char, String)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (char, String)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

/// Build a frequency table mapping each character in `input` to its frequency.
pub fn build_frequency_table(input: &str) -> FrequencyTable {
    let mut freq = HashMap::new();
    for ch in input.chars() {
        *freq.entry(ch).or_insert(0) += 1;
    }
    freq
}

/// Build the Huffman tree given a frequency table.
///
/// The first node popped from the heap becomes the `0` branch of the merged
/// node, the second the `1` branch. Returns `None` if the frequency table is
/// empty.
pub fn build_huffman_tree(freq_table: &FrequencyTable) -> Option<HuffmanNode> {
    let mut symbols: Vec<(char, usize)> = freq_table.iter().map(|(&ch, &f)| (ch, f)).collect();
    symbols.sort_unstable_by_key(|&(ch, _)| ch);

    let mut heap: BinaryHeap<HeapEntry> = symbols
        .into_iter()
        .enumerate()
        .map(|(seq, (ch, freq))| HeapEntry {
            seq,
            node: HuffmanNode::Leaf { ch, freq },
        })
        .collect();
    let mut next_seq = heap.len();

    loop {
        let first = heap.pop()?;
        let Some(second) = heap.pop() else {
            return Some(first.node);
        };
        let freq = first.node.freq() + second.node.freq();
        heap.push(HeapEntry {
            seq: next_seq,
            node: HuffmanNode::Internal {
                freq,
                left: Box::new(first.node),
                right: Box::new(second.node),
            },
        });
        next_seq += 1;
    }
}

/// Depth of every leaf. A lone leaf at the root gets depth 1 so that its
/// code is `"0"` rather than empty.
fn code_lengths(tree: &HuffmanNode) -> Vec<(usize, char)> {
    let mut lengths = Vec::new();
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        match node {
            HuffmanNode::Leaf { ch, .. } => lengths.push((depth.max(1), *ch)),
            HuffmanNode::Internal { left, right, .. } => {
                stack.push((left.as_ref(), depth + 1));
                stack.push((right.as_ref(), depth + 1));
            }
        }
    }
    lengths
}

/// Build the canonical code table for a Huffman tree.
///
/// Each symbol keeps the code length its leaf has in the tree. Codes are then
/// assigned in `(length, symbol)` order, each one the previous code plus one,
/// shifted left to the new length.
pub fn build_code_table(tree: &HuffmanNode) -> CodeTable {
    let mut lengths = code_lengths(tree);
    lengths.sort_unstable();

    let mut table = CodeTable::new();
    let mut code: Vec<bool> = Vec::new();
    for (len, ch) in lengths {
        if !code.is_empty() {
            increment(&mut code);
        }
        code.resize(len, false);
        table.insert(ch, code.iter().map(|&bit| if bit { '1' } else { '0' }).collect::<String>());
    }
    table
}

fn increment(code: &mut [bool]) {
    for bit in code.iter_mut().rev() {
        if *bit {
            *bit = false;
        } else {
            *bit = true;
            return;
        }
    }
}

/// Encode the input string using the provided code table.
/// Each character is replaced with its Huffman code.
pub fn encode(input: &str, code_table: &CodeTable) -> Result<String> {
    let mut bits = String::new();
    for ch in input.chars() {
        let code = code_table
            .get(ch)
            .ok_or(Error::MissingSymbol { symbol: ch })?;
        bits.push_str(code);
    }
    Ok(bits)
}

/// Decode a bitstring with the table it was encoded with.
///
/// Bits are gathered into a candidate code until it matches an entry of the
/// table; the symbol is emitted and the candidate starts over. A candidate as
/// long as the longest code that still matches nothing can never match, so
/// decoding stops there with [`Error::IncompleteStream`].
pub fn decode(encoded: &str, code_table: &CodeTable) -> Result<String> {
    let inverse = code_table.inverse()?;
    let max_len = inverse.keys().map(|code| code.len()).max().unwrap_or(0);
    let mut result = String::new();
    let mut candidate = String::new();

    for (position, bit) in encoded.chars().enumerate() {
        if bit != '0' && bit != '1' {
            return Err(Error::InvalidBit {
                found: bit,
                position,
            });
        }
        candidate.push(bit);
        if let Some(&ch) = inverse.get(candidate.as_str()) {
            result.push(ch);
            candidate.clear();
        } else if candidate.len() >= max_len {
            return Err(Error::IncompleteStream {
                trailing: candidate,
            });
        }
    }

    if !candidate.is_empty() {
        return Err(Error::IncompleteStream {
            trailing: candidate,
        });
    }
    Ok(result)
}

/// Builds the Huffman code for `input` and encodes it.
///
/// Returns the bitstring together with the code table needed to decode it.
/// Fails with [`Error::EmptyInput`] on empty input.
///
/// # Example
///
/// ```
/// use text_codecs::cs::compression::huffman::{huffman_decode, huffman_encode};
///
/// let (bits, table) = huffman_encode("aaabbc").unwrap();
/// assert_eq!(bits, "0000101011");
/// assert_eq!(table.get('a'), Some("0"));
/// assert_eq!(huffman_decode(&bits, &table).unwrap(), "aaabbc");
/// ```
pub fn huffman_encode(input: &str) -> Result<(String, CodeTable)> {
    let freq_table = build_frequency_table(input);
    let tree = build_huffman_tree(&freq_table).ok_or(Error::EmptyInput)?;
    let code_table = build_code_table(&tree);
    let encoded = encode(input, &code_table)?;
    Ok((encoded, code_table))
}

/// Decodes a bitstring produced by [`huffman_encode`] with its code table.
pub fn huffman_decode(encoded: &str, code_table: &CodeTable) -> Result<String> {
    decode(encoded, code_table)
}

/// Output of the Huffman codec: the bits and the table that reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuffmanEncoded {
    pub bits: String,
    pub code_table: CodeTable,
}

/// Huffman codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Huffman;

impl TextCodec for Huffman {
    type Encoded = HuffmanEncoded;

    fn encode(&self, text: &str) -> Result<HuffmanEncoded> {
        let (bits, code_table) = huffman_encode(text)?;
        Ok(HuffmanEncoded { bits, code_table })
    }

    fn decode(&self, encoded: &HuffmanEncoded) -> Result<String> {
        huffman_decode(&encoded.bits, &encoded.code_table)
    }
}
