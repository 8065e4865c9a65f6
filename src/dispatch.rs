//! Selects a codec by algorithm and operation name and shapes its result.
//!
//! This is the seam a hosting service or command-line tool talks to. Requests
//! and responses use the field names of the JSON envelope callers already
//! know (`encoded_text`, `huffman_dict`, `compressed_data`).
//!
//! Every request builds its own codec state, so one [`Dispatcher`] can serve
//! any number of threads at once.

use crate::cs::compression::{huffman, rle, CodeTable, Huffman, HuffmanEncoded, Lzw, TextCodec};
use crate::cs::error::{Error, Result};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Codec selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Rle,
    Huffman,
    Lzw,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Rle, Algorithm::Huffman, Algorithm::Lzw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Rle => "rle",
            Algorithm::Huffman => "huffman",
            Algorithm::Lzw => "lzw",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rle" => Ok(Algorithm::Rle),
            "huffman" => Ok(Algorithm::Huffman),
            "lzw" => Ok(Algorithm::Lzw),
            _ => Err(Error::InvalidAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Compress,
    Decompress,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Compress => "compress",
            Operation::Decompress => "decompress",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compress" => Ok(Operation::Compress),
            "decompress" => Ok(Operation::Decompress),
            _ => Err(Error::InvalidOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compress or decompress request.
///
/// Names stay as strings so that unknown ones reach [`Dispatcher::handle`] and
/// come back as [`Error::InvalidAlgorithm`] or [`Error::InvalidOperation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub algorithm: String,
    pub operation: String,
    /// Plain text to compress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// RLE run text or Huffman bitstring to decompress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huffman_dict: Option<CodeTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_data: Option<Vec<usize>>,
}

impl Request {
    pub fn compress(algorithm: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            operation: Operation::Compress.to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Request that decompresses the payload of an earlier compress response.
    pub fn decompress(algorithm: impl Into<String>, compressed: Response) -> Self {
        Self {
            algorithm: algorithm.into(),
            operation: Operation::Decompress.to_string(),
            text: None,
            encoded_text: compressed.encoded_text,
            huffman_dict: compressed.huffman_dict,
            compressed_data: compressed.compressed_data,
        }
    }
}

/// Result envelope. Only the fields the algorithm and operation produce are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huffman_dict: Option<CodeTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed_data: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_text: Option<String>,
}

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Base alphabet size for LZW, 128 for 7-bit ASCII.
    pub lzw_alphabet_size: usize,
    /// Most characters a decompress request may produce.
    pub max_output_len: Option<usize>,
    /// Refuse RLE compression of text containing ASCII digits.
    pub reject_ambiguous_rle: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            lzw_alphabet_size: crate::cs::compression::ASCII_ALPHABET_SIZE,
            max_output_len: Some(16 * 1024 * 1024),
            reject_ambiguous_rle: true,
        }
    }
}

/// Routes requests to the codecs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
    lzw: Lzw,
}

impl Default for Dispatcher {
    fn default() -> Self {
        let config = DispatchConfig::default();
        Self {
            config,
            lzw: Lzw::ascii().with_output_limit(config.max_output_len),
        }
    }
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Result<Self> {
        let lzw =
            Lzw::with_alphabet_size(config.lzw_alphabet_size)?.with_output_limit(config.max_output_len);
        Ok(Self { config, lzw })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Parses the names in `request` and runs the selected codec.
    ///
    /// # Example
    ///
    /// ```
    /// use text_codecs::dispatch::{Dispatcher, Request};
    ///
    /// let dispatcher = Dispatcher::default();
    /// let packed = dispatcher.handle(&Request::compress("huffman", "aaabbc")).unwrap();
    /// assert_eq!(packed.encoded_text.as_deref(), Some("0000101011"));
    ///
    /// let unpacked = dispatcher.handle(&Request::decompress("huffman", packed)).unwrap();
    /// assert_eq!(unpacked.decoded_text.as_deref(), Some("aaabbc"));
    /// ```
    pub fn handle(&self, request: &Request) -> Result<Response> {
        let result = self.route(request);
        if let Err(err) = &result {
            warn!(
                "{} request for {:?} failed with {}: {}",
                request.operation,
                request.algorithm,
                err.kind(),
                err
            );
        }
        result
    }

    /// Handles many requests in parallel. Results keep the order of `requests`.
    pub fn handle_batch(&self, requests: &[Request]) -> Vec<Result<Response>> {
        debug!("handling batch of {} requests", requests.len());
        requests.par_iter().map(|request| self.handle(request)).collect()
    }

    fn route(&self, request: &Request) -> Result<Response> {
        let algorithm: Algorithm = request.algorithm.parse()?;
        let operation: Operation = request.operation.parse()?;
        match operation {
            Operation::Compress => self.compress(algorithm, request.text.as_deref()),
            Operation::Decompress => self.decompress(algorithm, request),
        }
    }

    /// Compresses `text` with `algorithm`. Absent or empty text is an
    /// [`Error::EmptyInput`] for every algorithm.
    pub fn compress(&self, algorithm: Algorithm, text: Option<&str>) -> Result<Response> {
        let text = text.filter(|t| !t.is_empty()).ok_or(Error::EmptyInput)?;
        debug!("compressing {} chars with {}", text.chars().count(), algorithm);

        let response = match algorithm {
            Algorithm::Rle => {
                if self.config.reject_ambiguous_rle {
                    rle::check_digit_free(text)?;
                }
                Response {
                    encoded_text: Some(rle::encode(text)),
                    ..Default::default()
                }
            }
            Algorithm::Huffman => {
                let HuffmanEncoded { bits, code_table } = Huffman.encode(text)?;
                Response {
                    encoded_text: Some(bits),
                    huffman_dict: Some(code_table),
                    ..Default::default()
                }
            }
            Algorithm::Lzw => Response {
                compressed_data: Some(self.lzw.encode(text)?),
                ..Default::default()
            },
        };
        Ok(response)
    }

    /// Decompresses the payload fields of `request` with `algorithm`.
    pub fn decompress(&self, algorithm: Algorithm, request: &Request) -> Result<Response> {
        let encoded_text = || {
            request
                .encoded_text
                .as_deref()
                .ok_or(Error::MissingField("encoded_text"))
        };

        let decoded = match algorithm {
            Algorithm::Rle => {
                let runs = encoded_text()?;
                debug!("decompressing {} run chars with rle", runs.len());
                match self.config.max_output_len {
                    Some(limit) => rle::decode_bounded(runs, limit)?,
                    None => rle::decode(runs)?,
                }
            }
            Algorithm::Huffman => {
                let bits = encoded_text()?;
                let code_table = request
                    .huffman_dict
                    .as_ref()
                    .ok_or(Error::MissingCodeTable)?;
                debug!(
                    "decompressing {} bits with huffman ({} codes)",
                    bits.len(),
                    code_table.len()
                );
                huffman::huffman_decode(bits, code_table)?
            }
            Algorithm::Lzw => {
                let codes = request
                    .compressed_data
                    .as_ref()
                    .ok_or(Error::MissingField("compressed_data"))?;
                debug!("decompressing {} codes with lzw", codes.len());
                self.lzw.decode(codes)?
            }
        };

        Ok(Response {
            decoded_text: Some(decoded),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn round_trip(dispatcher: &Dispatcher, algorithm: Algorithm, text: &str) -> Result<String> {
        let packed = dispatcher.handle(&Request::compress(algorithm.as_str(), text))?;
        let unpacked = dispatcher.handle(&Request::decompress(algorithm.as_str(), packed))?;
        unpacked.decoded_text.ok_or(Error::MissingField("decoded_text"))
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("RLE".parse::<Algorithm>(), Ok(Algorithm::Rle));
        assert_eq!(" Huffman ".parse::<Algorithm>(), Ok(Algorithm::Huffman));
        assert_eq!("lzw".parse::<Algorithm>(), Ok(Algorithm::Lzw));
        assert_eq!(
            "gzip".parse::<Algorithm>(),
            Err(Error::InvalidAlgorithm("gzip".to_string()))
        );
        assert_eq!("Decompress".parse::<Operation>(), Ok(Operation::Decompress));
        assert_eq!(
            "inflate".parse::<Operation>(),
            Err(Error::InvalidOperation("inflate".to_string()))
        );
    }

    #[test]
    fn test_unknown_names_are_reported() {
        let dispatcher = Dispatcher::default();
        let bad_algorithm = Request::compress("zip", "abc");
        assert_eq!(
            dispatcher.handle(&bad_algorithm),
            Err(Error::InvalidAlgorithm("zip".to_string()))
        );

        let bad_operation = Request {
            operation: "explode".to_string(),
            ..Request::compress("rle", "abc")
        };
        assert_eq!(
            dispatcher.handle(&bad_operation),
            Err(Error::InvalidOperation("explode".to_string()))
        );
    }

    #[test]
    fn test_round_trip_every_algorithm() {
        let dispatcher = Dispatcher::default();
        for algorithm in Algorithm::ALL {
            let text = "TOBEORNOTTOBEORTOBEORNOT";
            assert_eq!(round_trip(&dispatcher, algorithm, text).unwrap(), text);
        }
    }

    #[test]
    fn test_compress_envelopes() {
        let dispatcher = Dispatcher::default();

        let rle = dispatcher.handle(&Request::compress("rle", "aaabccccd")).unwrap();
        assert_eq!(
            serde_json::to_value(&rle).unwrap(),
            serde_json::json!({ "encoded_text": "a3b1c4d1" })
        );

        let huffman = dispatcher.handle(&Request::compress("huffman", "aaabbc")).unwrap();
        assert_eq!(
            serde_json::to_value(&huffman).unwrap(),
            serde_json::json!({
                "encoded_text": "0000101011",
                "huffman_dict": { "a": "0", "b": "10", "c": "11" }
            })
        );

        let lzw = dispatcher.handle(&Request::compress("lzw", "abababab")).unwrap();
        assert_eq!(
            serde_json::to_value(&lzw).unwrap(),
            serde_json::json!({ "compressed_data": [97, 98, 128, 130, 98] })
        );
    }

    #[test]
    fn test_request_from_json() {
        let request: Request = serde_json::from_str(
            r#"{
                "algorithm": "huffman",
                "operation": "decompress",
                "encoded_text": "0000101011",
                "huffman_dict": { "a": "0", "b": "10", "c": "11" }
            }"#,
        )
        .unwrap();
        let response = Dispatcher::default().handle(&request).unwrap();
        assert_eq!(response.decoded_text.as_deref(), Some("aaabbc"));
    }

    #[test]
    fn test_empty_text() {
        let dispatcher = Dispatcher::default();
        for algorithm in Algorithm::ALL {
            assert_eq!(
                dispatcher.handle(&Request::compress(algorithm.as_str(), "")),
                Err(Error::EmptyInput)
            );
            assert_eq!(dispatcher.compress(algorithm, None), Err(Error::EmptyInput));
        }
    }

    #[test]
    fn test_missing_payloads() {
        let dispatcher = Dispatcher::default();
        let huffman = Request {
            encoded_text: Some("0101".to_string()),
            ..Request::decompress("huffman", Response::default())
        };
        assert_eq!(dispatcher.handle(&huffman), Err(Error::MissingCodeTable));

        let rle = Request::decompress("rle", Response::default());
        assert_eq!(
            dispatcher.handle(&rle),
            Err(Error::MissingField("encoded_text"))
        );

        let lzw = Request::decompress("lzw", Response::default());
        assert_eq!(
            dispatcher.handle(&lzw),
            Err(Error::MissingField("compressed_data"))
        );
    }

    #[test]
    fn test_rle_digits() {
        let strict = Dispatcher::default();
        assert!(matches!(
            strict.handle(&Request::compress("rle", "room 101")),
            Err(Error::AmbiguousDigitSymbol { symbol: '1', .. })
        ));

        let lenient = Dispatcher::new(DispatchConfig {
            reject_ambiguous_rle: false,
            ..Default::default()
        })
        .unwrap();
        let packed = lenient.handle(&Request::compress("rle", "a1")).unwrap();
        assert_eq!(packed.encoded_text.as_deref(), Some("a111"));
    }

    #[test]
    fn test_output_limit() {
        let dispatcher = Dispatcher::new(DispatchConfig {
            max_output_len: Some(8),
            ..Default::default()
        })
        .unwrap();
        let rle = Request {
            encoded_text: Some("a9".to_string()),
            ..Request::decompress("rle", Response::default())
        };
        assert_eq!(
            dispatcher.handle(&rle),
            Err(Error::OutputTooLarge { limit: 8 })
        );
        assert!(matches!(
            round_trip(&dispatcher, Algorithm::Lzw, "aaaaaaaaaaaa"),
            Err(Error::OutputTooLarge { limit: 8 })
        ));
    }

    #[test]
    fn test_invalid_config() {
        let config = DispatchConfig {
            lzw_alphabet_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Dispatcher::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_corrupt_lzw_request() {
        let request = Request {
            compressed_data: Some(vec![84, 79, 500]),
            ..Request::decompress("lzw", Response::default())
        };
        assert!(matches!(
            Dispatcher::default().handle(&request),
            Err(Error::CorruptStream { code: 500, .. })
        ));
    }

    #[test]
    fn test_concurrent_calls_are_isolated() {
        let dispatcher = Dispatcher::default();
        let inputs = [
            "TOBEORNOTTOBEORTOBEORNOT",
            "abababababababab",
            "she sells sea shells by the sea shore",
            "aaaaaaaaaaaaaaaaaaaaaaaab",
        ];
        let mut requests: Vec<Request> = Algorithm::ALL
            .iter()
            .flat_map(|algorithm| {
                inputs
                    .iter()
                    .map(move |text| Request::compress(algorithm.as_str(), *text))
            })
            .collect();
        // Decompress requests share the run with the compress requests.
        let decompress: Vec<Request> = requests
            .iter()
            .map(|r| {
                let packed = dispatcher.handle(r).unwrap();
                Request::decompress(r.algorithm.clone(), packed)
            })
            .collect();
        assert_eq!(decompress.len(), Algorithm::ALL.len() * inputs.len());
        requests.extend(decompress);
        let baseline: Vec<Result<Response>> =
            requests.iter().map(|r| dispatcher.handle(r)).collect();
        for (result, text) in baseline[requests.len() / 2..]
            .iter()
            .zip(inputs.iter().cycle())
        {
            assert_eq!(result.as_ref().unwrap().decoded_text.as_deref(), Some(*text));
        }

        // Same requests on threads, forwards and backwards at once.
        thread::scope(|scope| {
            let forward = scope.spawn(|| {
                (0..20)
                    .map(|_| requests.iter().map(|r| dispatcher.handle(r)).collect::<Vec<_>>())
                    .collect::<Vec<_>>()
            });
            let backward = scope.spawn(|| {
                (0..20)
                    .map(|_| {
                        let mut out: Vec<_> =
                            requests.iter().rev().map(|r| dispatcher.handle(r)).collect();
                        out.reverse();
                        out
                    })
                    .collect::<Vec<_>>()
            });
            for run in forward.join().unwrap() {
                assert_eq!(run, baseline);
            }
            for run in backward.join().unwrap() {
                assert_eq!(run, baseline);
            }
        });

        // Through the rayon batch path, in both orders.
        assert_eq!(dispatcher.handle_batch(&requests), baseline);
        let reversed: Vec<Request> = requests.iter().rev().cloned().collect();
        let mut batch = dispatcher.handle_batch(&reversed);
        batch.reverse();
        assert_eq!(batch, baseline);
    }

    #[test]
    fn test_batch_decompress() {
        let dispatcher = Dispatcher::default();
        let text = "it was the best of times it was the worst of times";
        let requests: Vec<Request> = Algorithm::ALL
            .iter()
            .map(|algorithm| {
                let packed = dispatcher
                    .handle(&Request::compress(algorithm.as_str(), text))
                    .unwrap();
                Request::decompress(algorithm.as_str(), packed)
            })
            .collect();
        for result in dispatcher.handle_batch(&requests) {
            assert_eq!(result.unwrap().decoded_text.as_deref(), Some(text));
        }
    }
}
