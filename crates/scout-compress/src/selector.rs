//! Encoding selection and tagged payload framing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::dictionary::{self, DictionaryDocument, ValueRules};
use crate::schema::{self, SchemaDocument};
use crate::{COMPRESSION_THRESHOLD_BYTES, CompressError, CompressionConfig, gzip};

/// Dictionary variants roughly double nesting depth; keep the encoded document
/// under `serde_json`'s recursion limit.
const MAX_DICTIONARY_DEPTH: usize = 60;

/// Whether a payload of `serialized_len` JSON bytes should be compressed at the
/// default threshold.
#[must_use]
pub const fn should_use_compression(serialized_len: usize) -> bool {
    serialized_len > COMPRESSION_THRESHOLD_BYTES
}

/// The encoding applied to a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingVariant {
    /// Uncompressed JSON.
    Raw,
    /// Gzip of the JSON.
    Gzip,
    /// Key dictionary, then gzip.
    KeyDictionary,
    /// Key and value dictionary, then gzip.
    KeyValueDictionary,
    /// Schema-aware scouting codec, then gzip.
    SchemaAware,
}

impl EncodingVariant {
    /// Every compressed variant in evaluation order.
    pub const COMPRESSED: [Self; 4] = [
        Self::Gzip,
        Self::KeyDictionary,
        Self::KeyValueDictionary,
        Self::SchemaAware,
    ];

    /// One-byte wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::Gzip => 1,
            Self::KeyDictionary => 2,
            Self::KeyValueDictionary => 3,
            Self::SchemaAware => 4,
        }
    }

    /// Parse a wire tag.
    pub const fn from_tag(tag: u8) -> Result<Self, CompressError> {
        match tag {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Gzip),
            2 => Ok(Self::KeyDictionary),
            3 => Ok(Self::KeyValueDictionary),
            4 => Ok(Self::SchemaAware),
            other => Err(CompressError::UnknownVariant(other)),
        }
    }

    /// Stable name used in logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Gzip => "gzip",
            Self::KeyDictionary => "key-dictionary",
            Self::KeyValueDictionary => "key-value-dictionary",
            Self::SchemaAware => "schema-aware",
        }
    }
}

impl fmt::Display for EncodingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An encoded body together with the variant that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Variant used.
    pub variant: EncodingVariant,
    /// Encoded bytes, without the tag.
    pub body: Vec<u8>,
}

impl EncodedPayload {
    /// Frame as `[tag] || body`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 1);
        out.push(self.variant.tag());
        out.extend_from_slice(&self.body);
        out
    }

    /// Parse a `[tag] || body` frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompressError> {
        let (&tag, body) = bytes.split_first().ok_or(CompressError::EmptyPayload)?;
        Ok(Self {
            variant: EncodingVariant::from_tag(tag)?,
            body: body.to_vec(),
        })
    }

    /// Size of the framed payload.
    #[must_use]
    pub fn framed_len(&self) -> usize {
        self.body.len() + 1
    }
}

/// Size of one variant's encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSize {
    /// Variant measured.
    pub variant: EncodingVariant,
    /// Body size in bytes.
    pub bytes: usize,
}

/// Sizes of every applicable compressed variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionReport {
    /// Serialized JSON size.
    pub raw_bytes: usize,
    /// Applicable variants in evaluation order.
    pub variants: Vec<VariantSize>,
    /// Smallest variant (earliest wins ties).
    pub best: EncodingVariant,
}

impl CompressionReport {
    /// Size of a variant, if it was applicable.
    #[must_use]
    pub fn size_of(&self, variant: EncodingVariant) -> Option<usize> {
        self.variants
            .iter()
            .find(|v| v.variant == variant)
            .map(|v| v.bytes)
    }

    /// Size of the winning variant.
    #[must_use]
    pub fn best_bytes(&self) -> usize {
        self.size_of(self.best).unwrap_or(self.raw_bytes)
    }
}

/// Picks the smallest encoding for a JSON value and inverts it.
#[derive(Clone, Debug, Default)]
pub struct CompressionSelector {
    config: CompressionConfig,
}

impl CompressionSelector {
    /// Create a selector with the given configuration.
    #[must_use]
    pub const fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Whether `serialized_len` crosses the configured threshold.
    #[must_use]
    pub const fn should_use_compression(&self, serialized_len: usize) -> bool {
        serialized_len > self.config.threshold_bytes
    }

    /// Encode a serializable dataset.
    pub fn encode_serializable<T: Serialize>(
        &self,
        dataset: &T,
    ) -> Result<EncodedPayload, CompressError> {
        self.encode(&serde_json::to_value(dataset)?)
    }

    /// Encode `value`: raw below the threshold, otherwise the smallest
    /// applicable compressed variant.
    pub fn encode(&self, value: &Value) -> Result<EncodedPayload, CompressError> {
        let json = serde_json::to_vec(value)?;
        if !self.should_use_compression(json.len()) {
            trace!(bytes = json.len(), "payload below compression threshold");
            return Ok(EncodedPayload {
                variant: EncodingVariant::Raw,
                body: json,
            });
        }

        let mut best: Option<EncodedPayload> = None;
        for candidate in self.candidates(value, &json)? {
            if best
                .as_ref()
                .is_none_or(|b| candidate.body.len() < b.body.len())
            {
                best = Some(candidate);
            }
        }
        let best = best.ok_or_else(|| CompressError::Gzip("no encoding produced".into()))?;
        debug!(
            raw_bytes = json.len(),
            variant = %best.variant,
            bytes = best.body.len(),
            "selected encoding variant"
        );
        Ok(best)
    }

    /// Encode with one specific variant; `None` if the variant does not apply.
    pub fn encode_with(
        &self,
        value: &Value,
        variant: EncodingVariant,
    ) -> Result<Option<EncodedPayload>, CompressError> {
        let json = serde_json::to_vec(value)?;
        let body = match variant {
            EncodingVariant::Raw => Some(json),
            EncodingVariant::Gzip => Some(gzip::compress(&json, self.config.gzip_level)?),
            EncodingVariant::KeyDictionary => self.key_dictionary(value)?,
            EncodingVariant::KeyValueDictionary => self.key_value_dictionary(value)?,
            EncodingVariant::SchemaAware => self.schema_aware(value)?,
        };
        Ok(body.map(|body| EncodedPayload { variant, body }))
    }

    /// Measure every applicable compressed variant regardless of threshold.
    pub fn benchmark(&self, value: &Value) -> Result<CompressionReport, CompressError> {
        let json = serde_json::to_vec(value)?;
        let candidates = self.candidates(value, &json)?;

        let variants: Vec<VariantSize> = candidates
            .iter()
            .map(|c| VariantSize {
                variant: c.variant,
                bytes: c.body.len(),
            })
            .collect();
        let best = variants
            .iter()
            .fold(None::<VariantSize>, |best, v| match best {
                Some(b) if b.bytes <= v.bytes => Some(b),
                _ => Some(*v),
            })
            .map_or(EncodingVariant::Gzip, |v| v.variant);

        Ok(CompressionReport {
            raw_bytes: json.len(),
            variants,
            best,
        })
    }

    /// Invert an encoded payload.
    pub fn decode(&self, payload: &EncodedPayload) -> Result<Value, CompressError> {
        let limit = self.config.max_decoded_bytes;
        match payload.variant {
            EncodingVariant::Raw => Ok(serde_json::from_slice(&payload.body)?),
            EncodingVariant::Gzip => {
                Ok(serde_json::from_slice(&gzip::decompress(&payload.body, limit)?)?)
            }
            EncodingVariant::KeyDictionary | EncodingVariant::KeyValueDictionary => {
                let inflated = gzip::decompress(&payload.body, limit)?;
                let doc: DictionaryDocument = serde_json::from_slice(&inflated)?;
                dictionary::decode(&doc)
            }
            EncodingVariant::SchemaAware => {
                let inflated = gzip::decompress(&payload.body, limit)?;
                let doc: SchemaDocument = serde_json::from_slice(&inflated)?;
                schema::decode(&doc)
            }
        }
    }

    /// Invert a `[tag] || body` frame.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Value, CompressError> {
        self.decode(&EncodedPayload::from_bytes(bytes)?)
    }

    fn candidates(&self, value: &Value, json: &[u8]) -> Result<Vec<EncodedPayload>, CompressError> {
        let mut out = vec![EncodedPayload {
            variant: EncodingVariant::Gzip,
            body: gzip::compress(json, self.config.gzip_level)?,
        }];
        let others = [
            (EncodingVariant::KeyDictionary, self.key_dictionary(value)?),
            (
                EncodingVariant::KeyValueDictionary,
                self.key_value_dictionary(value)?,
            ),
            (EncodingVariant::SchemaAware, self.schema_aware(value)?),
        ];
        for (variant, body) in others {
            match body {
                Some(body) => out.push(EncodedPayload { variant, body }),
                None => trace!(%variant, "variant not applicable"),
            }
        }
        Ok(out)
    }

    fn key_dictionary(&self, value: &Value) -> Result<Option<Vec<u8>>, CompressError> {
        if depth(value) > MAX_DICTIONARY_DEPTH {
            return Ok(None);
        }
        self.gzip_document(&dictionary::encode_keys(value)).map(Some)
    }

    fn key_value_dictionary(&self, value: &Value) -> Result<Option<Vec<u8>>, CompressError> {
        if depth(value) > MAX_DICTIONARY_DEPTH {
            return Ok(None);
        }
        let rules = ValueRules {
            min_occurrences: self.config.value_min_occurrences,
            min_chars: self.config.value_min_chars,
            limit: self.config.value_dictionary_limit,
        };
        self.gzip_document(&dictionary::encode_keys_and_values(value, rules))
            .map(Some)
    }

    fn schema_aware(&self, value: &Value) -> Result<Option<Vec<u8>>, CompressError> {
        if !self.config.schema_aware {
            return Ok(None);
        }
        schema::encode(value)
            .map(|doc| self.gzip_document(&doc))
            .transpose()
    }

    fn gzip_document<T: Serialize>(&self, doc: &T) -> Result<Vec<u8>, CompressError> {
        gzip::compress(&serde_json::to_vec(doc)?, self.config.gzip_level)
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}
