//! Catalog file formats
//!
//! The reconciler only ever sees decoded [`Catalog`]s. The on-disk encoding is
//! chosen once, at the boundary, by turning a [`Format`] into a [`Codec`].
//! Signature files go through the same codec as catalogs so that both round
//! trip in either format.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CodecError;
use crate::message::Catalog;
use crate::signature::Signatures;

/// Output format selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    #[default]
    Yaml,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    pub fn codec(&self) -> Box<dyn Codec> {
        match self {
            Format::Json => Box::new(JsonCodec),
            Format::Yaml => Box::new(YamlCodec),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoder/decoder for catalog and signature files
pub trait Codec: Send + Sync {
    /// File extension, without the leading dot
    fn extension(&self) -> &'static str;

    fn encode_catalog(&self, catalog: &Catalog) -> Result<Vec<u8>, CodecError>;

    /// Decode a catalog. Empty or whitespace-only input is an empty catalog.
    fn decode_catalog(&self, bytes: &[u8]) -> Result<Catalog, CodecError>;

    fn encode_signatures(&self, signatures: &Signatures) -> Result<Vec<u8>, CodecError>;

    /// Decode a signature set. Empty or whitespace-only input is an empty set.
    fn decode_signatures(&self, bytes: &[u8]) -> Result<Signatures, CodecError>;
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        let mut out = serde_json::to_vec_pretty(value)?;
        out.push(b'\n');
        Ok(out)
    }

    fn decode<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, CodecError> {
        if is_blank(bytes) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Codec for JsonCodec {
    fn extension(&self) -> &'static str {
        Format::Json.extension()
    }

    fn encode_catalog(&self, catalog: &Catalog) -> Result<Vec<u8>, CodecError> {
        Self::encode(catalog)
    }

    fn decode_catalog(&self, bytes: &[u8]) -> Result<Catalog, CodecError> {
        Self::decode(bytes)
    }

    fn encode_signatures(&self, signatures: &Signatures) -> Result<Vec<u8>, CodecError> {
        Self::encode(signatures)
    }

    fn decode_signatures(&self, bytes: &[u8]) -> Result<Signatures, CodecError> {
        Self::decode(bytes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl YamlCodec {
    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }

    fn decode<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, CodecError> {
        if is_blank(bytes) {
            return Ok(T::default());
        }
        Ok(serde_yaml::from_slice(bytes)?)
    }
}

impl Codec for YamlCodec {
    fn extension(&self) -> &'static str {
        Format::Yaml.extension()
    }

    fn encode_catalog(&self, catalog: &Catalog) -> Result<Vec<u8>, CodecError> {
        Self::encode(catalog)
    }

    fn decode_catalog(&self, bytes: &[u8]) -> Result<Catalog, CodecError> {
        Self::decode(bytes)
    }

    fn encode_signatures(&self, signatures: &Signatures) -> Result<Vec<u8>, CodecError> {
        Self::encode(signatures)
    }

    fn decode_signatures(&self, bytes: &[u8]) -> Result<Signatures, CodecError> {
        Self::decode(bytes)
    }
}
