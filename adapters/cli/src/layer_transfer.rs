//! Single-line text encoding for rasterized minimap layers.

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use skirmish_minimap::PixelBuffer;

const LAYER_DOMAIN: &str = "skirmish";
const LAYER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layer payload.
pub(crate) const LAYER_HEADER: &str = "skirmish:v1";
/// Delimiter used to separate the prefix, dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Raw BGRA bytes of a layer together with its pixel dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayerSnapshot {
    /// Width of the layer in pixels.
    pub(crate) width: u32,
    /// Height of the layer in pixels.
    pub(crate) height: u32,
    /// Little-endian BGRA bytes, four per pixel.
    pub(crate) bgra: Vec<u8>,
}

impl LayerSnapshot {
    /// Captures the pixels of a rasterized layer.
    #[must_use]
    pub(crate) fn from_buffer(buffer: &PixelBuffer) -> Self {
        Self {
            width: buffer.width(),
            height: buffer.height(),
            bgra: buffer.to_bgra_bytes(),
        }
    }

    /// Encodes the layer into a single-line string suitable for copy and paste.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let encoded = STANDARD_NO_PAD.encode(&self.bgra);
        format!("{LAYER_HEADER}:{}x{}:{encoded}", self.width, self.height)
    }

    /// Decodes a layer from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayerTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayerTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayerTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayerTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayerTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayerTransferError::MissingPayload)?;

        if domain != LAYER_DOMAIN {
            return Err(LayerTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYER_VERSION {
            return Err(LayerTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bgra = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayerTransferError::InvalidEncoding)?;
        let expected = u64::from(width) * u64::from(height) * 4;
        if u64::try_from(bgra.len()).ok() != Some(expected) {
            return Err(LayerTransferError::SizeMismatch {
                expected,
                actual: bgra.len(),
            });
        }

        Ok(Self {
            width,
            height,
            bgra,
        })
    }
}

/// Errors that can occur while decoding layer transfer strings.
#[derive(Debug)]
pub(crate) enum LayerTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded layer.
    MissingPrefix,
    /// The encoded layer did not contain a version segment.
    MissingVersion,
    /// The encoded layer did not include its dimensions.
    MissingDimensions,
    /// The encoded layer did not include the payload segment.
    MissingPayload,
    /// The encoded layer used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded layer used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The dimensions could not be parsed from the encoded layer.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload length disagrees with the declared dimensions.
    SizeMismatch {
        /// Byte count implied by the dimensions.
        expected: u64,
        /// Byte count actually decoded.
        actual: usize,
    },
}

impl fmt::Display for LayerTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layer payload was empty"),
            Self::MissingPrefix => write!(f, "layer string is missing the prefix"),
            Self::MissingVersion => write!(f, "layer string is missing the version"),
            Self::MissingDimensions => write!(f, "layer string is missing the dimensions"),
            Self::MissingPayload => write!(f, "layer string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layer prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layer version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse layer dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layer payload: {error}")
            }
            Self::SizeMismatch { expected, actual } => {
                write!(f, "layer payload has {actual} bytes; expected {expected}")
            }
        }
    }
}

impl Error for LayerTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayerTransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayerTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| LayerTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| LayerTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(LayerTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((width, height))
}
