//! Validation and measurement of base64 payloads.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// Upper bound (inclusive) for the decoded size of both the original payload
/// and the compressed output.
pub const MAX_PAYLOAD_SIZE: usize = 1 << 21;

/// Standard alphabet, padding required. Non-zero trailing bits in the last
/// symbol are tolerated.
const STRICT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid base64: {0}")]
pub struct DecodeError(String);

/// Returns the number of bytes `token` decodes to.
pub fn decode_size(token: &str) -> Result<usize, DecodeError> {
    STRICT
        .decode(token)
        .map(|bytes| bytes.len())
        .map_err(|e| DecodeError(e.to_string()))
}

#[inline]
pub fn within_limit(size: usize) -> bool {
    size <= MAX_PAYLOAD_SIZE
}

#[cfg(test)]
pub(crate) fn encode(bytes: &[u8]) -> String {
    STRICT.encode(bytes)
}
