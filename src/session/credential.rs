//! Subscription token decoding
//!
//! Decoding is structural only: the token must be three dot-separated
//! base64url segments whose header is a JSON object and whose payload
//! deserializes into [`DecodedCredential`]. The signature is not checked
//! here, see [`crate::session::verify`] for that.

use crate::{Result, types::DecodedCredential};
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::Value;

/// base64url engine that accepts both padded and unpadded input
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the claims of a subscription token without verifying it
pub fn decode_credential(token: &str) -> Result<DecodedCredential> {
    let token = token.trim();
    if token.is_empty() {
        return Err(crate::Error::invalid_credential("token is empty"));
    }

    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(crate::Error::invalid_credential(
            "token must have exactly three segments",
        ));
    };

    if signature.is_empty() {
        return Err(crate::Error::invalid_credential("signature segment is empty"));
    }

    let header: Value = decode_segment(header, "header")?;
    if !header.is_object() {
        return Err(crate::Error::invalid_credential("header is not a JSON object"));
    }

    decode_segment(payload, "payload")
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str, name: &str) -> Result<T> {
    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .map_err(|e| crate::Error::invalid_credential(format!("{} is not base64url: {}", name, e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| crate::Error::invalid_credential(format!("{} is not valid: {}", name, e)))
}
