//! Opt-in cryptographic verification of subscription tokens
//!
//! Fetches the issuer's JSON Web Key Set, selects the key named by the
//! token's `kid` header and checks signature and expiry.

use crate::{
    Result,
    session::{
        credential::decode_credential,
        transport::{HttpRequest, Transport},
    },
    types::DecodedCredential,
};
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header, jwk::JwkSet};

/// Verify `token` against the key set published at `jwks_url`
///
/// Malformed tokens fail with [`crate::Error::InvalidCredential`] before any
/// network traffic.
pub async fn verify_credential<T>(
    transport: &T,
    jwks_url: &str,
    user_agent: &str,
    token: &str,
) -> Result<DecodedCredential>
where
    T: Transport + ?Sized,
{
    let token = token.trim();
    decode_credential(token)?;

    let header = decode_header(token)?;
    let kid = header
        .kid
        .ok_or_else(|| crate::Error::verification("KID not available"))?;

    tracing::debug!(%kid, url = jwks_url, "Fetching signing keys");

    let jwks: JwkSet = transport
        .perform(HttpRequest::get(jwks_url).with_header("User-Agent", user_agent))
        .await?
        .error_for_status("fetch signing keys")?
        .json()?;

    let jwk = jwks.find(&kid).ok_or_else(|| {
        crate::Error::verification(format!("No signing key found for KID {}", kid))
    })?;

    let key = DecodingKey::from_jwk(jwk)?;
    let mut validation = Validation::new(header.alg);
    validation.validate_aud = false;

    let data = decode::<DecodedCredential>(token, &key, &validation)?;

    tracing::info!(
        subscriber_id = %data.claims.subscriber_id,
        "Subscription token verified"
    );

    Ok(data.claims)
}
