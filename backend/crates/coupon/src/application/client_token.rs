//! Client Tokens
//!
//! Token layout: `base64url(uuid_v4 bytes || HMAC-SHA256(secret, uuid bytes))`.
//! Signing keeps clients from planting arbitrary keys in the cooldown map.

use crate::domain::value_objects::ClientToken;
use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use uuid::Uuid;

const ID_LEN: usize = 16;
const TAG_LEN: usize = 32;
// 48 bytes as unpadded base64
const ENCODED_LEN: usize = 64;

/// Mint a new token
pub fn issue_client_token(secret: &[u8; 32]) -> ClientToken {
    let id = Uuid::new_v4();
    let id_bytes = id.as_bytes();
    let tag = hmac_sha256(secret, id_bytes);

    let mut token_data = Vec::with_capacity(ID_LEN + TAG_LEN);
    token_data.extend_from_slice(id_bytes);
    token_data.extend_from_slice(&tag);
    ClientToken::new(to_base64url(&token_data))
}

/// Accept a token read back from the client, or `None` if it was not issued
/// with `secret`
pub fn verify_client_token(raw: &str, secret: &[u8; 32]) -> Option<ClientToken> {
    if raw.len() != ENCODED_LEN {
        return None;
    }
    let token_data = from_base64url(raw).ok()?;
    if token_data.len() != ID_LEN + TAG_LEN {
        return None;
    }

    let (id_bytes, tag) = token_data.split_at(ID_LEN);
    if !verify_hmac_sha256(secret, id_bytes, tag) {
        return None;
    }

    Some(ClientToken::new(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_issued_token_verifies() {
        let token = issue_client_token(&SECRET);
        assert_eq!(token.as_str().len(), ENCODED_LEN);

        let verified = verify_client_token(token.as_str(), &SECRET);
        assert_eq!(verified, Some(token));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(issue_client_token(&SECRET), issue_client_token(&SECRET));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_client_token(&SECRET);
        assert!(verify_client_token(token.as_str(), &[8u8; 32]).is_none());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue_client_token(&SECRET);
        let mut chars: Vec<char> = token.as_str().chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(verify_client_token(&tampered, &SECRET).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_client_token("", &SECRET).is_none());
        assert!(verify_client_token("true", &SECRET).is_none());
        assert!(verify_client_token(&"!".repeat(ENCODED_LEN), &SECRET).is_none());
    }
}
