//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Decode standard base64 (used for secrets supplied via environment)
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Encode bytes as unpadded URL-safe base64 (cookie-safe)
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded URL-safe base64
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

fn keyed(key: &[u8; 32]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut mac = keyed(key);
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verify an HMAC-SHA256 tag in constant time
pub fn verify_hmac_sha256(key: &[u8; 32], data: &[u8], tag: &[u8]) -> bool {
    let mut mac = keyed(key);
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_known_value() {
        // RFC 4231 case 1 message with the key widened to 32 bytes
        let key = [0x0bu8; 32];
        let mac = hmac_sha256(&key, b"Hi There");
        let expected =
            hex::decode("198a607eb44bfbc69903a0f1cf2bbdc5ba0aa3f3d9ae3c1c7a3b1696a0b68cf7")
                .unwrap();
        assert_eq!(mac.to_vec(), expected);
    }

    #[test]
    fn test_verify_hmac() {
        let key = [42u8; 32];
        let tag = hmac_sha256(&key, b"token id");

        assert!(verify_hmac_sha256(&key, b"token id", &tag));
        assert!(!verify_hmac_sha256(&key, b"other id", &tag));
        assert!(!verify_hmac_sha256(&[43u8; 32], b"token id", &tag));
        assert!(!verify_hmac_sha256(&key, b"token id", &tag[..31]));
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));
        assert_ne!(bytes, random_bytes(32));
    }

    #[test]
    fn test_base64url_is_cookie_safe() {
        let data = [0xfbu8, 0xff, 0xfe, 0x00, 0x3e];
        let encoded = to_base64url(&data);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(from_base64url(&encoded).unwrap(), data);
    }

    #[test]
    fn test_from_base64_standard() {
        assert_eq!(from_base64("aGVsbG8=").unwrap(), b"hello");
        assert!(from_base64("not base64!").is_err());
    }
}
