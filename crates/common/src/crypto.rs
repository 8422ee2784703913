//! Content digests shared across Bouquet crates
//!
//! Storage object keys carry a short SHA-256 prefix of the uploaded bytes so
//! that objects can be traced back to their source file.

use sha2::{Digest, Sha256};

/// Full hex-encoded SHA-256 digest of `bytes`
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// First `len` hex characters of the content digest
pub fn compute_hash_prefix(bytes: &[u8], len: usize) -> String {
    let digest = content_digest(bytes);
    digest[..len.min(digest.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_digest_known_value() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_prefix_length() {
        assert_eq!(compute_hash_prefix(b"photo", 12).len(), 12);
        assert_eq!(compute_hash_prefix(b"photo", 500).len(), 64);
        assert_ne!(
            compute_hash_prefix(b"photo-a", 12),
            compute_hash_prefix(b"photo-b", 12)
        );
    }
}
