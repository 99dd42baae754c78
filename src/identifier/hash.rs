//! Fixed-width hash fragments for shortened identifiers

use sha2::{Digest, Sha256};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Render a `width`-character base36 hash of `name`.
///
/// The fragment is taken from the leading 64 bits of the SHA-256 digest, so
/// it is stable across platforms and releases. `width` is clamped to 12,
/// the widest base36 rendering that fits in 64 bits.
pub fn hash_fragment(name: &str, width: usize) -> String {
    let width = width.clamp(1, super::MAX_HASH_LENGTH);
    let digest = Sha256::digest(name.as_bytes());

    let mut leading = [0u8; 8];
    leading.copy_from_slice(&digest[..8]);
    let mut value = u64::from_be_bytes(leading);

    let mut out = vec![b'0'; width];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    out.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_width_and_alphabet() {
        for width in 1..=12 {
            let fragment = hash_fragment("complexes_complexhasonecomplex_links", width);
            assert_eq!(fragment.len(), width);
            assert!(fragment.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_fragment_is_stable() {
        assert_eq!(hash_fragment("posts_tags_links", 5), hash_fragment("posts_tags_links", 5));
        assert_ne!(hash_fragment("posts_tags_links", 5), hash_fragment("posts_tag_links", 5));
    }

    #[test]
    fn test_wider_fragment_extends_narrower() {
        // Wider fragments keep the low-order digits of narrower ones.
        let short = hash_fragment("articles_categories_links", 5);
        let long = hash_fragment("articles_categories_links", 8);
        assert!(long.ends_with(&short));
    }
}
