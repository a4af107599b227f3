//! Random token generation for group identifiers and invitation codes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{Rng, RngCore};

/// Alphabet for group identifiers: lowercase letters and digits.
pub const GROUP_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a group identifier (36^8 possible values).
pub const GROUP_ID_LENGTH: usize = 8;

/// Random bytes behind an invitation code. Encodes to 11 URL-safe characters.
pub const INVITE_CODE_BYTES: usize = 8;

/// Generates a random string of `len` characters drawn from `alphabet`.
pub fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Generates a short, human-shareable group identifier (e.g. `a5b2c9x1`).
pub fn generate_group_id() -> String {
    random_string(GROUP_ID_ALPHABET, GROUP_ID_LENGTH)
}

/// Generates a URL-safe invitation code from `INVITE_CODE_BYTES` random bytes.
///
/// Codes are 11 characters long, so their length alone keeps them apart from
/// the 8-character group identifiers.
pub fn generate_invite_code() -> String {
    let mut bytes = [0u8; INVITE_CODE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_group_id_format() {
        let id = generate_group_id();
        assert_eq!(id.len(), GROUP_ID_LENGTH);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_group_id_uniqueness() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_group_id()).collect();
        assert!(ids.len() >= 999);
    }

    #[test]
    fn test_generate_invite_code_format() {
        let code = generate_invite_code();
        assert_eq!(code.len(), 11);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_invite_code_differs_from_group_id_length() {
        assert_ne!(generate_invite_code().len(), generate_group_id().len());
    }

    #[test]
    fn test_random_string_uses_alphabet() {
        let s = random_string(b"ab", 64);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c == 'a' || c == 'b'));
    }
}
