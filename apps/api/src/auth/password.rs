use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salted SHA-256 digest stored as `salt$digest` in lowercase hex.
pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, plain);
    format!("{}${}", hex_encode(&salt), hex_encode(&digest))
}

/// Malformed stored values verify as false rather than erroring, so a
/// corrupt row degrades into a failed login.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Some(salt), Some(expected)) = (hex_decode(salt_hex), hex_decode(digest_hex)) else {
        return false;
    };
    let actual = digest_with_salt(&salt, plain);
    // compare without early exit
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn digest_with_salt(salt: &[u8], plain: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    hasher.finalize().into()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let stored = hash_password("hunter22");
        assert!(verify_password("hunter22", &stored));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let stored = hash_password("hunter22");
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let a = hash_password("same-password");
        let b = hash_password("same-password");
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }

    #[test]
    fn test_malformed_stored_value_never_verifies() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "no-separator"));
        assert!(!verify_password("anything", "zz$zz"));
        assert!(!verify_password("anything", "abc$abcd"));
    }
}
