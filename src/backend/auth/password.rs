/**
 * Password Hashing
 *
 * Stored format: `{salt}${digest}` where `salt` is 32 lower-case hex chars
 * (a UUID v4 without hyphens) and `digest` is the lower-case hex SHA-256 of
 * `salt ‖ password`.
 */

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SEPARATOR: char = '$';
const DIGEST_HEX_LEN: usize = 64;

fn digest_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = digest_hex(&salt, password);
    format!("{salt}{SEPARATOR}{digest}")
}

/// Check `candidate` against a stored hash.
///
/// Malformed stored values never verify.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let mut parts = stored.split(SEPARATOR);
    let (Some(salt), Some(digest), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if salt.is_empty() || digest.len() != DIGEST_HEX_LEN {
        return false;
    }
    let expected = digest_hex(salt, candidate);
    expected.as_bytes().ct_eq(digest.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_format() {
        let stored = hash_password("password123");
        let (salt, digest) = stored.split_once('$').unwrap();
        assert_eq!(salt.len(), 32);
        assert_eq!(digest.len(), 64);
        assert!(stored.chars().all(|c| c == '$' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_digest() {
        // sha256("saltpassword")
        assert_eq!(
            digest_hex("salt", "password"),
            "13601bda4ea78e55a07b98866d2be6be0744e3866f13c00c811cab608a28f322"
        );
    }

    #[test]
    fn test_malformed_stored_values() {
        let good = hash_password("password123");
        let (salt, digest) = good.split_once('$').unwrap();
        assert!(!verify_password("", "password123"));
        assert!(!verify_password("no-separator", "password123"));
        assert!(!verify_password(&format!("{salt}${digest}$extra"), "password123"));
        assert!(!verify_password(&format!("${digest}"), "password123"));
        assert!(!verify_password(&format!("{salt}${}", &digest[..63]), "password123"));
    }

    proptest! {
        #[test]
        fn prop_hash_then_verify(password in ".{0,64}") {
            let stored = hash_password(&password);
            prop_assert!(verify_password(&stored, &password));
            prop_assert_ne!(&stored, &password);
        }

        #[test]
        fn prop_wrong_password_fails(password in ".{1,32}", other in ".{1,32}") {
            prop_assume!(password != other);
            let stored = hash_password(&password);
            prop_assert!(!verify_password(&stored, &other));
        }

        #[test]
        fn prop_salts_are_unique(password in ".{0,32}") {
            prop_assert_ne!(hash_password(&password), hash_password(&password));
        }
    }
}
