//! `passWord` derivation for `globalInfo`.
//!
//! The platform expects ten random characters followed by the base64 of
//! the hex MD5 of those characters concatenated with the registration code.

use base64::prelude::*;
use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SALT_LEN: usize = 10;

/// Random string over `[0-9a-z]` from the thread RNG.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A fresh password for `registration_code`.
pub fn generate_password(registration_code: &str) -> String {
    derive_password(&random_string(SALT_LEN), registration_code)
}

pub fn derive_password(salt: &str, registration_code: &str) -> String {
    let digest = md5::compute(format!("{salt}{registration_code}"));
    let hex = format!("{digest:x}");
    format!("{salt}{}", BASE64_STANDARD.encode(hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(
            derive_password("a", "bc"),
            "aOTAwMTUwOTgzY2QyNGZiMGQ2OTYzZjdkMjhlMTdmNzI="
        );
    }

    #[test]
    fn generated_password_carries_its_salt() {
        let password = generate_password("3100000090");
        let (salt, encoded) = password.split_at(SALT_LEN);

        assert!(salt.bytes().all(|b| ALPHABET.contains(&b)));
        assert_eq!(password, derive_password(salt, "3100000090"));
        assert_eq!(encoded.len(), 44);
    }

    #[test]
    fn random_strings_differ() {
        assert_eq!(random_string(0), "");
        assert_ne!(random_string(32), random_string(32));
    }
}
