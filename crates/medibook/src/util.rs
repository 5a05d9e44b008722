use rand::Rng;
use regex::Regex;

use crate::{Error, Result, Success};

lazy_static! {
    static ref ARGON_CONFIG: argon2::Config<'static> = argon2::Config::default();
}

/// Strip special characters and aliases from emails
pub fn normalise_email(original: String) -> String {
    lazy_static! {
        static ref SPLIT: Regex = Regex::new("([^@]+)(@.+)").unwrap();
        static ref SYMBOL_RE: Regex = Regex::new("\\+.+|\\.").unwrap();
    }

    let split = SPLIT.captures(&original).unwrap();
    let mut clean = SYMBOL_RE
        .replace_all(split.get(1).unwrap().as_str(), "")
        .to_string();

    clean.push_str(split.get(2).unwrap().as_str());

    clean
}

/// Hash a secret using argon2
pub fn hash_secret(plaintext: String) -> Result<String> {
    argon2::hash_encoded(plaintext.as_bytes(), nanoid!(24).as_bytes(), &ARGON_CONFIG)
    .map_err(|_| Error::InternalError)
}

/// Draw a fixed-width numeric one-time code
///
/// Uniform over the six-digit range; no relation to previously issued codes.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Check an email address is syntactically valid
pub fn assert_email(email: &str) -> Success {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err(Error::IncorrectData { with: "email" })
    }
}

/// Check a free-text field carries at least `min` characters
pub fn assert_length(value: &str, min: usize, with: &'static str) -> Success {
    if value.trim().len() < min {
        Err(Error::IncorrectData { with })
    } else {
        Ok(())
    }
}

/// Check an age is within the accepted range
pub fn assert_age(age: u32) -> Success {
    if (1..=120).contains(&age) {
        Ok(())
    } else {
        Err(Error::IncorrectData { with: "age" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_aliases() {
        assert_eq!(
            normalise_email("in.box+alias@example.com".into()),
            "inbox@example.com"
        );
    }

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..64 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn age_bounds() {
        assert!(assert_age(0).is_err());
        assert!(assert_age(1).is_ok());
        assert!(assert_age(120).is_ok());
        assert!(assert_age(121).is_err());
    }
}
