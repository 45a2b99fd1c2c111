use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ErrorMessage;

const MAX_PASSWORD_LENGTH: usize = 64;

pub fn hash(password: impl Into<String>) -> Result<String, ErrorMessage> {
    let password = password.into();

    if password.is_empty() {
        return Err(ErrorMessage::HashingError);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ErrorMessage::HashingError);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ErrorMessage::HashingError)?
        .to_string();

    Ok(hashed_password)
}

pub fn compare(password: &str, hashed_password: &str) -> Result<bool, ErrorMessage> {
    if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
        return Err(ErrorMessage::WrongCredentials);
    }

    let parsed_hash =
        PasswordHash::new(hashed_password).map_err(|_| ErrorMessage::InvalidHashFormat)?;

    let password_matches = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_or(false, |_| true);

    Ok(password_matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_compare_succeeds() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(compare("correct horse battery staple", &hashed).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hashed = hash("password-one").unwrap();
        assert!(!compare("password-two", &hashed).unwrap());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert_eq!(hash(""), Err(ErrorMessage::HashingError));
    }

    #[test]
    fn garbage_hash_is_rejected() {
        assert_eq!(
            compare("whatever", "not-a-phc-string"),
            Err(ErrorMessage::InvalidHashFormat)
        );
    }
}
