use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::ErrorMessage;

/// Hash a password using the Argon2id algorithm
///
/// The output is a PHC string that embeds the algorithm, cost parameters and
/// the random salt, so it is the only value that needs to be stored:
/// ```text
/// $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
/// ```
///
/// Each call draws a fresh salt from the operating system CSPRNG, so hashing
/// the same password twice yields two different strings.
///
/// # Returns
/// - `Ok(String)`: the PHC string, safe to persist
/// - `Err(ErrorMessage::EmptyPassword)`: the password was empty
/// - `Err(ErrorMessage::HashingError)`: argon2 failed
pub fn hash(password: impl Into<String>) -> Result<String, ErrorMessage> {
    let password = password.into();

    if password.is_empty() {
        return Err(ErrorMessage::EmptyPassword);
    }

    let salt = SaltString::generate(&mut OsRng);

    let hashed_password = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| ErrorMessage::HashingError)?
        .to_string();

    Ok(hashed_password)
}

/// Verify a password against a stored PHC hash
///
/// Salt and parameters are read back from the stored string; the comparison
/// itself is constant-time.
///
/// # Returns
/// - `Ok(true)`: password matches
/// - `Ok(false)`: password doesn't match
/// - `Err(ErrorMessage)`: empty password or a stored hash that cannot be parsed
pub fn compare(password: &str, hashed_password: &str) -> Result<bool, ErrorMessage> {
    if password.is_empty() {
        return Err(ErrorMessage::EmptyPassword);
    }

    let parsed_hash =
        PasswordHash::new(hashed_password).map_err(|_| ErrorMessage::InvalidHashFormat)?;

    let password_matched = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    Ok(password_matched)
}
