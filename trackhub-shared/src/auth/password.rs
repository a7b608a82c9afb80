/// Account passwords
///
/// `POST /v1/auth/register` checks a new password against the registration
/// rules and stores its Argon2id hash in `users.password_hash`;
/// `POST /v1/auth/login` verifies against that hash.
///
/// # Registration rules
///
/// - 8 to 128 characters (counted as characters, not bytes)
/// - at least one letter and one digit
/// - must not contain the part of the account email before the `@`
///
/// # Example
///
/// ```
/// use trackhub_shared::auth::password::{hash_password, validate_password_strength, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// validate_password_strength("correct horse 42", "ada@example.com")?;
///
/// let hash = hash_password("correct horse 42")?;
/// assert!(verify_password("correct horse 42", &hash)?);
/// assert!(!verify_password("Correct horse 42", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id cost: 19 MiB, 2 passes, 1 lane
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 2;
const LANES: u32 = 1;
const HASH_LEN: usize = 32;

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 128;

/// Shortest email local part that passwords are checked against
const MIN_LOCAL_PART_CHARS: usize = 3;

/// Error type for hashing and verification
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Hashing failed
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a mismatch
    #[error("Failed to verify password: {0}")]
    VerifyError(String),
}

/// A registration rule the password breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WeakPassword {
    #[error("Password must be at least {} characters", MIN_PASSWORD_CHARS)]
    TooShort,

    #[error("Password must be at most {} characters", MAX_PASSWORD_CHARS)]
    TooLong,

    #[error("Password must contain a letter")]
    MissingLetter,

    #[error("Password must contain a digit")]
    MissingDigit,

    #[error("Password must not contain your email name")]
    ContainsEmail,
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, LANES, Some(HASH_LEN))
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with Argon2id and a fresh random salt
///
/// Returns the PHC string stored on the user row, for example
/// `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a login attempt against a stored hash
///
/// A wrong password is `Ok(false)`, never an error. Cost parameters are read
/// from the stored hash, so hashes made with older settings still verify.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if `hash` is not a PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Checks a new password against the registration rules
///
/// `email` is the address being registered; passwords built around its
/// local part are refused.
///
/// # Errors
///
/// Returns the first rule the password breaks
pub fn validate_password_strength(password: &str, email: &str) -> Result<(), WeakPassword> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_CHARS {
        return Err(WeakPassword::TooShort);
    }
    if length > MAX_PASSWORD_CHARS {
        return Err(WeakPassword::TooLong);
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err(WeakPassword::MissingLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(WeakPassword::MissingDigit);
    }

    let local_part = email
        .trim()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if local_part.chars().count() >= MIN_LOCAL_PART_CHARS
        && password.to_lowercase().contains(&local_part)
    {
        return Err(WeakPassword::ContainsEmail);
    }

    Ok(())
}
