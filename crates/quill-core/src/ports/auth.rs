//! Authentication and authorization ports.

/// Claims carried by a session token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,
}

/// Token service trait for session token operations.
pub trait TokenService: Send + Sync {
    /// Generate a session token for a user. `remember` selects the longer
    /// configured lifetime.
    fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        email: &str,
        roles: Vec<String>,
        remember: bool,
    ) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime in seconds of a token minted with the given `remember` flag.
    fn expiration_seconds(&self, remember: bool) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash. A mismatch is `Ok(false)`;
    /// only an unparseable stored hash is an error.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
