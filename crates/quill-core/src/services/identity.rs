//! Identity service - registration, authentication, and user lookup.

use std::sync::Arc;

use crate::domain::{NewUser, User};
use crate::error::DomainError;
use crate::ports::{PasswordService, UserRepository};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 80;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;
const EMAIL_MAX: usize = 255;

/// Registration input, validated by [`IdentityService::register`].
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Owns user records and the credential lifecycle.
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Register a new user: validate fields, reject a username or email
    /// already in use, hash the password, persist.
    pub async fn register(&self, input: RegisterInput) -> Result<User, DomainError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self
            .users
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict("username already taken".to_string()));
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Conflict(
                "email already registered".to_string(),
            ));
        }

        let password_hash = self.passwords.hash(&input.password)?;
        let user = self
            .users
            .create(NewUser::new(input.username, input.email, password_hash))
            .await?;
        Ok(user)
    }

    /// Authenticate by email and password. Both "no such account" and "wrong
    /// password" surface as `InvalidCredentials` so callers cannot probe
    /// which emails are registered.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(DomainError::InvalidCredentials);
        };

        if self.verify_password(&user, password)? {
            Ok(user)
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    /// Verify a candidate password against a user's stored hash. A mismatch
    /// is `Ok(false)`; a malformed stored hash is an integrity error.
    pub fn verify_password(&self, user: &User, candidate: &str) -> Result<bool, DomainError> {
        Ok(self.passwords.verify(candidate, &user.password_hash)?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_id(id).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_email(email).await?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_username(username).await?)
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if len < USERNAME_MIN || len > USERNAME_MAX {
        return Err(DomainError::validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(())
}

/// Structural email check: one `@`, non-empty local part, dotted domain,
/// no whitespace, bounded length.
fn validate_email(email: &str) -> Result<(), DomainError> {
    let well_formed = email.chars().count() <= EMAIL_MAX
        && !email.chars().any(char::is_whitespace)
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && domain.contains('.')
        });

    if well_formed {
        Ok(())
    } else {
        Err(DomainError::validation("invalid email address"))
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN || len > PASSWORD_MAX {
        return Err(DomainError::validation(format!(
            "password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}
