use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for user accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Stored account. The password hash never leaves the crate boundary through views.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public account representation returned by auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Applicant fields embedded in admin application listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    #[error("Username must be at least 3 characters long")]
    UsernameTooShort,
    #[error("Please provide a valid email")]
    InvalidEmail,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
    #[error("Password is required")]
    PasswordMissing,
}

impl Registration {
    /// Trimmed username and lowercased email, after checking the signup rules.
    pub fn normalized(&self) -> Result<(String, String), AuthValidationError> {
        let username = self.username.trim();
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthValidationError::UsernameTooShort);
        }
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthValidationError::PasswordTooShort);
        }
        Ok((username.to_string(), email))
    }
}

impl Credentials {
    pub fn normalized_email(&self) -> Result<String, AuthValidationError> {
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AuthValidationError::PasswordMissing);
        }
        Ok(email)
    }
}

/// Lowercase and sanity-check an address: one `@`, non-empty local part, dotted domain.
pub fn normalize_email(raw: &str) -> Result<String, AuthValidationError> {
    let email = raw.trim().to_ascii_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthValidationError::InvalidEmail);
    };
    let domain_ok = !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(AuthValidationError::InvalidEmail);
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lowercased_and_checked() {
        assert_eq!(
            normalize_email("  Admin@PetAdoption.com "),
            Ok("admin@petadoption.com".to_string())
        );
        for bad in [
            "",
            "no-at-sign",
            "@example.com",
            "a@localhost",
            "a@b@c.com",
            "a@x..com",
            "a b@c.com",
        ] {
            assert_eq!(
                normalize_email(bad),
                Err(AuthValidationError::InvalidEmail),
                "{bad}"
            );
        }
    }

    #[test]
    fn registration_rules_match_signup_form() {
        let mut registration = Registration {
            username: " jo ".to_string(),
            email: "jo@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(
            registration.normalized(),
            Err(AuthValidationError::UsernameTooShort)
        );

        registration.username = "joanna".to_string();
        registration.password = "short".to_string();
        assert_eq!(
            registration.normalized(),
            Err(AuthValidationError::PasswordTooShort)
        );

        registration.password = "longer-secret".to_string();
        assert_eq!(
            registration.normalized(),
            Ok(("joanna".to_string(), "jo@example.com".to_string()))
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials {
            email: "jo@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("hunter22"));
    }
}
