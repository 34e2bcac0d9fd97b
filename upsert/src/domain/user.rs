//! User record model submitted to the upsert procedure.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`UserDraft::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was empty or whitespace.
    EmptyName,
    /// Email was empty or whitespace.
    EmptyEmail,
    /// Age was below zero.
    NegativeAge {
        /// Rejected age.
        age: i32,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::NegativeAge { age } => write!(f, "age must not be negative (got {age})"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Identifier issued by the user store.
///
/// Absence is always expressed as `Option<UserId>`, so zero is a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier returned by the store.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Access the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candidate user fields, validated before any connection is opened.
///
/// ## Invariants
/// - `name` and `email` contain at least one non-whitespace character.
/// - `age` is non-negative.
///
/// # Examples
/// ```
/// use user_upsert::domain::UserDraft;
///
/// let draft = UserDraft::new("Carlos Pérez", 28, "carlos.perez@exam.com").unwrap();
/// assert_eq!(draft.age(), 28);
/// assert!(UserDraft::new("", 28, "carlos.perez@exam.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDraft {
    name: String,
    age: i32,
    email: String,
}

impl UserDraft {
    /// Validate and construct a draft from caller input.
    pub fn new(
        raw_name: impl Into<String>,
        age: i32,
        raw_email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = raw_name.into();
        let email = raw_email.into();

        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if age < 0 {
            return Err(UserValidationError::NegativeAge { age });
        }

        Ok(Self { name, age, email })
    }

    /// Full display name as supplied.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Age in years.
    #[must_use]
    pub const fn age(&self) -> i32 {
        self.age
    }

    /// Contact email as supplied.
    #[must_use]
    pub const fn email(&self) -> &str {
        self.email.as_str()
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
