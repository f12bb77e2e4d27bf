//! User accounts, registration input, and profile read models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::validation::{FIELD_REQUIRED, FieldErrors};
use super::{Error, RecipeSummary};

const EMAIL_MAX: usize = 254;
const NAME_MAX: usize = 150;

/// Primary key of a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw database identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw database identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Relative path of the stored avatar image.
    pub avatar: Option<String>,
    /// Administrators may edit and delete any recipe.
    pub is_staff: bool,
}

/// Raw registration payload; every field is optional until validated.
#[derive(Debug, Clone, Default)]
pub struct UserRegistration {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Validated registration ready for persistence.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: Zeroizing<String>,
}

fn is_valid_username(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '.' | '@' | '+' | '-'))
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value.map(|raw| raw.trim().to_owned()) {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            errors.add(field, FIELD_REQUIRED);
            None
        }
    }
}

fn check_length(errors: &mut FieldErrors, field: &str, value: Option<&String>, max: usize) {
    if value.is_some_and(|text| text.chars().count() > max) {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

impl UserRegistration {
    /// Validate every field, reporting all problems at once.
    ///
    /// # Examples
    /// ```
    /// use foodgram::domain::UserRegistration;
    ///
    /// let registration = UserRegistration {
    ///     email: Some("cook@example.com".into()),
    ///     username: Some("cook".into()),
    ///     first_name: Some("Ada".into()),
    ///     last_name: Some("Cook".into()),
    ///     password: Some("s3cret-pass".into()),
    /// };
    /// let user = registration.validate().expect("valid registration");
    /// assert_eq!(user.username, "cook");
    /// ```
    pub fn validate(self) -> Result<NewUser, Error> {
        let mut errors = FieldErrors::default();
        let email = required(&mut errors, "email", self.email);
        let username = required(&mut errors, "username", self.username);
        let first_name = required(&mut errors, "first_name", self.first_name);
        let last_name = required(&mut errors, "last_name", self.last_name);
        let password = match self.password {
            Some(raw) if !raw.is_empty() => Some(Zeroizing::new(raw)),
            _ => {
                errors.add("password", FIELD_REQUIRED);
                None
            }
        };

        check_length(&mut errors, "email", email.as_ref(), EMAIL_MAX);
        check_length(&mut errors, "username", username.as_ref(), NAME_MAX);
        check_length(&mut errors, "first_name", first_name.as_ref(), NAME_MAX);
        check_length(&mut errors, "last_name", last_name.as_ref(), NAME_MAX);
        if email.as_deref().is_some_and(|value| !is_plausible_email(value)) {
            errors.add("email", "Enter a valid email address.");
        }
        if username
            .as_deref()
            .is_some_and(|value| !is_valid_username(value))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        match (email, username, first_name, last_name, password) {
            (Some(email), Some(username), Some(first_name), Some(last_name), Some(password))
                if errors.is_empty() =>
            {
                Ok(NewUser {
                    email: email.to_lowercase(),
                    username,
                    first_name,
                    last_name,
                    password,
                })
            }
            _ => Err(errors.into_error()),
        }
    }
}

/// Email and password pair submitted to the login endpoint.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate that both parts are present.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, Error> {
        let mut errors = FieldErrors::default();
        if email.trim().is_empty() {
            errors.add("email", FIELD_REQUIRED);
        }
        if password.is_empty() {
            errors.add("password", FIELD_REQUIRED);
        }
        errors.into_result()?;
        Ok(Self {
            email: email.trim().to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised (lower-cased) email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Plain-text password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Public profile as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    /// Whether the viewer follows this user; always false for anonymous viewers.
    pub is_subscribed: bool,
}

impl UserProfile {
    /// Build a profile from a stored user and the viewer's follow state.
    pub fn from_user(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            is_subscribed,
        }
    }
}

/// Followed author together with a (possibly truncated) list of recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorWithRecipes {
    pub profile: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    /// Total recipes by the author, independent of truncation.
    pub recipes_count: u64,
}
