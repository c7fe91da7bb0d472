//! User aggregate and its value objects.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::activity::{ActivityEvent, ActivityPolicy};
use crate::domain::attributes::AttributeMap;
use crate::domain::ports::RecordStoreError;
use crate::domain::record::Record;

/// Validation errors raised by user value object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was empty or not a UUID.
    InvalidId,
    /// Name was empty once trimmed.
    EmptyName,
    /// Name exceeded the maximum length.
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Name contained non-alphabetic characters.
    NameNotAlphabetic,
    /// Email was empty once trimmed.
    EmptyEmail,
    /// Email exceeded the maximum length.
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Email did not match the accepted address shape.
    InvalidEmail,
    /// Role string matched no known role.
    UnknownRole {
        /// The rejected value.
        value: String,
    },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::NameNotAlphabetic => write!(f, "name may only contain letters"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::UnknownRole { value } => write!(f, "unknown role `{value}`"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID string.
///
/// Assigned exactly once, before first persistence, and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidId`] when the input is not a
    /// UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(raw.to_owned()))
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum accepted length for a person name.
pub const NAME_MAX: usize = 255;

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_RE.get_or_init(|| {
        // Length is enforced separately; this constrains allowed characters.
        Regex::new("^[A-Za-z]+$")
            .unwrap_or_else(|error| panic!("name regex failed to compile: {error}"))
    })
}

/// A validated first or last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`].
    ///
    /// # Errors
    /// Rejects empty, overlong, or non-alphabetic input.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        if !name_regex().is_match(&name) {
            return Err(UserValidationError::NameNotAlphabetic);
        }
        Ok(Self(name))
    }

    /// The validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum accepted length for an email address.
pub const EMAIL_MAX: usize = 255;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"(?i)^[a-z0-9+_-]+(\.[a-z0-9+_-]+)*@([a-z0-9-]+\.)+[a-z]{2,6}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// A validated email address, unique at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// # Errors
    /// Rejects empty, overlong, or malformed addresses.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }

    /// The validated address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Regular account.
    Member,
}

impl UserRole {
    /// Stable string form used in attribute maps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Parse a role from its string form.
    ///
    /// # Errors
    /// Returns [`UserValidationError::UnknownRole`] for unrecognised input.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Soft-delete marker.
///
/// Deletion flips the status; rows are never removed, and every query
/// excludes `Deleted` records by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    /// Visible to queries.
    Active,
    /// Soft-deleted, hidden from queries.
    Deleted,
}

impl UserStatus {
    /// Stable string form used in attribute maps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

/// Hashed password material.
///
/// Never serialized outward and redacted from debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap already-hashed password material.
    #[must_use]
    pub fn from_hashed(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// True when no material is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` is assigned exactly once, before first persistence.
/// - `email` uniqueness is enforced at the persistence boundary.
/// - The password hash never leaves the domain through snapshots or debug
///   output.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    first_name: PersonName,
    last_name: PersonName,
    email: EmailAddress,
    password_hash: PasswordHash,
    role: UserRole,
    status: UserStatus,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Stable user identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// First name.
    #[must_use]
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Last name.
    #[must_use]
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Assigned role.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Soft-delete status.
    #[must_use]
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// When the email address was verified, if ever.
    #[must_use]
    pub fn email_verified_at(&self) -> Option<DateTime<Utc>> {
        self.email_verified_at
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last-modified timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when a password hash is present.
    #[must_use]
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// Record the email address as verified.
    pub fn mark_email_verified(&mut self, at: DateTime<Utc>) {
        self.email_verified_at = Some(at);
    }

    /// Audit policy applied to user mutations: track the profile fields,
    /// capture only dirty values, and discard empty entries.
    #[must_use]
    pub fn activity_policy() -> ActivityPolicy {
        ActivityPolicy::new("user", &["first_name", "last_name", "email", "role"])
            .log_only_dirty(true)
            .submit_empty_logs(false)
            .recorded_events(&[
                ActivityEvent::Created,
                ActivityEvent::Updated,
                ActivityEvent::Deleted,
            ])
    }
}

fn string_attribute<'a>(
    name: &str,
    value: &'a serde_json::Value,
) -> Result<&'a str, RecordStoreError> {
    value
        .as_str()
        .ok_or_else(|| RecordStoreError::validation(format!("attribute `{name}` must be a string")))
}

fn required_str<'a>(attributes: &'a AttributeMap, name: &str) -> Result<&'a str, RecordStoreError> {
    let value = attributes
        .get(name)
        .ok_or_else(|| RecordStoreError::validation(format!("missing required attribute `{name}`")))?;
    string_attribute(name, value)
}

fn field_error(name: &str, error: UserValidationError) -> RecordStoreError {
    RecordStoreError::validation(format!("{name}: {error}"))
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn attributes(&self) -> AttributeMap {
        // The password hash is deliberately absent: snapshots feed equality
        // predicates and the audit trail.
        AttributeMap::new()
            .with("id", self.id.as_str())
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("email", self.email.as_str())
            .with("role", self.role.as_str())
            .with("status", self.status.as_str())
    }

    fn from_attributes(
        attributes: &AttributeMap,
        now: DateTime<Utc>,
    ) -> Result<Self, RecordStoreError> {
        let first_name = PersonName::new(required_str(attributes, "first_name")?)
            .map_err(|e| field_error("first_name", e))?;
        let last_name = PersonName::new(required_str(attributes, "last_name")?)
            .map_err(|e| field_error("last_name", e))?;
        let email = EmailAddress::new(required_str(attributes, "email")?)
            .map_err(|e| field_error("email", e))?;
        let password_hash = PasswordHash::from_hashed(required_str(attributes, "password")?);
        let role = match attributes.get("role") {
            Some(value) => UserRole::parse(string_attribute("role", value)?)
                .map_err(|e| field_error("role", e))?,
            None => UserRole::Member,
        };

        Ok(Self {
            id: UserId::generate(),
            first_name,
            last_name,
            email,
            password_hash,
            role,
            status: UserStatus::Active,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, attributes: &AttributeMap) -> Result<(), RecordStoreError> {
        for (name, value) in attributes.iter() {
            match name.as_str() {
                "first_name" => {
                    self.first_name = PersonName::new(string_attribute(name, value)?)
                        .map_err(|e| field_error(name, e))?;
                }
                "last_name" => {
                    self.last_name = PersonName::new(string_attribute(name, value)?)
                        .map_err(|e| field_error(name, e))?;
                }
                "email" => {
                    let email = EmailAddress::new(string_attribute(name, value)?)
                        .map_err(|e| field_error(name, e))?;
                    // Verification attaches to the address, not the account.
                    if email != self.email {
                        self.email_verified_at = None;
                    }
                    self.email = email;
                }
                "password" => {
                    self.password_hash = PasswordHash::from_hashed(string_attribute(name, value)?);
                }
                "role" => {
                    self.role = UserRole::parse(string_attribute(name, value)?)
                        .map_err(|e| field_error(name, e))?;
                }
                // Unassignable attributes are ignored, mirroring guarded
                // mass assignment at the store boundary.
                _ => {}
            }
        }
        Ok(())
    }

    fn unique_fields() -> &'static [&'static str] {
        &["email"]
    }

    fn is_deleted(&self) -> bool {
        self.status == UserStatus::Deleted
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.status = UserStatus::Deleted;
        self.updated_at = at;
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
