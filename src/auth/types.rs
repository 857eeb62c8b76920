//! Session model and auth request/response payloads. Passwords and bearer
//! tokens travel through these types, so they must never be logged.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::OnceLock};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Traveler,
    Guide,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Traveler => "traveler",
            Self::Guide => "guide",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "traveler" => Ok(Self::Traveler),
            "guide" => Ok(Self::Guide),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The user record the backend returns with a token or from `/auth/profile`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Role requested through `set-role` and awaiting approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_role: Option<Role>,
}

impl UserSummary {
    /// Name shown in greetings: full name, then first + last, then email.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Fills fields the profile endpoint leaves out from the stored record of
    /// the same account. Role stays as the profile reports it; a stored
    /// pending role survives until the profile shows it granted.
    #[must_use]
    pub fn merged_with(mut self, stored: &UserSummary) -> Self {
        if !self.email.trim().eq_ignore_ascii_case(stored.email.trim()) {
            return self;
        }
        if self.id == 0 {
            self.id = stored.id;
        }
        for (field, previous) in [
            (&mut self.name, &stored.name),
            (&mut self.first_name, &stored.first_name),
            (&mut self.last_name, &stored.last_name),
        ] {
            if field.is_none() {
                field.clone_from(previous);
            }
        }
        if self.pending_role.is_none() && stored.pending_role != Some(self.role) {
            self.pending_role = stored.pending_role;
        }
        self
    }
}

/// An authenticated session. Token and user are always present together.
#[derive(Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: UserSummary,
}

impl Session {
    #[must_use]
    pub fn new(token: SecretString, user: UserSummary) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.user.role
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.token.expose_secret() == other.token.expose_secret() && self.user == other.user
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    /// Checks that both fields are filled in before anything is sent.
    ///
    /// # Errors
    /// Returns a user-facing message naming the first missing field.
    pub fn validate(&self) -> Result<(), String> {
        if self.email.is_empty() {
            return Err("Email is required".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("Password is required".to_string());
        }
        Ok(())
    }
}

/// Signup form. Phone, location and bio are only required for guides.
#[derive(Clone, Debug)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

impl RegistrationForm {
    #[must_use]
    pub fn new(first_name: &str, last_name: &str, email: &str, password: &str, role: Role) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
            password: SecretString::from(password.to_string()),
            role,
            phone: None,
            location: None,
            bio: None,
        }
    }

    #[must_use]
    pub fn with_guide_profile(mut self, phone: &str, location: &str, bio: &str) -> Self {
        self.phone = Some(phone.trim().to_string());
        self.location = Some(location.trim().to_string());
        self.bio = Some(bio.trim().to_string());
        self
    }

    /// Validates required fields, the email shape and the role-conditional fields.
    ///
    /// # Errors
    /// Returns a user-facing message for the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("First name", self.first_name.as_str()),
            ("Last name", self.last_name.as_str()),
            ("Email", self.email.as_str()),
            ("Password", self.password.expose_secret()),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{label} is required"));
            }
        }

        if !valid_email(&self.email) {
            return Err("Email address is not valid".to_string());
        }

        match self.role {
            Role::Traveler => {}
            Role::Guide => {
                let guide_fields = [
                    ("Phone", &self.phone),
                    ("Location", &self.location),
                    ("Bio", &self.bio),
                ];
                for (label, value) in guide_fields {
                    if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                        return Err(format!("{label} is required for guides"));
                    }
                }
            }
            Role::Admin => return Err("Admin accounts cannot be self-registered".to_string()),
        }

        Ok(())
    }

    pub(crate) fn to_request(&self) -> RegisterRequest<'_> {
        let (phone, location, bio) = match self.role {
            Role::Guide => (
                self.phone.as_deref(),
                self.location.as_deref(),
                self.bio.as_deref(),
            ),
            _ => (None, None, None),
        };

        RegisterRequest {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.email,
            password: self.password.expose_secret(),
            role: self.role,
            phone,
            location,
            bio,
        }
    }
}

pub fn valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(email))
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<&'a str>,
}

/// `{token, user}` as returned by login and register. Older backends name the
/// token `access_token`.
#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: UserSummary,
}

#[derive(Serialize)]
pub(crate) struct SetRoleRequest {
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SetRoleResponse {
    pub role: Role,
    #[serde(default)]
    pub pending: bool,
}
