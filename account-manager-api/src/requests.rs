use serde::{Deserialize, Serialize};

// -------- REQUEST DTOs --------

/// Text fields of the multipart registration form.
///
/// Every field is optional at the wire level; presence and non-blankness are
/// checked by the server so that a missing field and an empty one produce the
/// same validation error.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>, // Plain text
}

/// Login accepts a username, an email, or both.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: String, // Plain text
}

/// Borrowed view of the login identifiers, blank values dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginIdentifier<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl LoginRequest {
    /// Returns `None` when neither a username nor an email was supplied.
    pub fn identifier(&self) -> Option<LoginIdentifier<'_>> {
        let username = non_blank(self.username.as_deref());
        let email = non_blank(self.email.as_deref());

        if username.is_none() && email.is_none() {
            return None;
        }

        Some(LoginIdentifier { username, email })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
