use crate::core::domain::error::ValidationError;

/// A session credential sent with every backend request as a `Cookie` header.
///
/// Holds one or more `name=value` pairs separated by `; `.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie(String);

impl SessionCookie {
    /// Creates a validated session cookie.
    ///
    /// # Errors
    /// Returns `ValidationError` if the value is not a well-formed cookie list.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();
        validate_session_cookie(&value)?;
        Ok(Self::new_unchecked(value))
    }

    /// Creates a new session cookie without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the cookie value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionCookie").field(&"<redacted>").finish()
    }
}

/// Validates the format of a cookie header value.
pub(crate) fn validate_session_cookie(cookie: &str) -> Result<(), ValidationError> {
    if cookie.is_empty() {
        return Err(ValidationError::Field {
            field: "session_cookie".to_string(),
            message: "Session cookie cannot be empty".to_string(),
        });
    }
    for pair in cookie.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (name, _) = pair.split_once('=').ok_or_else(|| {
            ValidationError::Format("Session cookie must be in format NAME=VALUE".to_string())
        })?;
        if name.trim().is_empty() || name.chars().any(|c| c.is_whitespace() || c == ',') {
            return Err(ValidationError::Format(format!(
                "Invalid cookie name: '{}'",
                name
            )));
        }
    }
    if cookie.chars().any(|c| c.is_control()) {
        return Err(ValidationError::Format(
            "Session cookie cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}
