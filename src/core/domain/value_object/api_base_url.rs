use crate::core::domain::error::ValidationError;

/// Path prefix used when no base path is configured.
pub const DEFAULT_API_BASE: &str = "/api";

const ALLOWED_SCHEMES: [&str; 2] = ["https", "http"];
const MAX_URL_LENGTH: usize = 2083;

/// A validated base URL for the goose'd backend API.
///
/// The base is either an absolute URL (`https://goosed.example.com/api`)
/// or a path (`/api`) resolved against the console origin. The stored
/// value never ends with a slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBaseUrl(String);

impl ApiBaseUrl {
    /// Resolves the API base from an origin and a base path or URL.
    ///
    /// An absolute `api_base` wins over `origin`. A relative `api_base`
    /// requires an origin. A blank `api_base` resolves to the origin itself.
    ///
    /// # Errors
    /// Returns `ValidationError` if the resulting URL is malformed, too long,
    /// or uses a scheme other than http/https.
    pub fn resolve(origin: Option<&str>, api_base: &str) -> Result<Self, ValidationError> {
        let api_base = api_base.trim();

        if url::Url::parse(api_base).is_ok() {
            validate_url(api_base)?;
            return Ok(Self::new_unchecked(api_base.trim_end_matches('/').to_string()));
        }

        let origin = origin
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .ok_or_else(|| ValidationError::Field {
                field: "origin".to_string(),
                message: "An origin is required when the API base is a path".to_string(),
            })?;
        validate_url(origin)?;

        let origin = origin.trim_end_matches('/');
        let path = api_base.trim_matches('/');
        let joined = if path.is_empty() {
            origin.to_string()
        } else {
            format!("{}/{}", origin, path)
        };
        validate_url(&joined)?;
        Ok(Self::new_unchecked(joined))
    }

    /// Creates a new base URL without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the base URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the full URL of an API endpoint.
    ///
    /// # Errors
    /// Returns `ValidationError::Format` if `path` does not begin with `/`.
    pub fn endpoint(&self, path: &str) -> Result<String, ValidationError> {
        if !path.starts_with('/') {
            return Err(ValidationError::Format(format!(
                "Endpoint paths must begin with '/' but received: {}",
                path
            )));
        }
        Ok(format!("{}{}", self.0, path))
    }
}

/// Validates an absolute http(s) URL.
pub(crate) fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: "url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if value.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme. Must be one of: {}",
            ALLOWED_SCHEMES.join(", ")
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::Format("URL must include a host".to_string()));
    }

    Ok(())
}
