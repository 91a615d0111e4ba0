//! Domain models for provisioning blueprints.
//!
//! This module defines the structures used when listing, creating,
//! updating and deleting blueprints through `/v1/blueprints`.

use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A named, versioned provisioning template.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BlueprintRecord {
    /// Blueprint identifier (UUID).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Target operating system (e.g. "rhel", "windows").
    pub os: String,
    /// Template version string.
    pub version: String,
    /// Opaque provisioning payload.
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Response of `GET /v1/blueprints/{id}`, `POST` and `PUT`.
#[derive(Debug, Deserialize)]
pub(crate) struct BlueprintResponse {
    pub blueprint: BlueprintRecord,
}

/// Body of a blueprint create or update request.
///
/// A draft is only sent after [`BlueprintDraft::validate`] succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintDraft {
    pub name: String,
    pub os: String,
    pub version: String,
    pub data: serde_json::Value,
}

impl BlueprintDraft {
    /// Creates a draft from already-structured data.
    pub fn new(
        name: impl Into<String>,
        os: impl Into<String>,
        version: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            os: os.into(),
            version: version.into(),
            data,
        }
    }

    /// Creates a draft from the raw text of a payload editor.
    ///
    /// Blank text stands for an empty object.
    ///
    /// # Errors
    /// Returns `ValidationError::Format` if the text is not valid JSON.
    pub fn from_editor(
        name: impl Into<String>,
        os: impl Into<String>,
        version: impl Into<String>,
        payload: &str,
    ) -> Result<Self, ValidationError> {
        let data = if payload.trim().is_empty() {
            empty_object()
        } else {
            serde_json::from_str(payload).map_err(|e| {
                ValidationError::Format(format!("Blueprint payload is not valid JSON: {}", e))
            })?
        };
        Ok(Self::new(name, os, version, data))
    }

    /// Checks the draft and returns the trimmed copy that will be submitted.
    ///
    /// # Errors
    /// Returns `ValidationError::Field` for a blank name, os or version and
    /// `ValidationError::ConstraintViolation` when the payload is not an object.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        let name = required("name", &self.name)?;
        let os = required("os", &self.os)?;
        let version = required("version", &self.version)?;

        let data = match &self.data {
            serde_json::Value::Null => empty_object(),
            serde_json::Value::Object(_) => self.data.clone(),
            _ => {
                return Err(ValidationError::ConstraintViolation(
                    "Blueprint payload must be a JSON object".to_string(),
                ));
            }
        };

        Ok(Self {
            name,
            os,
            version,
            data,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("{} is required", field),
        });
    }
    Ok(trimmed.to_string())
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
