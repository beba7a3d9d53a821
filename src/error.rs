//! Error types and result definitions for the tuyascene crate.
//! Includes the transport error codes carried in the (code, message,
//! details) reply triple and conversion from JSON decode errors.

use std::fmt;
use thiserror::Error;

/// A specialized `Result` type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

// ---- Transport error codes ----

pub const CODE_UNKNOWN_KIND: &str = "UNKNOWN_KIND";
pub const CODE_MISSING_FIELD: &str = "MISSING_FIELD";
pub const CODE_TYPE_MISMATCH: &str = "TYPE_MISMATCH";
pub const CODE_DECODE_ERROR: &str = "DECODE_ERROR";
pub const CODE_DP_FETCH_FAILED: &str = "DP_FETCH_FAILED";
pub const CODE_DP_NOT_RESOLVED: &str = "DP_NOT_RESOLVED";
pub const CODE_UNSUPPORTED: &str = "UNSUPPORTED";
pub const CODE_COMPILE_FAILED: &str = "COMPILE_FAILED";

/// Which list of a scene definition a failed element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneElement {
    Action,
    Condition,
    PreCondition,
}

impl fmt::Display for SceneElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneElement::Action => "action",
            SceneElement::Condition => "condition",
            SceneElement::PreCondition => "preCondition",
        };
        write!(f, "{}", name)
    }
}

/// Position and reason of one failed element from a batch compile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementError {
    pub element: SceneElement,
    pub index: usize,
    pub reason: String,
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.element, self.index, self.reason)
    }
}

/// Represents all possible errors that can occur while parsing, compiling
/// or persisting a scene definition.
#[derive(Error, Debug, Clone)]
pub enum SceneError {
    /// A payload carried a `kind` discriminator outside the known set.
    #[error("Unknown {entity} kind '{kind}'")]
    UnknownKind { entity: &'static str, kind: String },

    /// A kind-specific required field was absent.
    #[error("Missing required field '{field}' for kind '{kind}'")]
    MissingField { kind: &'static str, field: &'static str },

    /// A dynamically-typed field carried the wrong primitive type.
    #[error("Field '{field}' of kind '{kind}' expects {expected}")]
    TypeMismatch {
        kind: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    /// The payload shape did not decode into the scene DTOs.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A method call was missing a required argument.
    #[error("Missing argument '{0}'")]
    MissingArgument(String),

    /// The datapoint metadata fetch failed for a device.
    #[error("Datapoint fetch failed for device '{0}'")]
    DatapointFetchFailed(String),

    /// A referenced datapoint id is absent from its device's schema.
    #[error("Datapoint {dp} not resolved for device '{device}'")]
    DatapointNotResolved { device: String, dp: i64 },

    /// Vendor SDK failure, code and message passed through verbatim.
    #[error("Vendor error {code}: {message}")]
    Vendor { code: String, message: String },

    /// The element or operation has no vendor counterpart.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// One or more scene elements failed to compile.
    #[error("Scene compile failed: {}", join_elements(.0))]
    CompileFailed(Vec<ElementError>),
}

impl SceneError {
    /// The string code this error carries on the transport boundary.
    /// Vendor failures keep their original code.
    pub fn code(&self) -> String {
        match self {
            SceneError::UnknownKind { .. } => CODE_UNKNOWN_KIND.to_string(),
            SceneError::MissingField { .. } => CODE_MISSING_FIELD.to_string(),
            SceneError::TypeMismatch { .. } => CODE_TYPE_MISMATCH.to_string(),
            SceneError::Decode(_) | SceneError::MissingArgument(_) => CODE_DECODE_ERROR.to_string(),
            SceneError::DatapointFetchFailed(_) => CODE_DP_FETCH_FAILED.to_string(),
            SceneError::DatapointNotResolved { .. } => CODE_DP_NOT_RESOLVED.to_string(),
            SceneError::Vendor { code, .. } => code.clone(),
            SceneError::Unsupported(_) => CODE_UNSUPPORTED.to_string(),
            SceneError::CompileFailed(_) => CODE_COMPILE_FAILED.to_string(),
        }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::Decode(err.to_string())
    }
}

fn join_elements(elements: &[ElementError]) -> String {
    elements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_their_variants() {
        let err = SceneError::UnknownKind {
            entity: "action",
            kind: "teleport".to_string(),
        };
        assert_eq!(err.code(), CODE_UNKNOWN_KIND);

        let err = SceneError::MissingArgument("homeId".to_string());
        assert_eq!(err.code(), CODE_DECODE_ERROR);

        let err = SceneError::Vendor {
            code: "30002".to_string(),
            message: "scene limit reached".to_string(),
        };
        assert_eq!(err.code(), "30002");
    }

    #[test]
    fn element_errors_carry_list_and_index() {
        let err = SceneError::CompileFailed(vec![
            ElementError {
                element: SceneElement::Condition,
                index: 2,
                reason: "Missing required field 'expr' for kind 'device'".to_string(),
            },
            ElementError {
                element: SceneElement::Action,
                index: 0,
                reason: "Unknown action kind 'teleport'".to_string(),
            },
        ]);
        let text = err.to_string();
        assert!(text.contains("condition[2]"));
        assert!(text.contains("action[0]"));
        assert_eq!(err.code(), CODE_COMPILE_FAILED);
    }

    #[test]
    fn serde_errors_become_decode_errors() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err: SceneError = bad.unwrap_err().into();
        assert!(matches!(err, SceneError::Decode(_)));
        assert_eq!(err.code(), CODE_DECODE_ERROR);
    }
}
