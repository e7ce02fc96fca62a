//! Data models exchanged with the pypas service
//!
//! Every JSON endpoint except exercise info answers with the same envelope:
//! `{"success": bool, "payload": ...}`. On failure the payload is a
//! human-readable message; on success its shape depends on the endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{TransportError, TransportResult};

/// Response envelope used by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub payload: Value,
}

impl ApiResponse {
    /// Decode the payload on success, or turn the server message into an error
    pub fn into_result<T: DeserializeOwned>(self) -> TransportResult<T> {
        if self.success {
            serde_json::from_value(self.payload).map_err(|e| TransportError::Rejected {
                message: format!("Unexpected response from server: {}", e),
            })
        } else {
            Err(TransportError::Rejected {
                message: payload_message(&self.payload),
            })
        }
    }
}

/// Render a payload as a message, unquoting plain strings
pub fn payload_message(payload: &Value) -> String {
    match payload {
        Value::String(message) => message.clone(),
        Value::Null => "Unknown error".to_string(),
        other => other.to_string(),
    }
}

/// Published information about an exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteExerciseInfo {
    #[serde(default)]
    pub version: Option<String>,
}

/// Upload statistics for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameLog {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub uploaded: u32,
    #[serde(default)]
    pub available: u32,
    #[serde(default)]
    pub passed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub waiting: u32,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
}

impl FrameLog {
    /// Score out of 10, zero when the frame has no available exercises
    pub fn score(&self) -> f64 {
        if self.available == 0 {
            0.0
        } else {
            f64::from(self.passed) / f64::from(self.available) * 10.0
        }
    }
}

/// Grading state of a single uploaded assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub slug: String,
    /// `None` while the assignment waits to be graded
    #[serde(default)]
    pub passed: Option<bool>,
}

/// Exercises published in one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameListing {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
}

/// One exercise in a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub slug: String,
    #[serde(default)]
    pub topic: String,
}

/// Filters for the exercise listing
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub frame: String,
    pub primary_topic: String,
    pub secondary_topic: String,
}
