//! Turns the generator's JSON roadmap payload into a [`LearningPath`].

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{generate_id, DifficultyLevel, LearningPath, NodeStatus, PathNode};

/// Errors raised while materializing a path.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    /// Payload is not a JSON object, even after stripping code fences
    #[error("Malformed path data: {0}")]
    MalformedPathData(String),
}

/// Expected shape of the roadmap payload. Every field is optional and
/// scalar fields accept any JSON type.
#[derive(Debug, Default, Deserialize)]
struct RawPath {
    #[serde(rename = "pathTitle", default)]
    path_title: Option<Value>,
    #[serde(default)]
    steps: Option<Vec<RawStep>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStep {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
}

/// Text of a step field: strings as is, null or missing as empty, other
/// scalars in their JSON form.
fn field_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

/// Remove markdown code-fence markers some models wrap JSON in.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Build a learning path from generated JSON.
///
/// A missing step list yields an empty path and a missing title falls back
/// to the requested `topic`. Only unparseable input is an error.
pub fn materialize(
    raw_json: &str,
    level: DifficultyLevel,
    topic: &str,
) -> Result<LearningPath, MaterializeError> {
    let cleaned = strip_code_fences(raw_json);

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| {
        warn!(error = %e, "Generated path is not valid JSON");
        MaterializeError::MalformedPathData(e.to_string())
    })?;

    if !value.is_object() {
        return Err(MaterializeError::MalformedPathData(
            "expected a JSON object".to_string(),
        ));
    }

    let raw: RawPath = serde_json::from_value(value)
        .map_err(|e| MaterializeError::MalformedPathData(e.to_string()))?;

    let topic = raw
        .path_title
        .as_ref()
        .and_then(Value::as_str)
        .filter(|title| !title.trim().is_empty())
        .map_or_else(|| topic.to_string(), str::to_string);

    let stamp = Utc::now();
    let nodes: Vec<PathNode> = raw
        .steps
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, step)| PathNode {
            id: format!("node-{}-{}", stamp.timestamp_millis(), index),
            title: field_text(step.title),
            description: field_text(step.description),
            status: if index == 0 {
                NodeStatus::Unlocked
            } else {
                NodeStatus::Locked
            },
            course_id: None,
        })
        .collect();

    debug!(topic = %topic, nodes = nodes.len(), "Materialized learning path");

    Ok(LearningPath {
        id: generate_id("path"),
        topic,
        level,
        nodes,
        created_at: stamp,
    })
}
