//! Field-level validation helpers shared by the request types.

// self
use crate::_prelude::*;

/// Single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
	/// Dotted field path (e.g. `packages[0].weight.value`).
	pub field: String,
	/// Description of the violated rule.
	pub message: String,
}

/// Ordered collection of validation failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationIssues(Vec<ValidationIssue>);
impl ValidationIssues {
	/// Records a new issue.
	pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.push(ValidationIssue { field: field.into(), message: message.into() });
	}

	/// Returns true when no issues were recorded.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of recorded issues.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates over recorded issues in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
		self.0.iter()
	}

	/// Converts into `Ok(())` when empty, otherwise a `VALIDATION_ERROR`.
	pub fn into_result(self) -> Result<(), CarrierError> {
		if self.is_empty() {
			return Ok(());
		}

		let summary = self
			.0
			.iter()
			.map(|issue| format!("{}: {}", issue.field, issue.message))
			.collect::<Vec<_>>()
			.join("; ");
		let details = serde_json::to_value(&self.0).unwrap_or(JsonValue::Null);

		Err(CarrierError::validation(format!("Rate request is invalid: {summary}."))
			.with_detail("issues", details))
	}
}
