//! Postal addresses and their structural checks.

// self
use crate::{
	_prelude::*,
	model::{ValidationIssues, is_alpha_code},
};

/// Postal address used for both shipment origin and destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	/// Street lines, first line required.
	pub street_lines: Vec<String>,
	/// City or locality.
	pub city: String,
	/// Optional two-letter state or province code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	/// Postal or ZIP code.
	pub postal_code: String,
	/// Two-letter ISO country code.
	pub country_code: String,
	/// Marks residential delivery points.
	#[serde(default)]
	pub residential: bool,
}
impl Address {
	/// Creates a commercial address without a state code.
	pub fn new<I, S>(
		street_lines: I,
		city: impl Into<String>,
		postal_code: impl Into<String>,
		country_code: impl AsRef<str>,
	) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			street_lines: street_lines.into_iter().map(Into::into).collect(),
			city: city.into(),
			state: None,
			postal_code: postal_code.into(),
			country_code: country_code.as_ref().to_ascii_uppercase(),
			residential: false,
		}
	}

	/// Sets the state or province code.
	pub fn with_state(mut self, state: impl AsRef<str>) -> Self {
		self.state = Some(state.as_ref().to_ascii_uppercase());

		self
	}

	/// Marks the address as residential.
	pub fn residential(mut self) -> Self {
		self.residential = true;

		self
	}

	pub(crate) fn collect_issues(&self, path: &str, issues: &mut ValidationIssues) {
		if self.street_lines.is_empty() {
			issues.push(format!("{path}.street_lines"), "at least one street line is required");
		}

		for (idx, line) in self.street_lines.iter().enumerate() {
			if line.trim().is_empty() {
				issues.push(format!("{path}.street_lines[{idx}]"), "street line must not be blank");
			}
		}

		if self.city.trim().is_empty() {
			issues.push(format!("{path}.city"), "city must not be blank");
		}
		if self.postal_code.trim().is_empty() {
			issues.push(format!("{path}.postal_code"), "postal code must not be blank");
		}
		if !is_alpha_code(&self.country_code, 2) {
			issues.push(format!("{path}.country_code"), "country code must be two letters");
		}
		if self.state.as_deref().is_some_and(|state| !is_alpha_code(state, 2)) {
			issues.push(format!("{path}.state"), "state code must be two letters");
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn constructor_normalizes_codes() {
		let address = Address::new(["1 Main St"], "Austin", "73301", "us").with_state("tx");

		assert_eq!(address.country_code, "US");
		assert_eq!(address.state.as_deref(), Some("TX"));
		assert!(!address.residential);
	}

	#[test]
	fn residential_defaults_to_false_when_absent() {
		let address: Address = serde_json::from_str(
			r#"{"street_lines":["1 Main St"],"city":"Austin","postal_code":"73301","country_code":"US"}"#,
		)
		.expect("Address should deserialize without the residential flag.");

		assert!(!address.residential);
	}

	#[test]
	fn blank_fields_are_reported_with_paths() {
		let address = Address::new(["  "], "", "", "USA").with_state("Texas");
		let mut issues = ValidationIssues::default();

		address.collect_issues("origin", &mut issues);

		let fields = issues.iter().map(|issue| issue.field.as_str()).collect::<Vec<_>>();

		assert_eq!(
			fields,
			[
				"origin.street_lines[0]",
				"origin.city",
				"origin.postal_code",
				"origin.country_code",
				"origin.state"
			]
		);
	}
}
