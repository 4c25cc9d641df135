//! Packages, weights, and dimensions.

// self
use crate::{
	_prelude::*,
	model::{Money, ValidationIssues, is_alpha_code},
};

/// Unit for package weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeightUnit {
	/// Pounds.
	Lbs,
	/// Kilograms.
	Kgs,
}
impl WeightUnit {
	/// Returns the wire label (`LBS` / `KGS`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Lbs => "LBS",
			Self::Kgs => "KGS",
		}
	}
}

/// Unit for package dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DimensionUnit {
	/// Inches.
	In,
	/// Centimeters.
	Cm,
}
impl DimensionUnit {
	/// Returns the wire label (`IN` / `CM`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::In => "IN",
			Self::Cm => "CM",
		}
	}
}

/// Package weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
	/// Weight value.
	pub value: Decimal,
	/// Weight unit.
	pub unit: WeightUnit,
}
impl Weight {
	/// Creates a new weight.
	pub fn new(value: Decimal, unit: WeightUnit) -> Self {
		Self { value, unit }
	}
}

/// Package dimensions; every side must be positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
	/// Length.
	pub length: Decimal,
	/// Width.
	pub width: Decimal,
	/// Height.
	pub height: Decimal,
	/// Dimension unit.
	pub unit: DimensionUnit,
}
impl Dimensions {
	/// Creates a new dimension set.
	pub fn new(length: Decimal, width: Decimal, height: Decimal, unit: DimensionUnit) -> Self {
		Self { length, width, height, unit }
	}
}

/// Single parcel within a shipment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
	/// Package weight.
	pub weight: Weight,
	/// Optional outer dimensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Dimensions>,
	/// Optional carrier packaging-type code (e.g. UPS `02` for customer packaging).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub packaging_type: Option<String>,
	/// Optional declared value for insurance.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub declared_value: Option<Money>,
}
impl Package {
	/// Creates a package with only a weight.
	pub fn new(weight: Weight) -> Self {
		Self { weight, dimensions: None, packaging_type: None, declared_value: None }
	}

	/// Sets the dimensions.
	pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
		self.dimensions = Some(dimensions);

		self
	}

	/// Sets the packaging-type code.
	pub fn with_packaging_type(mut self, code: impl Into<String>) -> Self {
		self.packaging_type = Some(code.into());

		self
	}

	/// Sets the declared value.
	pub fn with_declared_value(mut self, value: Money) -> Self {
		self.declared_value = Some(value);

		self
	}

	pub(crate) fn collect_issues(&self, path: &str, issues: &mut ValidationIssues) {
		if self.weight.value <= Decimal::ZERO {
			issues.push(format!("{path}.weight.value"), "weight must be positive");
		}

		if let Some(dimensions) = &self.dimensions {
			for (side, value) in [
				("length", dimensions.length),
				("width", dimensions.width),
				("height", dimensions.height),
			] {
				if value <= Decimal::ZERO {
					issues.push(format!("{path}.dimensions.{side}"), "dimension must be positive");
				}
			}
		}
		if self.packaging_type.as_deref().is_some_and(|code| code.trim().is_empty()) {
			issues.push(format!("{path}.packaging_type"), "packaging type must not be blank");
		}
		if let Some(value) = &self.declared_value {
			if value.amount.is_sign_negative() {
				issues.push(format!("{path}.declared_value.amount"), "amount must not be negative");
			}
			if !is_alpha_code(&value.currency, 3) {
				issues.push(format!("{path}.declared_value.currency"), "currency must be three letters");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn units_use_uppercase_wire_labels() {
		let weight = serde_json::to_value(Weight::new(Decimal::new(25, 1), WeightUnit::Kgs))
			.expect("Weight should serialize.");

		assert_eq!(weight["unit"], "KGS");
		assert_eq!(weight["value"], "2.5");
		assert_eq!(DimensionUnit::Cm.as_str(), "CM");
	}

	#[test]
	fn non_positive_dimensions_are_rejected() {
		let package = Package::new(Weight::new(Decimal::ONE, WeightUnit::Lbs)).with_dimensions(
			Dimensions::new(Decimal::TEN, Decimal::ZERO, Decimal::NEGATIVE_ONE, DimensionUnit::In),
		);
		let mut issues = ValidationIssues::default();

		package.collect_issues("packages[0]", &mut issues);

		let fields = issues.iter().map(|issue| issue.field.as_str()).collect::<Vec<_>>();

		assert_eq!(fields, ["packages[0].dimensions.width", "packages[0].dimensions.height"]);
	}

	#[test]
	fn declared_value_requires_currency_code() {
		let package = Package::new(Weight::new(Decimal::ONE, WeightUnit::Lbs))
			.with_declared_value(Money::new(Decimal::ONE_HUNDRED, "dollars"));
		let mut issues = ValidationIssues::default();

		package.collect_issues("packages[1]", &mut issues);

		assert_eq!(issues.len(), 1);
		assert_eq!(issues.iter().next().map(|i| i.field.as_str()), Some("packages[1].declared_value.currency"));
	}
}
