//! Phone number validation types.

use serde::Serialize;

/// Which numbering rule accepted a phone number.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhoneNumberKind {
    /// Bangladeshi mobile number, normalized to `+88` + 11 digits.
    Bangladesh,
    /// Any `+<country code><number>` shape. Country codes are not checked
    /// against a dialing plan.
    International,
}

/// Phone number validation result.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhoneValidationResult {
    /// Whether the number is valid.
    pub is_valid: bool,
    /// Normalized number, or the cleaned input when invalid.
    pub formatted: String,
    /// Dialing prefix including `+`, empty when unrecognized.
    pub country_code: String,
    /// Remainder after the country code, empty when unrecognized.
    pub national_number: String,
    /// Matching rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<PhoneNumberKind>,
    /// Error message if invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhoneValidationResult {
    pub(crate) fn valid(
        kind: PhoneNumberKind,
        formatted: String,
        country_code: String,
        national_number: String,
    ) -> Self {
        Self {
            is_valid: true,
            formatted,
            country_code,
            national_number,
            kind: Some(kind),
            error: None,
        }
    }

    pub(crate) fn invalid(formatted: String, error: &str) -> Self {
        Self {
            is_valid: false,
            formatted,
            country_code: String::new(),
            national_number: String::new(),
            kind: None,
            error: Some(error.to_string()),
        }
    }
}
