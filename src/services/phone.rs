//! Phone Number Validation
//!
//! Classifies and normalizes free-form phone numbers without any lookup
//! service. Rules are tried in order:
//! - Bangladeshi mobile numbers (`01[3-9]` + 8 digits, optional `+88`/`+880`)
//! - Generic international numbers (`+` then 5-18 digits)
//!
//! A number that fits both shapes is always treated as Bangladeshi.
//! Only ASCII digits 0-9 count.

use crate::types::{PhoneNumberKind, PhoneValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

const REQUIRED: &str = "Phone number is required";
const INVALID_FORMAT: &str = "Invalid phone number format";
const BANGLADESH_CODE: &str = "+88";

static BANGLADESH_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+88)?01[3-9][0-9]{8}$").expect("valid Bangladesh regex"));

static BANGLADESH_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+880)?1[3-9][0-9]{8}$").expect("valid Bangladesh regex"));

// Country code is the greedy 1-4 digit capture; no dialing plan behind it.
static INTERNATIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+([0-9]{1,4})([0-9]{4,14})$").expect("valid international regex")
});

/// Classification rules in priority order.
const RULES: [PhoneNumberKind; 2] = [PhoneNumberKind::Bangladesh, PhoneNumberKind::International];

impl PhoneNumberKind {
    fn matches(&self, cleaned: &str) -> bool {
        match self {
            PhoneNumberKind::Bangladesh => {
                BANGLADESH_SHORT.is_match(cleaned) || BANGLADESH_LONG.is_match(cleaned)
            }
            PhoneNumberKind::International => INTERNATIONAL.is_match(cleaned),
        }
    }

    /// Build the result for a `cleaned` number this rule matches.
    fn normalize(&self, cleaned: &str) -> Option<PhoneValidationResult> {
        match self {
            PhoneNumberKind::Bangladesh => {
                // `+88` also strips the first half of `+880`, leaving `01...`.
                let rest = cleaned.strip_prefix(BANGLADESH_CODE).unwrap_or(cleaned);
                let national = if rest.len() == 10 {
                    format!("0{}", rest)
                } else {
                    rest.to_string()
                };
                Some(PhoneValidationResult::valid(
                    *self,
                    format!("{}{}", BANGLADESH_CODE, national),
                    BANGLADESH_CODE.to_string(),
                    national,
                ))
            }
            PhoneNumberKind::International => {
                let captures = INTERNATIONAL.captures(cleaned)?;
                Some(PhoneValidationResult::valid(
                    *self,
                    cleaned.to_string(),
                    format!("+{}", &captures[1]),
                    captures[2].to_string(),
                ))
            }
        }
    }
}

/// Stateless phone number validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneValidator;

impl PhoneValidator {
    /// Validate and normalize a phone number. Never fails; check `is_valid`.
    pub fn validate(raw: &str) -> PhoneValidationResult {
        if raw.is_empty() {
            return PhoneValidationResult::invalid(String::new(), REQUIRED);
        }

        let cleaned = clean(raw);

        for rule in RULES {
            if !rule.matches(&cleaned) {
                continue;
            }
            if let Some(result) = rule.normalize(&cleaned) {
                return result;
            }
        }

        trace!("Rejected phone number {:?}", raw);
        PhoneValidationResult::invalid(cleaned, INVALID_FORMAT)
    }

    /// Normalized number when valid, otherwise the input unchanged.
    pub fn format_for_display(phone: &str) -> String {
        let result = Self::validate(phone);
        if result.is_valid {
            result.formatted
        } else {
            phone.to_string()
        }
    }

    /// Whether the number is a Bangladeshi mobile number.
    pub fn is_bangladesh_number(phone: &str) -> bool {
        PhoneNumberKind::Bangladesh.matches(&clean(phone))
    }

    /// Dialing prefix including `+`, empty when unrecognized.
    pub fn get_country_code(phone: &str) -> String {
        Self::validate(phone).country_code
    }

    /// Number after the dialing prefix, empty when unrecognized.
    pub fn get_national_number(phone: &str) -> String {
        Self::validate(phone).national_number
    }
}

/// Drop whitespace, hyphens and parentheses.
fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}
