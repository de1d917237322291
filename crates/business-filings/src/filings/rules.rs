//! Field-level validation rules.
//!
//! A rule is a pure predicate over a field value that either passes or yields
//! the message shown next to the field. Rules compose as ordered slices and a
//! field is valid only when every rule in its slice passes.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub type ValidationRule = fn(&str) -> Result<(), &'static str>;

const INVALID_SPACES: &str = "Invalid spaces";

pub const MIDDLE_NAME_RULES: &[ValidationRule] =
    &[no_leading_spaces, no_trailing_spaces, at_most_20_chars];

pub const FIRST_NAME_RULES: &[ValidationRule] = &[
    required,
    no_leading_spaces,
    no_trailing_spaces,
    at_most_20_chars,
];

pub const LAST_NAME_RULES: &[ValidationRule] = &[
    required,
    no_leading_spaces,
    no_trailing_spaces,
    at_most_30_chars,
];

pub const CERTIFIED_BY_RULES: &[ValidationRule] = &[
    required,
    no_leading_spaces,
    no_trailing_spaces,
    at_most_100_chars,
];

pub const FOLIO_NUMBER_RULES: &[ValidationRule] = &[at_most_50_chars];

pub const EMAIL_RULES: &[ValidationRule] = &[required, email_shape];

pub const COURT_ORDER_FILE_NUMBER_RULES: &[ValidationRule] = &[
    no_leading_spaces,
    no_trailing_spaces,
    at_least_5_chars,
    at_most_20_chars,
];

/// Run `rules` in order and return the first failure message.
pub fn validate(rules: &[ValidationRule], value: &str) -> Result<(), &'static str> {
    rules.iter().try_for_each(|rule| rule(value))
}

/// Absent values are checked as empty strings.
pub fn validate_optional(rules: &[ValidationRule], value: Option<&str>) -> Result<(), &'static str> {
    validate(rules, value.unwrap_or_default())
}

fn char_count(value: &str) -> usize {
    value.chars().count()
}

fn required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        Err("Required")
    } else {
        Ok(())
    }
}

fn no_leading_spaces(value: &str) -> Result<(), &'static str> {
    if value.starts_with(char::is_whitespace) {
        Err(INVALID_SPACES)
    } else {
        Ok(())
    }
}

fn no_trailing_spaces(value: &str) -> Result<(), &'static str> {
    if value.ends_with(char::is_whitespace) {
        Err(INVALID_SPACES)
    } else {
        Ok(())
    }
}

fn at_most_20_chars(value: &str) -> Result<(), &'static str> {
    if value.is_empty() || char_count(value) <= 20 {
        Ok(())
    } else {
        Err("Cannot exceed 20 characters")
    }
}

fn at_most_30_chars(value: &str) -> Result<(), &'static str> {
    if char_count(value) <= 30 {
        Ok(())
    } else {
        Err("Cannot exceed 30 characters")
    }
}

fn at_most_50_chars(value: &str) -> Result<(), &'static str> {
    if char_count(value) <= 50 {
        Ok(())
    } else {
        Err("Cannot exceed 50 characters")
    }
}

fn at_most_100_chars(value: &str) -> Result<(), &'static str> {
    if char_count(value) <= 100 {
        Ok(())
    } else {
        Err("Cannot exceed 100 characters")
    }
}

fn at_least_5_chars(value: &str) -> Result<(), &'static str> {
    if char_count(value) >= 5 {
        Ok(())
    } else {
        Err("Court order file number is invalid")
    }
}

fn email_shape(value: &str) -> Result<(), &'static str> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let pattern = EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    });
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err("Enter a valid email address")
    }
}

/// Registry identifier such as `BC0871234`, `CP0001234` or the temporary `T000000042`.
pub fn is_registry_identifier(value: &str) -> bool {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Z]{0,3}\d{7,9}$").expect("identifier pattern compiles"))
        .is_match(value)
}

/// Named rule sets exposed to callers that validate single fields on blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSet {
    MiddleName,
    FirstName,
    LastName,
    CertifiedBy,
    FolioNumber,
    Email,
    CourtOrderFileNumber,
}

impl RuleSet {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::MiddleName,
            Self::FirstName,
            Self::LastName,
            Self::CertifiedBy,
            Self::FolioNumber,
            Self::Email,
            Self::CourtOrderFileNumber,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::MiddleName => "middle-name",
            Self::FirstName => "first-name",
            Self::LastName => "last-name",
            Self::CertifiedBy => "certified-by",
            Self::FolioNumber => "folio-number",
            Self::Email => "email",
            Self::CourtOrderFileNumber => "court-order-file-number",
        }
    }

    pub const fn rules(self) -> &'static [ValidationRule] {
        match self {
            Self::MiddleName => MIDDLE_NAME_RULES,
            Self::FirstName => FIRST_NAME_RULES,
            Self::LastName => LAST_NAME_RULES,
            Self::CertifiedBy => CERTIFIED_BY_RULES,
            Self::FolioNumber => FOLIO_NUMBER_RULES,
            Self::Email => EMAIL_RULES,
            Self::CourtOrderFileNumber => COURT_ORDER_FILE_NUMBER_RULES,
        }
    }

    pub fn check(self, value: &str) -> Result<(), &'static str> {
        validate(self.rules(), value)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule set '{0}'")]
pub struct UnknownRuleSet(pub String);

impl FromStr for RuleSet {
    type Err = UnknownRuleSet;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|set| set.name() == value.trim())
            .ok_or_else(|| UnknownRuleSet(value.to_string()))
    }
}
