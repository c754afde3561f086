//! Canonical card identity.
//!
//! Inventory exports spell the same printing in several ways (`1SOR` / `SOR` /
//! `sor`, `1` / `001`). Every component that needs to compare cards goes
//! through [`CardKey::resolve`] so the spellings collapse onto one key.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width card numbers are left-padded to.
pub const CARD_NUMBER_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidKeyError {
    #[error("set label {raw:?} is empty after normalization")]
    EmptySetCode { raw: String },
    #[error("card number is empty")]
    EmptyCardNumber,
    #[error("malformed card key {0:?}; expected <set>-<number>")]
    Malformed(String),
}

/// `{set_code}-{card_number}`, e.g. `sor-001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardKey {
    set_code: String,
    card_number: String,
}

impl CardKey {
    /// Builds the canonical key from raw spreadsheet or API values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyError`] when either part is empty after
    /// normalization. Callers skip and count such rows.
    pub fn resolve(raw_set: &str, raw_number: &str) -> Result<Self, InvalidKeyError> {
        let set_code = normalize_set_code(raw_set);
        if set_code.is_empty() {
            return Err(InvalidKeyError::EmptySetCode {
                raw: raw_set.to_string(),
            });
        }

        let card_number = normalize_card_number(raw_number);
        if card_number.is_empty() {
            return Err(InvalidKeyError::EmptyCardNumber);
        }

        Ok(Self {
            set_code,
            card_number,
        })
    }

    /// Parses the display form produced by [`fmt::Display`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyError::Malformed`] when there is no `-` separator.
    pub fn parse(s: &str) -> Result<Self, InvalidKeyError> {
        let (set, number) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| InvalidKeyError::Malformed(s.to_string()))?;
        Self::resolve(set, number)
    }

    #[must_use]
    pub fn set_code(&self) -> &str {
        &self.set_code
    }

    #[must_use]
    pub fn card_number(&self) -> &str {
        &self.card_number
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.set_code, self.card_number)
    }
}

impl TryFrom<String> for CardKey {
    type Error = InvalidKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CardKey> for String {
    fn from(key: CardKey) -> Self {
        key.to_string()
    }
}

/// Strips the leading print-run digits from a set label and lowercases it.
///
/// `"1SOR"` and `"SOR"` both become `"sor"`. Only a leading run of ASCII
/// digits is removed; digits elsewhere are kept (`"TWI2"` → `"twi2"`).
#[must_use]
pub fn normalize_set_code(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim()
        .to_lowercase()
}

/// Left-pads a card number with zeros to [`CARD_NUMBER_WIDTH`].
///
/// Numbers longer than the width are kept as-is, so `"0001"` stays distinct
/// from `"001"`.
#[must_use]
pub fn normalize_card_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed:0>CARD_NUMBER_WIDTH$}")
}
