//! The twelve collectible printings of a card and per-printing quantities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantName {
    Normal,
    Foil,
    Hyperspace,
    FoilHyperspace,
    Showcase,
    OrganizedPlay,
    EventExclusive,
    PrereleasePromo,
    OrganizedPlayFoil,
    StandardPrestige,
    FoilPrestige,
    SerializedPrestige,
}

impl VariantName {
    pub const ALL: [VariantName; 12] = [
        VariantName::Normal,
        VariantName::Foil,
        VariantName::Hyperspace,
        VariantName::FoilHyperspace,
        VariantName::Showcase,
        VariantName::OrganizedPlay,
        VariantName::EventExclusive,
        VariantName::PrereleasePromo,
        VariantName::OrganizedPlayFoil,
        VariantName::StandardPrestige,
        VariantName::FoilPrestige,
        VariantName::SerializedPrestige,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            VariantName::Normal => "normal",
            VariantName::Foil => "foil",
            VariantName::Hyperspace => "hyperspace",
            VariantName::FoilHyperspace => "foil_hyperspace",
            VariantName::Showcase => "showcase",
            VariantName::OrganizedPlay => "organized_play",
            VariantName::EventExclusive => "event_exclusive",
            VariantName::PrereleasePromo => "prerelease_promo",
            VariantName::OrganizedPlayFoil => "organized_play_foil",
            VariantName::StandardPrestige => "standard_prestige",
            VariantName::FoilPrestige => "foil_prestige",
            VariantName::SerializedPrestige => "serialized_prestige",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for VariantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantName {
    type Err = VariantPatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantName::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| VariantPatchError::UnknownVariant(s.to_string()))
    }
}

/// Quantity held of every printing. Absent printings are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantQuantities([u32; 12]);

impl VariantQuantities {
    #[must_use]
    pub fn get(&self, variant: VariantName) -> u32 {
        self.0[variant.index()]
    }

    pub fn set(&mut self, variant: VariantName, quantity: u32) {
        self.0[variant.index()] = quantity;
    }

    /// Builder form of [`VariantQuantities::set`].
    #[must_use]
    pub fn with(mut self, variant: VariantName, quantity: u32) -> Self {
        self.set(variant, quantity);
        self
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().fold(0u32, |acc, q| acc.saturating_add(*q))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Element-wise sum.
    pub fn add(&mut self, other: &VariantQuantities) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine = mine.saturating_add(*theirs);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantName, u32)> + '_ {
        VariantName::ALL.into_iter().map(|v| (v, self.get(v)))
    }
}

impl Serialize for VariantQuantities {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(VariantName::ALL.len()))?;
        for (variant, quantity) in self.iter() {
            map.serialize_entry(variant.as_str(), &quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VariantQuantities {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = std::collections::HashMap::<VariantName, u32>::deserialize(deserializer)?;
        let mut quantities = VariantQuantities::default();
        for (variant, quantity) in raw {
            quantities.set(variant, quantity);
        }
        Ok(quantities)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantPatchError {
    #[error("request body must be a JSON object of variant quantities")]
    NotAnObject,
    #[error("request body must set at least one variant")]
    Empty,
    #[error("unknown variant \"{0}\"")]
    UnknownVariant(String),
    #[error("invalid quantity for \"{variant}\": {reason}")]
    InvalidQuantity { variant: String, reason: String },
}

/// Partial update of variant quantities. Unmentioned variants keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantPatch {
    changes: Vec<(VariantName, u32)>,
}

impl VariantPatch {
    /// Validates a JSON body such as `{"normal": 3, "foil": 1}`.
    ///
    /// # Errors
    ///
    /// Returns [`VariantPatchError`] naming the first offending field for
    /// unknown variant names and for negative, fractional, non-numeric or
    /// out-of-range quantities.
    pub fn from_json(body: &serde_json::Value) -> Result<Self, VariantPatchError> {
        let object = body.as_object().ok_or(VariantPatchError::NotAnObject)?;
        if object.is_empty() {
            return Err(VariantPatchError::Empty);
        }

        let mut changes = Vec::with_capacity(object.len());
        for (field, value) in object {
            let variant = field.parse::<VariantName>()?;
            let invalid = |reason: &str| VariantPatchError::InvalidQuantity {
                variant: field.clone(),
                reason: reason.to_string(),
            };

            let quantity = match value {
                serde_json::Value::Number(n) => {
                    if let Some(q) = n.as_u64() {
                        u32::try_from(q).map_err(|_| invalid("too large"))?
                    } else if n.as_i64().is_some() {
                        return Err(invalid("must not be negative"));
                    } else {
                        // `3.0` is what JavaScript clients send for 3.
                        whole_quantity(n.as_f64().unwrap_or(f64::NAN)).map_err(invalid)?
                    }
                }
                _ => return Err(invalid("must be a non-negative integer")),
            };
            changes.push((variant, quantity));
        }

        Ok(Self { changes })
    }

    /// Overwrites the mentioned variants in `current`.
    #[must_use]
    pub fn apply(&self, mut current: VariantQuantities) -> VariantQuantities {
        for (variant, quantity) in &self.changes {
            current.set(*variant, *quantity);
        }
        current
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_quantity(f: f64) -> Result<u32, &'static str> {
    if !f.is_finite() || f.fract() != 0.0 {
        Err("must be a whole number")
    } else if f < 0.0 {
        Err("must not be negative")
    } else if f > f64::from(u32::MAX) {
        Err("too large")
    } else {
        Ok(f as u32)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn variant_names_round_trip_through_strings() {
        for variant in VariantName::ALL {
            assert_eq!(variant.as_str().parse::<VariantName>().unwrap(), variant);
        }
        assert_eq!(VariantName::ALL.len(), 12);
    }

    #[test]
    fn add_is_element_wise() {
        let mut a = VariantQuantities::default().with(VariantName::Normal, 2);
        let b = VariantQuantities::default()
            .with(VariantName::Normal, 1)
            .with(VariantName::Foil, 1);
        a.add(&b);
        assert_eq!(a.get(VariantName::Normal), 3);
        assert_eq!(a.get(VariantName::Foil), 1);
        assert_eq!(a.total(), 4);
    }

    #[test]
    fn serializes_all_twelve_variants() {
        let q = VariantQuantities::default().with(VariantName::FoilHyperspace, 2);
        let value = serde_json::to_value(q).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 12);
        assert_eq!(object["foil_hyperspace"], 2);
        assert_eq!(object["serialized_prestige"], 0);
    }

    #[test]
    fn deserialize_treats_missing_variants_as_zero() {
        let q: VariantQuantities = serde_json::from_value(json!({"showcase": 1})).unwrap();
        assert_eq!(q.get(VariantName::Showcase), 1);
        assert_eq!(q.total(), 1);
    }

    #[test]
    fn patch_merges_over_existing_quantities() {
        let current = VariantQuantities::default().with(VariantName::Normal, 1);
        let patch = VariantPatch::from_json(&json!({"normal": 3, "foil": 1})).unwrap();
        let merged = patch.apply(current);
        assert_eq!(merged.get(VariantName::Normal), 3);
        assert_eq!(merged.get(VariantName::Foil), 1);
        assert_eq!(merged.total(), 4);
    }

    #[test]
    fn patch_keeps_unmentioned_variants() {
        let current = VariantQuantities::default()
            .with(VariantName::Normal, 1)
            .with(VariantName::Showcase, 2);
        let patch = VariantPatch::from_json(&json!({"normal": 0})).unwrap();
        let merged = patch.apply(current);
        assert_eq!(merged.get(VariantName::Normal), 0);
        assert_eq!(merged.get(VariantName::Showcase), 2);
    }

    #[test]
    fn patch_rejects_unknown_variant() {
        let err = VariantPatch::from_json(&json!({"holo": 1})).unwrap_err();
        assert_eq!(err, VariantPatchError::UnknownVariant("holo".to_string()));
    }

    #[test]
    fn patch_rejects_negative_quantity() {
        let err = VariantPatch::from_json(&json!({"foil": -1})).unwrap_err();
        assert!(matches!(err, VariantPatchError::InvalidQuantity { ref variant, .. } if variant == "foil"));
    }

    #[test]
    fn patch_rejects_fractional_and_string_quantities() {
        assert!(matches!(
            VariantPatch::from_json(&json!({"normal": 1.5})),
            Err(VariantPatchError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            VariantPatch::from_json(&json!({"normal": "2"})),
            Err(VariantPatchError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn patch_accepts_integral_floats() {
        let patch = VariantPatch::from_json(&json!({"normal": 3.0, "foil": 0.0})).unwrap();
        let merged = patch.apply(VariantQuantities::default().with(VariantName::Foil, 2));
        assert_eq!(merged.get(VariantName::Normal), 3);
        assert_eq!(merged.get(VariantName::Foil), 0);

        let err = VariantPatch::from_json(&json!({"hyperspace": -2.0})).unwrap_err();
        assert_eq!(
            err,
            VariantPatchError::InvalidQuantity {
                variant: "hyperspace".to_string(),
                reason: "must not be negative".to_string(),
            }
        );
    }

    #[test]
    fn patch_rejects_non_object_and_empty_bodies() {
        assert_eq!(
            VariantPatch::from_json(&json!([1, 2])).unwrap_err(),
            VariantPatchError::NotAnObject
        );
        assert_eq!(
            VariantPatch::from_json(&json!({})).unwrap_err(),
            VariantPatchError::Empty
        );
    }
}
