use holocron_core::{CardKey, InvalidKeyError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One card as published by the external card database, reduced to the
/// fields the catalog uses.
///
/// This is also the on-disk cache format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExternalCard {
    pub set_code: String,
    pub card_number: String,
    pub name: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub aspects: Vec<String>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub hp: Option<u32>,
    /// Non-null attributes on the source object; used to pick between
    /// duplicate entries for the same card.
    #[serde(default)]
    pub attribute_count: usize,
}

impl RawExternalCard {
    /// Normalizes one element of an endpoint's card array.
    ///
    /// Accepts the shapes seen across the published databases: the set as
    /// `set.code`, `setCode` or a plain `set` string; the number as `number`
    /// or `cardNumber` (string or integer); aspects as an `aspects` array or
    /// a single `aspect`. Returns `None` when name, set or number is missing.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let name = string_field(obj, &["name"])?;
        let set_code = obj
            .get("set")
            .and_then(|set| match set {
                Value::Object(inner) => string_field(inner, &["code"]),
                other => scalar_string(other),
            })
            .or_else(|| string_field(obj, &["setCode", "set_code"]))?
            .to_lowercase();
        let card_number = string_field(obj, &["number", "cardNumber", "card_number"])?;

        let aspects = match obj.get("aspects") {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_string).collect(),
            _ => string_field(obj, &["aspect"]).into_iter().collect(),
        };

        Some(Self {
            set_code,
            card_number,
            name,
            subtitle: string_field(obj, &["subtitle"]),
            rarity: string_field(obj, &["rarity"]),
            card_type: string_field(obj, &["type", "cardType"]),
            aspects,
            cost: int_field(obj, "cost"),
            power: int_field(obj, "power"),
            hp: int_field(obj, "hp"),
            attribute_count: obj.values().filter(|v| !v.is_null()).count(),
        })
    }

    /// Canonical key for this card.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyError`] if the set code or number normalizes to
    /// an empty string.
    pub fn key(&self) -> Result<CardKey, InvalidKeyError> {
        CardKey::resolve(&self.set_code, &self.card_number)
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn string_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| obj.get(*name).and_then(scalar_string))
}

fn int_field(obj: &Map<String, Value>, name: &str) -> Option<u32> {
    match obj.get(name)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
