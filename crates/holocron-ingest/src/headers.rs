//! Header normalization and the header → field mapping.

use std::sync::LazyLock;

use holocron_core::VariantName;
use regex::Regex;

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\W_]+").expect("valid regex"));

/// Canonical inventory fields a column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Set,
    BaseCardId,
    Name,
    Variant(VariantName),
    Rarity,
    CardType,
    Aspects,
    Cost,
    Power,
    Hp,
}

impl Field {
    #[must_use]
    pub fn is_metadata(self) -> bool {
        matches!(
            self,
            Field::Rarity | Field::CardType | Field::Aspects | Field::Cost | Field::Power | Field::Hp
        )
    }
}

/// Fields without which no row can be keyed.
pub const REQUIRED_FIELDS: [(Field, &str); 3] = [
    (Field::Set, "set"),
    (Field::BaseCardId, "base_card_id"),
    (Field::Name, "name"),
];

/// Normalized header → field. Order matters only for duplicate spellings of
/// one field, where the first listed column in the sheet wins.
pub const DEFAULT_ALLOW_LIST: &[(&str, Field)] = &[
    ("set", Field::Set),
    ("base_card_id", Field::BaseCardId),
    ("name", Field::Name),
    ("normal", Field::Variant(VariantName::Normal)),
    ("foil", Field::Variant(VariantName::Foil)),
    ("hyperspace", Field::Variant(VariantName::Hyperspace)),
    ("foil_hyperspace", Field::Variant(VariantName::FoilHyperspace)),
    ("foil_and_hyperspace", Field::Variant(VariantName::FoilHyperspace)),
    ("showcase", Field::Variant(VariantName::Showcase)),
    ("organized_play", Field::Variant(VariantName::OrganizedPlay)),
    ("event_exclusive", Field::Variant(VariantName::EventExclusive)),
    ("prerelease_promo", Field::Variant(VariantName::PrereleasePromo)),
    ("organized_play_foil", Field::Variant(VariantName::OrganizedPlayFoil)),
    ("standard_prestige", Field::Variant(VariantName::StandardPrestige)),
    ("foil_prestige", Field::Variant(VariantName::FoilPrestige)),
    ("serialized_prestige", Field::Variant(VariantName::SerializedPrestige)),
    ("rarity", Field::Rarity),
    ("type", Field::CardType),
    ("aspects", Field::Aspects),
    ("cost", Field::Cost),
    ("power", Field::Power),
    ("hp", Field::Hp),
];

/// Lowercases, trims, and turns every run of whitespace, `&` or punctuation
/// into a single `_`, without leading or trailing underscores.
///
/// `"Foil & Hyperspace"` → `"foil_hyperspace"`, `" Base Card ID "` → `"base_card_id"`.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    let lowered = header.trim().to_lowercase();
    SEPARATOR_RUN
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Column index → field for one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    columns: Vec<(usize, Field)>,
    dropped: Vec<String>,
}

impl FieldMap {
    #[must_use]
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(i, _)| *i)
    }

    pub fn columns(&self) -> impl Iterator<Item = (usize, Field)> + '_ {
        self.columns.iter().copied()
    }

    /// Original headers that matched nothing in the allow-list.
    #[must_use]
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    #[must_use]
    pub fn has_metadata(&self) -> bool {
        self.columns.iter().any(|(_, f)| f.is_metadata())
    }

    /// Normalized names of required fields with no column.
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_FIELDS
            .iter()
            .filter(|(field, _)| self.column(*field).is_none())
            .map(|(_, name)| (*name).to_string())
            .collect()
    }
}

/// Maps each header onto the allow-list. Unknown headers are dropped; a field
/// claimed by two columns keeps the leftmost one.
#[must_use]
pub fn build_field_map(headers: &[String], allow_list: &[(&str, Field)]) -> FieldMap {
    let mut map = FieldMap::default();

    for (index, header) in headers.iter().enumerate() {
        let normalized = normalize_header(header);
        let Some(field) = allow_list
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, f)| *f)
        else {
            if !normalized.is_empty() {
                map.dropped.push(header.clone());
            }
            continue;
        };

        if map.column(field).is_some() {
            tracing::debug!(header = %header, ?field, "duplicate column for field; keeping first");
            continue;
        }
        map.columns.push((index, field));
    }

    map
}
