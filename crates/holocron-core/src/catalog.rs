use serde::{Deserialize, Serialize};

use crate::card_key::CardKey;
use crate::inventory::{AggregatedInventoryEntry, SheetMetadata};
use crate::variants::VariantQuantities;
use crate::vocabulary::{Aspect, CardType, Rarity, Translation};

/// Card attributes in catalog vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCardMetadata {
    /// Epithet printed under the name, e.g. "Dark Lord of the Sith".
    pub subtitle: Option<String>,
    pub rarity: Option<Translation<Rarity>>,
    pub card_type: Option<Translation<CardType>>,
    pub aspects: Vec<Translation<Aspect>>,
    pub cost: Option<u32>,
    pub power: Option<u32>,
    pub hp: Option<u32>,
}

impl EnrichedCardMetadata {
    /// Translates the raw columns of an enriched spreadsheet.
    #[must_use]
    pub fn from_sheet(sheet: &SheetMetadata) -> Self {
        Self {
            subtitle: None,
            rarity: sheet.rarity.as_deref().map(Rarity::translate),
            card_type: sheet.card_type.as_deref().map(CardType::translate),
            aspects: sheet.aspects.iter().map(|a| Aspect::translate(a)).collect(),
            cost: sheet.cost,
            power: sheet.power,
            hp: sheet.hp,
        }
    }

    /// Source values that had no catalog term, as `field=value` strings.
    #[must_use]
    pub fn untranslated(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(Translation::Untranslated(raw)) = &self.rarity {
            out.push(format!("rarity={raw}"));
        }
        if let Some(Translation::Untranslated(raw)) = &self.card_type {
            out.push(format!("type={raw}"));
        }
        for aspect in &self.aspects {
            if let Translation::Untranslated(raw) = aspect {
                out.push(format!("aspect={raw}"));
            }
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Where a record's metadata came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    External,
    Spreadsheet,
    None,
}

impl MetadataSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MetadataSource::External => "external",
            MetadataSource::Spreadsheet => "spreadsheet",
            MetadataSource::None => "none",
        }
    }
}

/// A fully-joined card ready to be written to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub key: CardKey,
    pub name: String,
    pub variants: VariantQuantities,
    pub metadata: EnrichedCardMetadata,
    pub metadata_source: MetadataSource,
}

impl CatalogRecord {
    /// Record for an owned card.
    #[must_use]
    pub fn from_entry(
        entry: AggregatedInventoryEntry,
        metadata: EnrichedCardMetadata,
        metadata_source: MetadataSource,
    ) -> Self {
        Self {
            key: entry.key,
            name: entry.name,
            variants: entry.variants,
            metadata,
            metadata_source,
        }
    }

    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.variants.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_metadata_accepts_catalog_and_source_terms() {
        let sheet = SheetMetadata {
            rarity: Some("rara".to_string()),
            card_type: Some("Event".to_string()),
            aspects: vec!["Heroism".to_string(), "mando".to_string()],
            cost: Some(3),
            ..SheetMetadata::default()
        };
        let metadata = EnrichedCardMetadata::from_sheet(&sheet);
        assert_eq!(metadata.rarity, Some(Translation::Known(Rarity::Rare)));
        assert_eq!(metadata.card_type, Some(Translation::Known(CardType::Event)));
        assert_eq!(
            metadata.aspects,
            vec![
                Translation::Known(Aspect::Heroism),
                Translation::Known(Aspect::Command)
            ]
        );
        assert!(metadata.untranslated().is_empty());
    }

    #[test]
    fn untranslated_lists_every_unknown_field() {
        let sheet = SheetMetadata {
            rarity: Some("Mythic".to_string()),
            aspects: vec!["Chaos".to_string()],
            ..SheetMetadata::default()
        };
        let metadata = EnrichedCardMetadata::from_sheet(&sheet);
        assert_eq!(
            metadata.untranslated(),
            vec!["rarity=mythic".to_string(), "aspect=chaos".to_string()]
        );
    }
}
