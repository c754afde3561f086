use crate::card_key::CardKey;
use crate::variants::VariantQuantities;

/// Metadata columns an already-enriched export may carry alongside quantities.
///
/// Values are raw cell text; translation happens when the catalog record is
/// built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetMetadata {
    pub rarity: Option<String>,
    pub card_type: Option<String>,
    pub aspects: Vec<String>,
    pub cost: Option<u32>,
    pub power: Option<u32>,
    pub hp: Option<u32>,
}

impl SheetMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rarity.is_none()
            && self.card_type.is_none()
            && self.aspects.is_empty()
            && self.cost.is_none()
            && self.power.is_none()
            && self.hp.is_none()
    }
}

/// One data row read from an inventory spreadsheet, before key resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    /// 1-based spreadsheet row, for diagnostics.
    pub line: usize,
    pub raw_set_label: String,
    pub raw_card_number: String,
    pub name: String,
    pub variants: VariantQuantities,
    pub sheet_metadata: Option<SheetMetadata>,
}

/// All rows sharing one [`CardKey`], merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedInventoryEntry {
    pub key: CardKey,
    /// First non-empty name seen for the key.
    pub name: String,
    pub variants: VariantQuantities,
    pub sheet_metadata: Option<SheetMetadata>,
}

impl AggregatedInventoryEntry {
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.variants.total()
    }
}
