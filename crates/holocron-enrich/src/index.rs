use std::collections::HashMap;

use holocron_core::CardKey;

use crate::types::RawExternalCard;

/// External cards keyed by canonical card key.
#[derive(Debug, Clone, Default)]
pub struct CardIndex {
    cards: HashMap<CardKey, RawExternalCard>,
}

impl CardIndex {
    /// Indexes `cards` by canonical key.
    ///
    /// When two cards share a key the later one replaces the earlier only if
    /// it carries strictly more attributes. Cards whose key cannot be
    /// resolved are skipped.
    #[must_use]
    pub fn build(cards: Vec<RawExternalCard>) -> Self {
        let mut index: HashMap<CardKey, RawExternalCard> = HashMap::with_capacity(cards.len());
        for card in cards {
            let Ok(key) = card.key() else {
                tracing::debug!(set = %card.set_code, number = %card.card_number, "external card has no usable key");
                continue;
            };
            match index.get(&key) {
                Some(existing) if existing.attribute_count >= card.attribute_count => {}
                _ => {
                    index.insert(key, card);
                }
            }
        }
        Self { cards: index }
    }

    #[must_use]
    pub fn get(&self, key: &CardKey) -> Option<&RawExternalCard> {
        self.cards.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CardKey, &RawExternalCard)> {
        self.cards.iter()
    }
}
