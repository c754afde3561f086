use holocron_core::{Aspect, CardType, EnrichedCardMetadata, Rarity};

use crate::types::RawExternalCard;

/// Maps an external card's attributes into catalog vocabulary.
#[must_use]
pub fn translate_card(card: &RawExternalCard) -> EnrichedCardMetadata {
    EnrichedCardMetadata {
        subtitle: card.subtitle.clone(),
        rarity: card.rarity.as_deref().map(Rarity::translate),
        card_type: card.card_type.as_deref().map(CardType::translate),
        aspects: card.aspects.iter().map(|a| Aspect::translate(a)).collect(),
        cost: card.cost,
        power: card.power,
        hp: card.hp,
    }
}
