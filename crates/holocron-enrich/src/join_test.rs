use holocron_core::{Aspect, CardType, Rarity, SheetMetadata, Translation, VariantName};

use super::*;
use crate::types::RawExternalCard;

fn entry(set: &str, number: &str, name: &str, normal: u32) -> AggregatedInventoryEntry {
    AggregatedInventoryEntry {
        key: CardKey::resolve(set, number).unwrap(),
        name: name.to_string(),
        variants: VariantQuantities::default().with(VariantName::Normal, normal),
        sheet_metadata: None,
    }
}

fn external(set: &str, number: &str, name: &str, rarity: &str) -> RawExternalCard {
    RawExternalCard {
        set_code: set.to_string(),
        card_number: number.to_string(),
        name: name.to_string(),
        subtitle: None,
        rarity: Some(rarity.to_string()),
        card_type: Some("Unit".to_string()),
        aspects: vec!["Heroism".to_string()],
        cost: Some(2),
        power: Some(2),
        hp: Some(3),
        attribute_count: 9,
    }
}

#[test]
fn external_match_takes_precedence_over_sheet() {
    let mut owned = entry("sor", "5", "Luke", 1);
    owned.sheet_metadata = Some(SheetMetadata {
        rarity: Some("comun".to_string()),
        ..SheetMetadata::default()
    });
    let index = CardIndex::build(vec![external("sor", "005", "Luke Skywalker", "Rare")]);

    let outcome = join(vec![owned], Some(&index));
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.unmatched, 0);
    let record = &outcome.records[0];
    assert_eq!(record.metadata_source, MetadataSource::External);
    assert_eq!(record.metadata.rarity, Some(Translation::Known(Rarity::Rare)));
    assert_eq!(record.metadata.card_type, Some(Translation::Known(CardType::Unit)));
    assert_eq!(record.metadata.aspects, vec![Translation::Known(Aspect::Heroism)]);
    assert_eq!(record.name, "Luke", "inventory name is kept");
}

#[test]
fn sheet_metadata_is_the_fallback() {
    let mut owned = entry("shd", "45", "Cad Bane", 2);
    owned.sheet_metadata = Some(SheetMetadata {
        rarity: Some("Legendary".to_string()),
        card_type: Some("unidad".to_string()),
        ..SheetMetadata::default()
    });

    let outcome = join(vec![owned, entry("shd", "46", "Bo-Katan", 1)], Some(&CardIndex::default()));
    assert_eq!(outcome.matched, 0);
    assert_eq!(outcome.unmatched, 2);
    assert_eq!(outcome.from_sheet, 1);
    assert_eq!(outcome.records[0].metadata_source, MetadataSource::Spreadsheet);
    assert_eq!(
        outcome.records[0].metadata.rarity,
        Some(Translation::Known(Rarity::Legendary))
    );
    assert_eq!(outcome.records[1].metadata_source, MetadataSource::None);
    assert!(outcome.records[1].metadata.is_empty());
}

#[test]
fn no_index_means_every_entry_is_unmatched() {
    let outcome = join(vec![entry("sor", "1", "Krennic", 1)], None);
    assert_eq!(outcome.unmatched, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].total_quantity(), 1);
}

#[test]
fn untranslated_values_are_reported_with_their_key() {
    let index = CardIndex::build(vec![external("sor", "1", "Krennic", "Starter")]);
    let outcome = join(vec![entry("sor", "1", "Krennic", 1)], Some(&index));
    assert_eq!(
        outcome.untranslated,
        vec![UntranslatedValue {
            key: CardKey::resolve("sor", "1").unwrap(),
            value: "rarity=starter".to_string(),
        }]
    );
}

#[test]
fn empty_inventory_name_takes_external_name() {
    let index = CardIndex::build(vec![external("sor", "1", "Director Krennic", "Common")]);
    let outcome = join(vec![entry("sor", "1", "", 1)], Some(&index));
    assert_eq!(outcome.records[0].name, "Director Krennic");
}

#[test]
fn seeding_adds_only_unowned_cards_with_zero_quantity() {
    let index = CardIndex::build(vec![
        external("sor", "1", "Krennic", "Common"),
        external("sor", "3", "Chirrut", "Rare"),
        external("sor", "2", "Iden", "Common"),
    ]);
    let mut outcome = join(vec![entry("sor", "1", "Krennic", 2)], Some(&index));

    let added = seed_reference(&mut outcome, &index);
    assert_eq!(added, 2);
    assert_eq!(outcome.records.len(), 3);
    let seeded: Vec<String> = outcome.records[1..].iter().map(|r| r.key.to_string()).collect();
    assert_eq!(seeded, vec!["sor-002", "sor-003"]);
    assert!(outcome.records[1..].iter().all(|r| r.total_quantity() == 0));
    assert_eq!(outcome.matched, 1, "seeding does not change match counts");
}
