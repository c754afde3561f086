//! Catalog vocabulary for rarity, card type and aspect.
//!
//! The external card database speaks English (`"Legendary"`, `"Unit"`,
//! `"Heroism"`); the catalog stores the collection's own terms. Values with
//! no table entry are kept lowercased as [`Translation::Untranslated`] so the
//! caller can report them instead of silently defaulting.

use serde::{Deserialize, Serialize};

/// Result of mapping a source value into catalog vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Translation<T> {
    Known(T),
    Untranslated(String),
}

impl<T> Translation<T> {
    #[must_use]
    pub fn is_untranslated(&self) -> bool {
        matches!(self, Translation::Untranslated(_))
    }
}

impl<T: Copy + Into<&'static str>> Translation<T> {
    /// The string that is written to the catalog.
    #[must_use]
    pub fn as_catalog_str(&self) -> &str {
        match self {
            Translation::Known(term) => (*term).into(),
            Translation::Untranslated(raw) => raw,
        }
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $term:literal <= [$($source:literal),+ $(,)?]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $term)] $variant),+
        }

        impl $name {
            /// Catalog term for this value.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $term),+
                }
            }

            /// Parses a catalog term (as stored in the database).
            #[must_use]
            pub fn from_catalog(term: &str) -> Option<Self> {
                match term {
                    $($term => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Translates a value from the external card database.
            #[must_use]
            pub fn translate(source: &str) -> Translation<Self> {
                let trimmed = source.trim();
                $(
                    if [$($source),+].iter().any(|s| s.eq_ignore_ascii_case(trimmed)) {
                        return Translation::Known($name::$variant);
                    }
                )+
                if let Some(known) = Self::from_catalog(&trimmed.to_lowercase()) {
                    return Translation::Known(known);
                }
                Translation::Untranslated(trimmed.to_lowercase())
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    Rarity {
        Common => "comun" <= ["Common"],
        Uncommon => "infrecuente" <= ["Uncommon"],
        Rare => "rara" <= ["Rare"],
        Legendary => "legendaria" <= ["Legendary"],
        Special => "especial" <= ["Special"],
    }
}

vocabulary! {
    /// Bases are filed with leaders, matching how the collection groups them.
    CardType {
        Unit => "unidad" <= ["Unit", "Token Unit"],
        Leader => "unidad_lider" <= ["Leader", "Base"],
        Event => "evento" <= ["Event"],
        Upgrade => "mejora" <= ["Upgrade", "Token Upgrade"],
    }
}

vocabulary! {
    Aspect {
        Heroism => "heroismo" <= ["Heroism"],
        Villainy => "maldad" <= ["Villainy"],
        Command => "mando" <= ["Command"],
        Vigilance => "vigilancia" <= ["Vigilance"],
        Cunning => "astucia" <= ["Cunning"],
        Aggression => "agresividad" <= ["Aggression"],
        Neutral => "incoloro" <= ["Neutral"],
    }
}
