//! Fixed shop catalogs for cosmetic items.
//!
//! # Responsibility
//! - Declare the purchasable theme, border and sound-cue items.
//! - Provide catalog lookups keyed by item category.
//!
//! # Invariants
//! - Item ids are unique across all three catalogs.
//! - Catalogs are static; owned/equipped state lives in the aggregate.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Cosmetic item category. At most one item per category may be equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Theme,
    Border,
    Sound,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 3] = [
        ItemCategory::Theme,
        ItemCategory::Border,
        ItemCategory::Sound,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemCategory::Theme => "theme",
            ItemCategory::Border => "border",
            ItemCategory::Sound => "sound",
        }
    }
}

impl Display for ItemCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One purchasable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: i64,
}

pub const THEME_ITEMS: &[ShopItem] = &[
    ShopItem {
        id: "theme_dark",
        name: "Dark Mode",
        price: 60,
    },
    ShopItem {
        id: "theme_forest",
        name: "Forest",
        price: 120,
    },
    ShopItem {
        id: "theme_ocean",
        name: "Ocean",
        price: 120,
    },
    ShopItem {
        id: "theme_midnight",
        name: "Midnight",
        price: 180,
    },
];

pub const BORDER_ITEMS: &[ShopItem] = &[
    ShopItem {
        id: "border_bronze",
        name: "Bronze Frame",
        price: 80,
    },
    ShopItem {
        id: "border_silver",
        name: "Silver Frame",
        price: 140,
    },
    ShopItem {
        id: "border_gold",
        name: "Gold Frame",
        price: 220,
    },
];

pub const SOUND_ITEMS: &[ShopItem] = &[
    ShopItem {
        id: "sound_chime",
        name: "Soft Chime",
        price: 60,
    },
    ShopItem {
        id: "sound_bells",
        name: "Victory Bells",
        price: 100,
    },
    ShopItem {
        id: "sound_retro",
        name: "Retro Blip",
        price: 100,
    },
];

/// Returns the catalog for one category.
pub fn catalog(category: ItemCategory) -> &'static [ShopItem] {
    match category {
        ItemCategory::Theme => THEME_ITEMS,
        ItemCategory::Border => BORDER_ITEMS,
        ItemCategory::Sound => SOUND_ITEMS,
    }
}

/// Looks up one item by category and id.
pub fn find_item(category: ItemCategory, item_id: &str) -> Option<&'static ShopItem> {
    catalog(category).iter().find(|item| item.id == item_id)
}
