/// Numeric item identifier used in inbound unlock files.
pub type ItemId = u32;

/// What the game layer has to materialise for an unlock.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ItemKind {
    Weapon,
    Shield,
    GrenadeMod,
    ClassMod,
    Artifact,
    SkillPoint,
    SkillTreeTier,
    FastTravel(&'static str),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: &'static str,
    pub kind: ItemKind,
    pub rarity: Option<Rarity>,
}

pub const ITEM_CATALOG: &[ItemDef] = &[
    ItemDef {
        id: 1,
        name: "Skill Point",
        kind: ItemKind::SkillPoint,
        rarity: None,
    },
    ItemDef {
        id: 2,
        name: "Skill Tree Tier",
        kind: ItemKind::SkillTreeTier,
        rarity: None,
    },
    ItemDef {
        id: 10,
        name: "Common Weapon",
        kind: ItemKind::Weapon,
        rarity: Some(Rarity::Common),
    },
    ItemDef {
        id: 11,
        name: "Uncommon Weapon",
        kind: ItemKind::Weapon,
        rarity: Some(Rarity::Uncommon),
    },
    ItemDef {
        id: 12,
        name: "Rare Weapon",
        kind: ItemKind::Weapon,
        rarity: Some(Rarity::Rare),
    },
    ItemDef {
        id: 13,
        name: "Very Rare Weapon",
        kind: ItemKind::Weapon,
        rarity: Some(Rarity::VeryRare),
    },
    ItemDef {
        id: 14,
        name: "Legendary Weapon",
        kind: ItemKind::Weapon,
        rarity: Some(Rarity::Legendary),
    },
    ItemDef {
        id: 20,
        name: "Rare Shield",
        kind: ItemKind::Shield,
        rarity: Some(Rarity::Rare),
    },
    ItemDef {
        id: 21,
        name: "Legendary Shield",
        kind: ItemKind::Shield,
        rarity: Some(Rarity::Legendary),
    },
    ItemDef {
        id: 30,
        name: "Rare Grenade Mod",
        kind: ItemKind::GrenadeMod,
        rarity: Some(Rarity::Rare),
    },
    ItemDef {
        id: 31,
        name: "Legendary Grenade Mod",
        kind: ItemKind::GrenadeMod,
        rarity: Some(Rarity::Legendary),
    },
    ItemDef {
        id: 40,
        name: "Rare Class Mod",
        kind: ItemKind::ClassMod,
        rarity: Some(Rarity::Rare),
    },
    ItemDef {
        id: 41,
        name: "Legendary Class Mod",
        kind: ItemKind::ClassMod,
        rarity: Some(Rarity::Legendary),
    },
    ItemDef {
        id: 50,
        name: "Rare Relic",
        kind: ItemKind::Artifact,
        rarity: Some(Rarity::Rare),
    },
    ItemDef {
        id: 51,
        name: "Legendary Relic",
        kind: ItemKind::Artifact,
        rarity: Some(Rarity::Legendary),
    },
    // Fast travel stations, keyed by their in-game display name.
    ItemDef {
        id: 100,
        name: "Fast Travel: Sanctuary",
        kind: ItemKind::FastTravel("Sanctuary"),
        rarity: None,
    },
    ItemDef {
        id: 101,
        name: "Fast Travel: Three Horns - Divide",
        kind: ItemKind::FastTravel("Three Horns - Divide"),
        rarity: None,
    },
    ItemDef {
        id: 102,
        name: "Fast Travel: Frostburn Canyon",
        kind: ItemKind::FastTravel("Frostburn Canyon"),
        rarity: None,
    },
    ItemDef {
        id: 103,
        name: "Fast Travel: The Dust",
        kind: ItemKind::FastTravel("The Dust"),
        rarity: None,
    },
    ItemDef {
        id: 104,
        name: "Fast Travel: Bloodshot Stronghold",
        kind: ItemKind::FastTravel("Bloodshot Stronghold"),
        rarity: None,
    },
    ItemDef {
        id: 105,
        name: "Fast Travel: Tundra Express",
        kind: ItemKind::FastTravel("Tundra Express"),
        rarity: None,
    },
    ItemDef {
        id: 106,
        name: "Fast Travel: Opportunity",
        kind: ItemKind::FastTravel("Opportunity"),
        rarity: None,
    },
];

pub fn find_item(id: ItemId) -> Option<&'static ItemDef> {
    ITEM_CATALOG.iter().find(|item| item.id == id)
}

impl ItemKind {
    /// Loot that is spawned into the world or inventory, as opposed to
    /// progression flags flipped on the player.
    pub fn is_gear(self) -> bool {
        matches!(
            self,
            ItemKind::Weapon
                | ItemKind::Shield
                | ItemKind::GrenadeMod
                | ItemKind::ClassMod
                | ItemKind::Artifact
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = HashSet::new();
        for item in ITEM_CATALOG {
            assert!(seen.insert(item.id), "duplicate item id {}", item.id);
        }
    }

    #[test]
    fn lookup_resolves_kind_once() {
        let relic = find_item(51).unwrap();
        assert_eq!(relic.kind, ItemKind::Artifact);
        assert!(relic.kind.is_gear());

        let station = find_item(100).unwrap();
        assert_eq!(station.kind, ItemKind::FastTravel("Sanctuary"));
        assert!(!station.kind.is_gear());

        assert!(find_item(9999).is_none());
    }
}
