use crate::CheckId;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LocationKind {
    Region,
    Boss,
}

/// A gameplay milestone that is reported to the coordinator as a check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub id: u32,
    /// Region display name or boss target name, as the game reports it.
    pub name: &'static str,
    pub action: &'static str,
    pub kind: LocationKind,
}

impl Location {
    pub fn check_id(&self) -> CheckId {
        CheckId::from(self.id)
    }

    pub fn check_name(&self) -> String {
        format!("{} {}", self.action, self.name)
    }
}

const fn region(id: u32, name: &'static str) -> Location {
    Location {
        id,
        name,
        action: "Enter",
        kind: LocationKind::Region,
    }
}

const fn boss(id: u32, name: &'static str) -> Location {
    Location {
        id,
        name,
        action: "Defeat",
        kind: LocationKind::Boss,
    }
}

pub const LOCATIONS: &[Location] = &[
    region(1000, "Windshear Waste"),
    region(1001, "Southern Shelf"),
    region(1002, "Southern Shelf - Bay"),
    region(1003, "Three Horns - Divide"),
    region(1004, "Sanctuary"),
    region(1005, "Three Horns - Valley"),
    region(1006, "Frostburn Canyon"),
    region(1007, "Fink's Slaughterhouse"),
    region(1008, "The Dust"),
    region(1009, "Bloodshot Stronghold"),
    region(1010, "Bloodshot Ramparts"),
    region(1011, "Tundra Express"),
    region(1012, "The Fridge"),
    region(1013, "The Highlands"),
    region(1014, "Thousand Cuts"),
    region(1015, "Lynchwood"),
    region(1016, "Opportunity"),
    region(1017, "Wildlife Exploitation Preserve"),
    region(1018, "Eridium Blight"),
    region(1019, "Hero's Pass"),
    region(1020, "Vault of the Warrior"),
    boss(2000, "Knuckle Dragger"),
    boss(2001, "Boom Bewm"),
    boss(2002, "Captain Flynt"),
    boss(2003, "Bad Maw"),
    boss(2004, "Incinerator Clayton"),
    boss(2005, "Mordecai's Bloodwing"),
    boss(2006, "W4R-D3N"),
    boss(2007, "Savage Lee"),
    boss(2008, "Wilhelm"),
    boss(2009, "Deputy Winger"),
    boss(2010, "Sheriff of Lynchwood"),
    boss(2011, "Saturn"),
    boss(2012, "Handsome Jack"),
    boss(2013, "The Warrior"),
];

pub fn find_region(area: &str) -> Option<&'static Location> {
    find(LocationKind::Region, area)
}

pub fn find_boss(name: &str) -> Option<&'static Location> {
    find(LocationKind::Boss, name)
}

fn find(kind: LocationKind, name: &str) -> Option<&'static Location> {
    LOCATIONS
        .iter()
        .find(|loc| loc.kind == kind && loc.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for loc in LOCATIONS {
            assert!(seen.insert(loc.id), "duplicate location id {}", loc.id);
        }
    }

    #[test]
    fn region_and_boss_lookups_do_not_cross() {
        let shelf = find_region("Southern Shelf").unwrap();
        assert_eq!(shelf.check_id(), CheckId::new("1001"));
        assert_eq!(shelf.check_name(), "Enter Southern Shelf");

        let flynt = find_boss("Captain Flynt").unwrap();
        assert_eq!(flynt.check_name(), "Defeat Captain Flynt");

        assert!(find_boss("Southern Shelf").is_none());
        assert!(find_region("Captain Flynt").is_none());
    }
}
