//! Content table loading.
//!
//! Reads `items.toml`, `abilities.toml` and `monsters.toml` from the content
//! directory into a validated [`ContentCatalog`]. Each file is a list of
//! tables (`[[item]]`, `[[ability]]`, `[[monster]]`). A missing file is
//! treated as an empty table.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ember_gameplay::{
    AbilityDefinition, CatalogError, ContentCatalog, ItemDefinition, MonsterDefinition,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Item table file name.
pub const ITEMS_FILE: &str = "items.toml";
/// Ability table file name.
pub const ABILITIES_FILE: &str = "abilities.toml";
/// Monster table file name.
pub const MONSTERS_FILE: &str = "monsters.toml";

/// Content loading errors.
#[derive(Debug, Error)]
pub enum ContentLoadError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// File is not a valid table
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
    /// Tables parsed but do not form a consistent catalog
    #[error("Invalid content: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for content loading.
pub type ContentResult<T> = Result<T, ContentLoadError>;

#[derive(Default, Deserialize)]
struct ItemTable {
    #[serde(default)]
    item: Vec<ItemDefinition>,
}

#[derive(Default, Deserialize)]
struct AbilityTable {
    #[serde(default)]
    ability: Vec<AbilityDefinition>,
}

#[derive(Default, Deserialize)]
struct MonsterTable {
    #[serde(default)]
    monster: Vec<MonsterDefinition>,
}

fn load_table<T: DeserializeOwned + Default>(path: &Path) -> ContentResult<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Content file {} not found, treating as empty", path.display());
            return Ok(T::default());
        },
        Err(source) => {
            return Err(ContentLoadError::Read {
                path: path.to_path_buf(),
                source,
            })
        },
    };
    toml::from_str(&contents).map_err(|source| ContentLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and validates every content table in `dir`.
pub fn load_catalog(dir: &Path) -> ContentResult<ContentCatalog> {
    let items: ItemTable = load_table(&dir.join(ITEMS_FILE))?;
    let abilities: AbilityTable = load_table(&dir.join(ABILITIES_FILE))?;
    let monsters: MonsterTable = load_table(&dir.join(MONSTERS_FILE))?;

    let catalog = ContentCatalog::from_definitions(items.item, abilities.ability, monsters.monster)?;
    info!("Loaded content from {}", dir.display());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::{AbilityId, ItemId, MonsterId};
    use ember_gameplay::{EquipSlot, TargetKind};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).expect("write content file");
    }

    #[test]
    fn test_load_full_catalog() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write(
            temp_dir.path(),
            ITEMS_FILE,
            r#"
            [[item]]
            id = 1
            name = "Slime Gel"
            kind = "Material"

            [[item]]
            id = 2
            name = "Greatsword"
            kind = "Weapon"
            equip_slot = "TwoHanded"
            stackable = false
            bonuses = { min_physical_damage = 4.0, max_physical_damage = 7.0 }
            "#,
        );
        write(
            temp_dir.path(),
            ABILITIES_FILE,
            r#"
            [[ability]]
            id = 1
            name = "Firebolt"
            kind = "Damage"
            target = "SingleTarget"
            damage_kind = "Magical"
            base_value = 8.0
            damage_scalings = [{ stat = "Spirit", factor = 1.5 }]
            projectile = { speed = 12.0 }
            "#,
        );
        write(
            temp_dir.path(),
            MONSTERS_FILE,
            r#"
            [[monster]]
            id = 1
            name = "Slime"
            experience = 15.0
            loot = [{ item = 1, chance = 0.5, min_quantity = 1, max_quantity = 3 }]

            [monster.attributes]
            constitution = 6
            "#,
        );

        let catalog = load_catalog(temp_dir.path()).expect("valid content");
        let sword = catalog.item(ItemId::new(2)).expect("sword");
        assert_eq!(sword.equip_slot, Some(EquipSlot::TwoHanded));
        assert_eq!(sword.bonuses.max_physical_damage, 7.0);

        let bolt = catalog.ability(AbilityId::new(1)).expect("bolt");
        assert_eq!(bolt.target, TargetKind::SingleTarget);
        assert_eq!(bolt.damage_scalings.len(), 1);
        assert_eq!(bolt.projectile.and_then(|p| p.speed), Some(12.0));

        let slime = catalog.monster(MonsterId::new(1)).expect("slime");
        assert_eq!(slime.attributes.constitution, 6);
        assert_eq!(slime.attributes.strength, 10);
        assert_eq!(slime.loot.entries()[0].max_quantity, 3);
    }

    #[test]
    fn test_shipped_content_is_valid() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/content");
        let catalog = load_catalog(&dir).expect("shipped content loads");
        assert!(catalog.monsters().count() >= 3);
        assert_eq!(
            catalog.ability(AbilityId::new(3)).expect("mend").target,
            TargetKind::Caster
        );
    }

    #[test]
    fn test_missing_files_are_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let catalog = load_catalog(temp_dir.path()).expect("empty content");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write(temp_dir.path(), ITEMS_FILE, "[[item]]\nname = \"No id\"\n");
        let err = load_catalog(temp_dir.path()).expect_err("id is required");
        assert!(matches!(err, ContentLoadError::Parse { ref path, .. } if path.ends_with(ITEMS_FILE)));
    }

    #[test]
    fn test_dangling_loot_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write(
            temp_dir.path(),
            MONSTERS_FILE,
            r#"
            [[monster]]
            id = 1
            name = "Slime"
            loot = [{ item = 42, chance = 1.0 }]
            "#,
        );
        let err = load_catalog(temp_dir.path()).expect_err("item 42 missing");
        assert!(matches!(err, ContentLoadError::Catalog(CatalogError::MissingReference { .. })));
    }
}
