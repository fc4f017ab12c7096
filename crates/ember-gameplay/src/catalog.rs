//! Content catalog.
//!
//! Read-only lookup of item, ability and monster definitions by id.

use std::collections::BTreeMap;

use ember_common::{AbilityId, DefinitionRef, EmberError, EmberResult, ItemId, MonsterId};
use thiserror::Error;
use tracing::{info, warn};

use crate::abilities::{AbilityDefinition, AbilityRef};
use crate::enemy::{MonsterDefinition, MonsterRef};
use crate::items::{ItemDefinition, ItemKind, ItemRef};

/// Catalog error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two definitions share an id
    #[error("Duplicate definition: {0}")]
    Duplicate(DefinitionRef),
    /// A definition refers to one that does not exist
    #[error("{owner} refers to missing {missing}")]
    MissingReference {
        /// Definition holding the reference
        owner: DefinitionRef,
        /// Definition not found
        missing: DefinitionRef,
    },
    /// A definition has unusable values
    #[error("Invalid {definition}: {reason}")]
    Invalid {
        /// Offending definition
        definition: DefinitionRef,
        /// What is wrong
        reason: String,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// All static content definitions.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    items: BTreeMap<ItemId, ItemRef>,
    abilities: BTreeMap<AbilityId, AbilityRef>,
    monsters: BTreeMap<MonsterId, MonsterRef>,
}

impl ContentCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and validates a catalog from definition lists.
    pub fn from_definitions(
        items: Vec<ItemDefinition>,
        abilities: Vec<AbilityDefinition>,
        monsters: Vec<MonsterDefinition>,
    ) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert_item(item)?;
        }
        for ability in abilities {
            catalog.insert_ability(ability)?;
        }
        for monster in monsters {
            catalog.insert_monster(monster)?;
        }
        catalog.validate()?;
        info!(
            items = catalog.items.len(),
            abilities = catalog.abilities.len(),
            monsters = catalog.monsters.len(),
            "Content catalog built"
        );
        Ok(catalog)
    }

    /// Adds an item definition.
    pub fn insert_item(&mut self, item: ItemDefinition) -> CatalogResult<ItemRef> {
        if self.items.contains_key(&item.id) {
            return Err(CatalogError::Duplicate(DefinitionRef::Item(item.id)));
        }
        if matches!(item.kind, ItemKind::Weapon | ItemKind::Armor) && item.equip_slot.is_none() {
            warn!(item = %item.id, name = %item.name, "Equipment item has no equip slot");
        }
        let item = item.into_ref();
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    /// Adds an ability definition.
    pub fn insert_ability(&mut self, ability: AbilityDefinition) -> CatalogResult<AbilityRef> {
        if self.abilities.contains_key(&ability.id) {
            return Err(CatalogError::Duplicate(DefinitionRef::Ability(ability.id)));
        }
        let ability = ability.into_ref();
        self.abilities.insert(ability.id, ability.clone());
        Ok(ability)
    }

    /// Adds a monster definition.
    pub fn insert_monster(&mut self, monster: MonsterDefinition) -> CatalogResult<MonsterRef> {
        if self.monsters.contains_key(&monster.id) {
            return Err(CatalogError::Duplicate(DefinitionRef::Monster(monster.id)));
        }
        let monster = monster.into_ref();
        self.monsters.insert(monster.id, monster.clone());
        Ok(monster)
    }

    /// Checks cross-references and value ranges.
    pub fn validate(&self) -> CatalogResult<()> {
        for monster in self.monsters.values() {
            let owner = DefinitionRef::Monster(monster.id);
            for entry in monster.loot.entries() {
                if !self.items.contains_key(&entry.item) {
                    return Err(CatalogError::MissingReference {
                        owner,
                        missing: DefinitionRef::Item(entry.item),
                    });
                }
                if !(0.0..=1.0).contains(&entry.chance) {
                    return Err(CatalogError::Invalid {
                        definition: owner,
                        reason: format!("drop chance {} outside [0, 1]", entry.chance),
                    });
                }
            }
        }

        for ability in self.abilities.values() {
            let Some(spec) = ability.projectile else {
                continue;
            };
            let non_positive = |value: Option<f32>| value.is_some_and(|v| v.is_nan() || v <= 0.0);
            if non_positive(spec.speed) || non_positive(spec.lifetime) {
                return Err(CatalogError::Invalid {
                    definition: DefinitionRef::Ability(ability.id),
                    reason: "projectile speed and lifetime must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Item by id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&ItemRef> {
        self.items.get(&id)
    }

    /// Ability by id.
    #[must_use]
    pub fn ability(&self, id: AbilityId) -> Option<&AbilityRef> {
        self.abilities.get(&id)
    }

    /// Monster by id.
    #[must_use]
    pub fn monster(&self, id: MonsterId) -> Option<&MonsterRef> {
        self.monsters.get(&id)
    }

    /// Item by id, or a missing-definition error.
    pub fn require_item(&self, id: ItemId) -> EmberResult<ItemRef> {
        self.item(id)
            .cloned()
            .ok_or(EmberError::MissingDefinition(DefinitionRef::Item(id)))
    }

    /// Ability by id, or a missing-definition error.
    pub fn require_ability(&self, id: AbilityId) -> EmberResult<AbilityRef> {
        self.ability(id)
            .cloned()
            .ok_or(EmberError::MissingDefinition(DefinitionRef::Ability(id)))
    }

    /// Monster by id, or a missing-definition error.
    pub fn require_monster(&self, id: MonsterId) -> EmberResult<MonsterRef> {
        self.monster(id)
            .cloned()
            .ok_or(EmberError::MissingDefinition(DefinitionRef::Monster(id)))
    }

    /// Every item, ordered by id.
    pub fn items(&self) -> impl Iterator<Item = &ItemRef> {
        self.items.values()
    }

    /// Every ability, ordered by id.
    pub fn abilities(&self) -> impl Iterator<Item = &AbilityRef> {
        self.abilities.values()
    }

    /// Every monster, ordered by id.
    pub fn monsters(&self) -> impl Iterator<Item = &MonsterRef> {
        self.monsters.values()
    }

    /// Checks if the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.abilities.is_empty() && self.monsters.is_empty()
    }
}
