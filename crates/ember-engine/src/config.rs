//! Engine configuration.
//!
//! Provides the run parameters, the starting scenario and the gameplay
//! tunables. Configuration is loaded from and saved to a TOML file.

use ember_common::{AbilityId, ItemId, MonsterId};
use ember_gameplay::{Attribute, Attributes, GameplayConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "ember.toml";

/// Player setup at the start of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    /// Base attributes
    pub attributes: Attributes,
    /// Starting level
    pub level: u32,
    /// Abilities assigned to slots 0, 1, 2, ...
    pub abilities: Vec<AbilityId>,
    /// Items placed in the inventory
    pub items: Vec<StartingItem>,
    /// Items equipped after the inventory is filled
    pub equip: Vec<ItemId>,
    /// Attribute that receives level-up points
    pub focus: Attribute,
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            attributes: Attributes::default(),
            level: 1,
            abilities: Vec::new(),
            items: Vec::new(),
            equip: Vec::new(),
            focus: Attribute::Strength,
        }
    }
}

/// An inventory entry of the player setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartingItem {
    /// Item id
    pub item: ItemId,
    /// Units
    #[serde(default = "one")]
    pub quantity: u32,
}

const fn one() -> u32 {
    1
}

/// An enemy placed at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Monster id
    pub monster: MonsterId,
    /// Ground position `[x, y, z]`
    pub position: [f32; 3],
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Run Settings ===
    /// Simulation steps per second
    pub tick_rate: u32,
    /// Simulated seconds before the run stops
    pub duration_secs: f32,
    /// Pace the loop to wall-clock time instead of running flat out
    pub realtime: bool,
    /// RNG seed (None = random)
    pub seed: Option<u64>,

    // === Content ===
    /// Directory holding items.toml, abilities.toml and monsters.toml
    pub content_dir: PathBuf,

    // === Debug Settings ===
    /// Default tracing filter (overridden by `RUST_LOG`)
    pub log_filter: String,

    // === Scenario ===
    /// Player setup
    pub player: PlayerSetup,
    /// Enemy spawn points
    #[serde(rename = "spawn")]
    pub spawns: Vec<SpawnPoint>,

    // === Gameplay Settings ===
    /// Gameplay tunables
    pub gameplay: GameplayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            duration_secs: 30.0,
            realtime: false,
            seed: None,
            content_dir: PathBuf::from("assets/content"),
            log_filter: "ember=info".to_string(),
            player: PlayerSetup::default(),
            spawns: Vec::new(),
            gameplay: GameplayConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        config.validate();
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(1, 1000);
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            self.duration_secs = 0.0;
        }
        self.player.level = self.player.level.max(1);
        self.gameplay = self.gameplay.clone().sanitized();
    }

    /// Length of one simulation step in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Total number of steps in the run.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (f64::from(self.duration_secs) * f64::from(self.tick_rate.max(1))).round() as u64
    }

    /// Resolves the content directory against the config file's directory.
    #[must_use]
    pub fn content_path(&self, config_path: &Path) -> PathBuf {
        if self.content_dir.is_absolute() {
            return self.content_dir.clone();
        }
        config_path
            .parent()
            .map_or_else(|| self.content_dir.clone(), |dir| dir.join(&self.content_dir))
    }
}
