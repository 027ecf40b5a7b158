//! Startup asset loading. Every document here is read once and is fatal on
//! failure — §7's "Asset load" taxonomy: tilemap or harbors file
//! missing/invalid aborts the process before the tick starts.

use anyhow::{Context, Result};

use game_world::{Config, HarborRegistry, RewardTable, RoleTable, ShipClassTable, TerrainMap};

use crate::cli::Args;

pub struct Assets {
    pub terrain: TerrainMap,
    pub classes: ShipClassTable,
    pub roles: RoleTable,
    pub harbors: HarborRegistry,
    pub rewards: RewardTable,
    pub config: Config,
}

pub fn load(args: &Args) -> Result<Assets> {
    let terrain_json = std::fs::read_to_string(&args.world_map)
        .with_context(|| format!("reading world map from {}", args.world_map))?;
    let terrain = TerrainMap::from_json(&terrain_json)
        .with_context(|| format!("parsing world map {}", args.world_map))?;

    let classes_json = std::fs::read_to_string(&args.ship_classes)
        .with_context(|| format!("reading ship class table from {}", args.ship_classes))?;
    let classes = ShipClassTable::from_json(&classes_json)
        .with_context(|| format!("parsing ship class table {}", args.ship_classes))?;

    let roles_json = std::fs::read_to_string(&args.roles)
        .with_context(|| format!("reading role table from {}", args.roles))?;
    let roles = RoleTable::from_json(&roles_json)
        .with_context(|| format!("parsing role table {}", args.roles))?;

    let harbors_json = std::fs::read_to_string(&args.harbors)
        .with_context(|| format!("reading harbor registry from {}", args.harbors))?;
    let harbors = HarborRegistry::from_json(&harbors_json)
        .with_context(|| format!("parsing harbor registry {}", args.harbors))?;

    let rewards_json = std::fs::read_to_string(&args.rewards)
        .with_context(|| format!("reading reward table from {}", args.rewards))?;
    let rewards = RewardTable::from_json(&rewards_json)
        .with_context(|| format!("parsing reward table {}", args.rewards))?;

    // The tuning config is the one asset that is allowed to be absent —
    // matches the teacher's `include_str!("../config.toml")` fallback, done
    // here as a `Config::default()` fallback instead since our tunables are
    // documented as Rust defaults rather than a baked-in TOML string.
    let config = match std::fs::read_to_string(&args.config) {
        Ok(raw) => Config::from_toml_str(&raw)
            .with_context(|| format!("parsing config file {}", args.config))?,
        Err(_) => {
            tracing::info!(path = %args.config, "no config file found, using built-in defaults");
            Config::default()
        }
    };

    let mut config = config;
    if let Some(max_players) = args.max_players {
        config.session.max_players = max_players;
    }

    Ok(Assets { terrain, classes, roles, harbors, rewards, config })
}
