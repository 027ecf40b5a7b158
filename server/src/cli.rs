//! Command-line flags, layered over `config.toml`. Mirrors the sibling
//! `uwb-simulator`'s `Args`: a `clap::Parser` struct with `--config` plus a
//! handful of overrides for the values operators tune most often.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sail-server", about = "Age-of-sail combat simulation server")]
pub struct Args {
    /// TCP port to bind the HTTP/WebSocket listener on.
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Overrides `[session] max_players` from the config file.
    #[arg(long)]
    pub max_players: Option<u32>,

    /// Path to the terrain map JSON document (`{width,height,tileSize,tiles}`).
    #[arg(long, default_value = "assets/terrain.json")]
    pub world_map: String,

    /// Path to the harbor registry JSON document.
    #[arg(long, default_value = "assets/harbors.json")]
    pub harbors: String,

    /// Path to the ship class table JSON document.
    #[arg(long, default_value = "assets/ship_classes.json")]
    pub ship_classes: String,

    /// Path to the NPC role table JSON document.
    #[arg(long, default_value = "assets/roles.json")]
    pub roles: String,

    /// Path to the reward table JSON document.
    #[arg(long, default_value = "assets/rewards.json")]
    pub rewards: String,

    /// Path to the tuning config file; falls back to built-in defaults
    /// field-by-field when absent.
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// RNG seed for wind, spawn sampling, and NPC role selection. A fixed
    /// seed gives byte-identical snapshot sequences for the same input
    /// stream, per the determinism property in the design notes.
    #[arg(long, default_value = "0")]
    pub seed: u64,
}
