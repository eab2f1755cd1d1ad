use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{aggregate::Options, dump::tokenize::DEFAULT_MAX_TOKEN_SIZE, grid::GridKind};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub level: u8,
    pub grid: GridKind,

    // level 17 of the Commons geotags has a bit under 6 million distinct cells
    pub capacity_hint: usize,
    pub max_token_size: usize,

    pub stats: Option<StatsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct StatsConfig {
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: 17,
            grid: GridKind::S2,
            capacity_hint: 7_000_000,
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
            stats: None,
        }
    }
}

impl Config {
    pub fn options(&self) -> Options {
        Options {
            capacity_hint: self.capacity_hint,
            max_token_size: self.max_token_size,
        }
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let config = toml::from_str(&data).context("Failed to parse config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.level, 17);
        assert_eq!(config.grid, GridKind::S2);
        assert!(config.stats.is_none());
    }

    #[test]
    fn full() {
        let config: Config = toml::from_str(
            r#"
            level = 7
            grid = "h3"
            capacity_hint = 10
            max_token_size = 4096

            [stats]
            path = "stats.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.level, 7);
        assert_eq!(config.grid, GridKind::H3);
        assert_eq!(config.options().max_token_size, 4096);
        assert_eq!(config.stats.unwrap().path, PathBuf::from("stats.json"));
    }

    #[test]
    fn unknown_key() {
        assert!(toml::from_str::<Config>("levle = 3").is_err());
    }
}
