use std::{
  io,
  net::{Ipv4Addr, SocketAddr},
  path::{Path, PathBuf},
  str::FromStr,
};

use engine::{
  config::EngineConfig,
  environment::{Chain, Terrain, Wind},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WIND: Wind = Wind { wx: 5.0, wy: 2.0 };
pub const DEFAULT_SAFETY_MARGIN: f64 = 10.0;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", .path.display())]
  Read { path: PathBuf, source: io::Error },
  #[error("failed to parse config file: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub server: ServerConfig,
  pub engine: EngineConfig,
  pub environment: EnvironmentConfig,
}

impl Config {
  pub fn from_path<T>(path: T) -> Result<Self, ConfigError>
  where
    T: AsRef<Path>,
  {
    let path = path.as_ref();
    let config =
      std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
      })?;

    config.parse()
  }
}

impl FromStr for Config {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(toml::from_str(s)?)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
  pub address: Option<SocketAddr>,
}

impl ServerConfig {
  pub fn address(&self) -> SocketAddr {
    self
      .address
      .unwrap_or(SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
  }
}

/// Either form is accepted under `[environment] wind = { ... }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WindConfig {
  Components { wx: f64, wy: f64 },
  /// `direction` is in degrees clockwise from north, towards which the wind
  /// blows.
  Heading { speed: f64, direction: f64 },
}

impl From<WindConfig> for Wind {
  fn from(value: WindConfig) -> Self {
    match value {
      WindConfig::Components { wx, wy } => Wind::new(wx, wy),
      WindConfig::Heading { speed, direction } => {
        Wind::from_speed_and_direction(speed, direction)
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
  /// Turns wind off entirely, ignoring `wind`.
  pub calm: bool,
  pub wind: Option<WindConfig>,
  pub terrain: Option<TerrainConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainConfig {
  pub safety_margin: f64,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      safety_margin: DEFAULT_SAFETY_MARGIN,
    }
  }
}

impl EnvironmentConfig {
  pub fn wind(&self) -> Option<Wind> {
    if self.calm {
      None
    } else {
      Some(self.wind.map(Wind::from).unwrap_or(DEFAULT_WIND))
    }
  }

  pub fn terrain(&self) -> Terrain {
    Terrain::new(self.terrain.unwrap_or_default().safety_margin)
  }

  /// Wind first, then terrain, so the terrain floor sees the drifted position.
  pub fn build(&self) -> Chain {
    let mut chain = Chain::new();
    if let Some(wind) = self.wind() {
      chain.push(wind);
    }
    chain.push(self.terrain());

    chain
  }
}
