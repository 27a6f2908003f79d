pub mod autopilot;
pub mod command;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod job;
pub mod simulation;
pub mod state;

pub use command::{Command, CommandKind};
pub use config::EngineConfig;
pub use engine::{Engine, EngineHandle, Unsubscribe};
pub use error::EngineError;
pub use state::{ActiveCommand, AircraftState};

pub const DEFAULT_TICK_RATE_HZ: f64 = 20.0;

/// Tel Aviv, as `(lat, lon)`.
pub const DEFAULT_ORIGIN: (f64, f64) = (32.0853, 34.7818);
