pub mod config;
pub mod error;
pub mod poll;
pub mod state_factory;
pub mod telemetry;
pub mod wiring;
