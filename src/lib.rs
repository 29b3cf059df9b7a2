// Library exports for tether

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod heartbeat;
pub mod paths;
