//! This module is responsible for bootstrapping the network store, either
//! from a JSON snapshot on disk or from the built-in sample city.

mod builder;
mod config;
mod sample;

pub use builder::{create_network, load_network, save_network};
pub use config::NetworkConfig;
pub use sample::sample_network;
