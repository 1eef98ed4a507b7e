//! Request handlers, grouped by the resource they serve

pub mod admin;
pub mod network;
pub mod simulation;
