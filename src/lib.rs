//! Camera matrix terminal screen: a sheet-driven camera list with simulated
//! degraded feeds (pan sweeps, glitch bursts and lost-signal static).

pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod sheet;
pub mod state;
pub mod util;
