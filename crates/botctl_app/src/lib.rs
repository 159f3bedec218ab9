//! Bot control app: lifecycle controller wiring and the `botctl` presentation layer.
pub mod cli;
pub mod config;
mod controller;
pub mod logging;
pub mod render;

pub use controller::{Busy, DispatchError, LifecycleController};
