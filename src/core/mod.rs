//! Core utilities: errors, logging, tick timing.

pub mod error;
pub mod logging;
pub mod time;

pub use error::Error;
pub use time::TickClock;
