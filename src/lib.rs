//! Headless open-world simulation core: procedural terrain, chunk
//! streaming, enemy AI, and player locomotion over a shared physics world.
//!
//! The crate is renderer-agnostic. It produces chunk meshes, decoration
//! transforms, and simulation events; drawing them, playing audio, and
//! reading raw input devices are the host application's business.
//!
//! ```no_run
//! use emberwild::sim::{InputIntent, SimConfig, World};
//!
//! let mut world = World::new(SimConfig::default());
//! world.spawn_player(0.0, 0.0);
//! loop {
//!     world.update(&InputIntent::default(), 1.0 / 60.0);
//!     for event in world.drain_events() {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod core;
pub mod math;
pub mod physics;
pub mod sim;
pub mod streaming;
pub mod terrain;
