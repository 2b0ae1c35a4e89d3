//! Gameplay simulation: agents, combat, the player, and the world context
//! that drives them against terrain and physics.

pub mod agent;
pub mod combat;
pub mod context;
pub mod events;
pub mod fsm;
pub mod player;

pub use agent::{AgentDefinition, AgentId, AgentInstance, AgentTemplates, Archetype};
pub use combat::{Element, LootEntry, ReactionKind};
pub use context::{Player, SimConfig, World};
pub use events::{DamageTarget, SimEvent};
pub use fsm::{EnemyState, PlayerView};
pub use player::{EnvSample, InputIntent, PlayerLocomotion, PlayerState};
