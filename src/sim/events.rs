//! Discrete events emitted for the loot/quest/UI collaborators.
//!
//! The core only records what happened; formatting, reward granting, and
//! on-screen presentation all live outside this crate. Events accumulate
//! in a queue on the simulation context and are drained by the host each
//! frame.

use glam::Vec3;

use super::agent::AgentId;
use super::combat::ReactionKind;

/// Who received a damage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageTarget {
    Agent(AgentId),
    Player,
}

/// One discrete simulation event.
#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    AgentSpawned {
        id: AgentId,
        position: Vec3,
    },
    /// Emitted exactly once per agent, guarded by the death flag.
    AgentDied {
        id: AgentId,
        exp_reward: u32,
        position: Vec3,
    },
    DamageApplied {
        target: DamageTarget,
        amount: f32,
        weak_point: bool,
    },
    Reaction {
        kind: ReactionKind,
        position: Vec3,
    },
    LootDropped {
        item: String,
        count: u32,
        position: Vec3,
    },
    PlayerDamaged {
        amount: f32,
    },
}
