//! Agent identity, archetype stat templates, and live instance state.
//!
//! Templates are data: the built-in set covers one of each archetype, and
//! hosts can layer their own definitions on top from JSON. A live agent is
//! a template reference plus mutable state (hp, FSM state, timers).

use std::collections::HashMap;

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::combat::{Element, LootEntry};
use super::fsm::EnemyState;
use crate::core::Error;

/// Stable handle for one spawned agent. Never reused within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

/// Behavioral class of an agent. Drives combat modifiers and a handful of
/// FSM branches; everything else comes from the template numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Melee,
    Ranged,
    /// Elemental caster; fights at range like [`Archetype::Ranged`].
    Magic,
    Tank,
    Elite,
    /// Training target: never moves, never attacks, never dies.
    Dummy,
}

/// Stat block shared by every agent spawned from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    pub archetype: Archetype,
    pub max_hp: f32,
    pub move_speed: f32,
    /// Vision range, world units.
    pub detection_radius: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
    #[serde(default)]
    pub attack_element: Option<Element>,
    pub exp_reward: u32,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    /// Posture bar for elites; ignored by other archetypes.
    #[serde(default)]
    pub posture_max: f32,
    /// Uniform visual/physical scale applied to the capsule body.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Capsule dimensions for the physics body.
    #[serde(default = "default_half_height")]
    pub half_height: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

fn default_scale() -> f32 {
    1.0
}

fn default_half_height() -> f32 {
    0.6
}

fn default_radius() -> f32 {
    0.4
}

impl AgentDefinition {
    /// Scaled capsule dimensions (half height, radius) for the body.
    pub fn capsule_dims(&self) -> (f32, f32) {
        (self.half_height * self.scale, self.radius * self.scale)
    }

    /// Body-center height above the ground when standing.
    pub fn stand_height(&self) -> f32 {
        let (half_height, radius) = self.capsule_dims();
        half_height + radius
    }
}

/// Named template registry with built-in defaults.
pub struct AgentTemplates {
    templates: HashMap<String, AgentDefinition>,
    /// Returned for unknown names; kept outside the map so host-loaded
    /// tables can never remove it.
    fallback: AgentDefinition,
}

impl AgentTemplates {
    /// The built-in stat tables: one template per archetype.
    pub fn builtin() -> Self {
        let defs = vec![
            AgentDefinition {
                name: "wolf".into(),
                archetype: Archetype::Melee,
                max_hp: 80.0,
                move_speed: 6.0,
                detection_radius: 10.0,
                attack_range: 1.6,
                attack_damage: 12.0,
                attack_element: None,
                exp_reward: 15,
                loot: vec![LootEntry {
                    item: "wolf_pelt".into(),
                    chance: 0.6,
                    min: 1,
                    max: 2,
                }],
                posture_max: 0.0,
                scale: 1.0,
                half_height: 0.4,
                radius: 0.4,
            },
            AgentDefinition {
                name: "bandit_archer".into(),
                archetype: Archetype::Ranged,
                max_hp: 60.0,
                move_speed: 4.5,
                detection_radius: 16.0,
                attack_range: 14.0,
                attack_damage: 10.0,
                attack_element: None,
                exp_reward: 20,
                loot: vec![
                    LootEntry { item: "arrow".into(), chance: 0.8, min: 2, max: 6 },
                    LootEntry { item: "coin".into(), chance: 0.5, min: 1, max: 10 },
                ],
                posture_max: 0.0,
                scale: 1.0,
                half_height: 0.6,
                radius: 0.35,
            },
            AgentDefinition {
                name: "marsh_witch".into(),
                archetype: Archetype::Magic,
                max_hp: 70.0,
                move_speed: 3.5,
                detection_radius: 15.0,
                attack_range: 12.0,
                attack_damage: 14.0,
                attack_element: Some(Element::Hydro),
                exp_reward: 30,
                loot: vec![
                    LootEntry { item: "murk_essence".into(), chance: 0.5, min: 1, max: 3 },
                    LootEntry { item: "coin".into(), chance: 0.4, min: 1, max: 6 },
                ],
                posture_max: 0.0,
                scale: 1.0,
                half_height: 0.6,
                radius: 0.35,
            },
            AgentDefinition {
                name: "stone_golem".into(),
                archetype: Archetype::Tank,
                max_hp: 300.0,
                move_speed: 2.5,
                detection_radius: 8.0,
                attack_range: 2.2,
                attack_damage: 25.0,
                attack_element: None,
                exp_reward: 50,
                loot: vec![LootEntry {
                    item: "stone_core".into(),
                    chance: 0.35,
                    min: 1,
                    max: 1,
                }],
                posture_max: 0.0,
                scale: 1.2,
                half_height: 0.9,
                radius: 0.6,
            },
            AgentDefinition {
                name: "ember_tyrant".into(),
                archetype: Archetype::Elite,
                max_hp: 1000.0,
                move_speed: 5.0,
                detection_radius: 18.0,
                attack_range: 3.0,
                attack_damage: 40.0,
                attack_element: Some(Element::Pyro),
                exp_reward: 400,
                loot: vec![
                    LootEntry { item: "tyrant_heart".into(), chance: 1.0, min: 1, max: 1 },
                    LootEntry { item: "ember_shard".into(), chance: 0.7, min: 2, max: 5 },
                ],
                posture_max: 100.0,
                scale: 1.5,
                half_height: 1.0,
                radius: 0.7,
            },
            AgentDefinition {
                name: "training_dummy".into(),
                archetype: Archetype::Dummy,
                max_hp: 1.0e9,
                move_speed: 0.0,
                detection_radius: 0.0,
                attack_range: 0.0,
                attack_damage: 0.0,
                attack_element: None,
                exp_reward: 0,
                loot: Vec::new(),
                posture_max: 0.0,
                scale: 1.0,
                half_height: 0.8,
                radius: 0.4,
            },
        ];
        let fallback = defs[0].clone();
        let templates = defs.into_iter().map(|d| (d.name.clone(), d)).collect();
        Self { templates, fallback }
    }

    /// Merge templates from a JSON array on top of the current set.
    /// Entries with names already present replace the built-ins.
    pub fn load_json(&mut self, json: &str) -> Result<usize, Error> {
        let defs: Vec<AgentDefinition> = serde_json::from_str(json)?;
        for def in &defs {
            if def.max_hp <= 0.0 {
                return Err(Error::Template(format!(
                    "template '{}' has non-positive max_hp",
                    def.name
                )));
            }
        }
        let count = defs.len();
        for def in defs {
            self.templates.insert(def.name.clone(), def);
        }
        Ok(count)
    }

    /// Look up a template, falling back to the wolf when the name is
    /// unknown. A bad name in spawn data should degrade, not crash.
    pub fn get(&self, name: &str) -> &AgentDefinition {
        if let Some(def) = self.templates.get(name) {
            return def;
        }
        log::warn!("unknown agent template '{name}', using fallback");
        &self.fallback
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for AgentTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Live state of one spawned agent.
pub struct AgentInstance {
    pub id: AgentId,
    pub definition: AgentDefinition,
    pub position: Vec3,
    /// Where this agent spawned; anchor for patrol, leash, and return.
    pub spawn: Vec3,
    /// Unit facing direction on the XZ plane.
    pub facing: Vec3,
    pub hp: f32,
    pub state: EnemyState,
    /// Seconds spent in the current state.
    pub state_timer: f32,
    /// Current patrol destination, when patrolling.
    pub patrol_target: Option<Vec3>,
    /// Randomized idle duration before the next patrol leg; rolled on the
    /// first idle tick, zero until then.
    pub idle_dwell: f32,
    /// Remaining reaction delay before an alerted agent starts chasing.
    pub alert_windup: f32,
    /// Seconds since the chase target was last perceived.
    pub lost_sight_timer: f32,
    /// Remaining attack windup; an attack lands when this expires.
    pub attack_windup: f32,
    /// Remaining cooldown before the next attack may start.
    pub attack_cooldown: f32,
    /// Element applied by the last elemental hit, awaiting a reaction.
    pub pending_element: Option<Element>,
    /// Remaining freeze immobilization.
    pub freeze_timer: f32,
    /// Accumulated posture damage (elites only).
    pub posture: f32,
    /// Remaining stagger vulnerability window.
    pub stagger_timer: f32,
    /// Set the first time hp reaches zero; guards death side effects.
    pub death_processed: bool,
    /// Physics body while inside the active window.
    pub body: Option<RigidBodyHandle>,
}

impl AgentInstance {
    pub fn new(id: AgentId, definition: AgentDefinition, position: Vec3) -> Self {
        let state = match definition.archetype {
            Archetype::Dummy => EnemyState::Dummy,
            _ => EnemyState::Idle,
        };
        Self {
            id,
            hp: definition.max_hp,
            definition,
            position,
            spawn: position,
            facing: Vec3::new(0.0, 0.0, 1.0),
            state,
            state_timer: 0.0,
            patrol_target: None,
            idle_dwell: 0.0,
            alert_windup: 0.0,
            lost_sight_timer: 0.0,
            attack_windup: 0.0,
            attack_cooldown: 0.0,
            pending_element: None,
            freeze_timer: 0.0,
            posture: 0.0,
            stagger_timer: 0.0,
            death_processed: false,
            body: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn is_staggered(&self) -> bool {
        self.stagger_timer > 0.0
    }

    /// Switch state and reset the per-state clock.
    pub fn enter_state(&mut self, state: EnemyState) {
        if self.state != state {
            log::trace!("agent {:?}: {:?} -> {:?}", self.id, self.state, state);
            self.state = state;
            self.state_timer = 0.0;
        }
    }
}
