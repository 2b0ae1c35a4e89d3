//! The simulation world: owns terrain, physics, streaming, the agent
//! arena, and the player, and advances them in a fixed pipeline order.
//!
//! Per tick: player locomotion, physics step, transform mirroring, agent
//! behavior, streaming, then population of freshly loaded chunks.
//! Streaming runs against the previous tick's observer position so chunk
//! loads never see a half-updated player transform.

use std::collections::HashMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rapier3d::prelude::RigidBodyHandle;
use serde::Deserialize;

use super::agent::{AgentId, AgentInstance, AgentTemplates, Archetype};
use super::combat::{self, DefenseProfile, Element, STAGGER_DURATION};
use super::events::{DamageTarget, SimEvent};
use super::fsm::{self, EnemyState, PlayerView, ALERT_PROPAGATION_RADIUS, PROPAGATED_WINDUP};
use super::player::{EnvSample, InputIntent, PlayerLocomotion, PlayerState};
use crate::core::{Error, TickClock};
use crate::math::{flat_direction, flat_distance};
use crate::physics::PhysicsBridge;
use crate::streaming::{decoration, ChunkId, ChunkStreamer, StreamerConfig};
use crate::terrain::{Biome, HeightField};

/// World-space water surface height. Terrain below it is submerged.
pub const WATER_LEVEL: f32 = 0.9;
/// Slope steep enough to climb, radians.
const CLIMBABLE_SLOPE: f32 = 1.0;
/// Transform sanity sweep interval, in ticks.
const NAN_CHECK_INTERVAL: u64 = 60;
/// Soft ceiling on the live agent population.
const MAX_POPULATION: usize = 256;

const PLAYER_HALF_HEIGHT: f32 = 0.6;
const PLAYER_RADIUS: f32 = 0.4;

/// Top-level simulation tuning, loadable from JSON.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u32,
    pub streamer: StreamerConfig,
    /// Agents beyond this distance from the player are not ticked at all.
    pub cull_radius: f32,
    /// Agents beyond this distance tick on alternating frames.
    pub mid_radius: f32,
    /// Hard cap on agents ticked per frame; the excess rotates in on
    /// later frames.
    pub max_agents_per_tick: usize,
    pub player_max_hp: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            streamer: StreamerConfig::default(),
            cull_radius: 120.0,
            mid_radius: 60.0,
            max_agents_per_tick: 64,
            player_max_hp: 100.0,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// The player's presence in the world.
pub struct Player {
    pub locomotion: PlayerLocomotion,
    pub position: Vec3,
    pub hp: f32,
    pub max_hp: f32,
    pub alive: bool,
    pub body: RigidBodyHandle,
    /// Horizontal speed last tick; feeds enemy hearing.
    pub speed: f32,
    /// Set by an attack this tick; feeds enemy hearing, cleared each tick.
    pub attacking: bool,
}

/// The whole simulation.
pub struct World {
    pub config: SimConfig,
    pub clock: TickClock,
    pub height: HeightField,
    pub physics: PhysicsBridge,
    pub streamer: ChunkStreamer,
    pub templates: AgentTemplates,
    agents: HashMap<AgentId, AgentInstance>,
    /// Stable iteration order for fair throttling.
    agent_order: Vec<AgentId>,
    next_agent_id: u64,
    player: Option<Player>,
    /// Observer used for streaming; lags the player by one tick.
    prev_observer: Option<Vec3>,
    rng: ChaCha8Rng,
    events: Vec<SimEvent>,
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        let height = HeightField::new(config.seed);
        let streamer = ChunkStreamer::new(config.streamer, config.seed);
        let rng = ChaCha8Rng::seed_from_u64(config.seed as u64 ^ 0x5157_3A1D);
        Self {
            height,
            streamer,
            rng,
            config,
            clock: TickClock::new(),
            physics: PhysicsBridge::new(),
            templates: AgentTemplates::builtin(),
            agents: HashMap::new(),
            agent_order: Vec::new(),
            next_agent_id: 1,
            player: None,
            prev_observer: None,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentInstance> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut AgentInstance> {
        self.agents.get_mut(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentInstance> {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop the player into the world slightly above the terrain.
    pub fn spawn_player(&mut self, x: f32, z: f32) {
        let y = self.height.elevation(x, z) + PLAYER_HALF_HEIGHT + PLAYER_RADIUS + 0.5;
        let position = Vec3::new(x, y, z);
        let body =
            self.physics
                .add_character_body(position, PLAYER_HALF_HEIGHT, PLAYER_RADIUS);
        self.player = Some(Player {
            locomotion: PlayerLocomotion::new(),
            position,
            hp: self.config.player_max_hp,
            max_hp: self.config.player_max_hp,
            alive: true,
            body,
            speed: 0.0,
            attacking: false,
        });
        log::info!("player spawned at ({x:.1}, {y:.1}, {z:.1})");
    }

    /// Spawn an agent at a world position, snapped to the terrain.
    pub fn spawn_agent(&mut self, template: &str, x: f32, z: f32) -> AgentId {
        let def = self.templates.get(template).clone();
        let y = self.height.elevation(x, z) + def.stand_height();
        let position = Vec3::new(x, y, z);
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;

        let mut agent = AgentInstance::new(id, def, position);
        if self.streamer.physics_active_at(position) {
            let (half_height, radius) = agent.definition.capsule_dims();
            agent.body = Some(self.physics.add_character_body(position, half_height, radius));
        }
        log::debug!("spawned '{}' as {:?} at ({x:.1}, {z:.1})", template, id);
        self.agents.insert(id, agent);
        self.agent_order.push(id);
        self.events.push(SimEvent::AgentSpawned { id, position });
        id
    }

    /// Advance the world by one frame.
    pub fn update(&mut self, input: &InputIntent, dt: f32) {
        let dt = self.clock.advance(dt);

        self.update_player_locomotion(input, dt);
        self.physics.step(dt);
        self.mirror_transforms();
        self.update_agents(dt);
        self.update_streaming();
        self.populate_new_chunks();

        if self.clock.tick() % NAN_CHECK_INTERVAL == 0 {
            self.sanity_sweep();
        }
        if let Some(player) = self.player.as_mut() {
            player.attacking = false;
        }
    }

    /// Environment probe for the player's locomotion machine.
    fn sample_environment(&self, position: Vec3) -> EnvSample {
        let ground = self.height.elevation(position.x, position.z);
        let feet = position.y - PLAYER_HALF_HEIGHT - PLAYER_RADIUS;
        EnvSample {
            grounded: feet <= ground + 0.15,
            in_water: ground < WATER_LEVEL && feet < WATER_LEVEL,
            on_wall: self.height.slope(position.x, position.z) > CLIMBABLE_SLOPE,
        }
    }

    fn update_player_locomotion(&mut self, input: &InputIntent, dt: f32) {
        let (position, alive) = match self.player.as_ref() {
            Some(p) => (p.position, p.alive),
            None => return,
        };
        if !alive {
            return;
        }
        let env = self.sample_environment(position);
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let out = player.locomotion.update(input, &env, dt);
        player.speed = Vec3::new(out.velocity.x, 0.0, out.velocity.z).length();

        if out.override_vertical {
            self.physics.set_body_velocity(player.body, out.velocity);
        } else {
            self.physics.set_horizontal_velocity(player.body, out.velocity);
            if let Some(jump) = player.locomotion.take_jump() {
                let v = self.physics.body_velocity(player.body).unwrap_or(Vec3::ZERO);
                self.physics
                    .set_body_velocity(player.body, Vec3::new(v.x, jump, v.z));
            }
        }
    }

    /// Copy physics transforms back onto the simulation's own state.
    fn mirror_transforms(&mut self) {
        if let Some(player) = self.player.as_mut() {
            if let Some(position) = self.physics.body_position(player.body) {
                player.position = position;
            }
        }
        for agent in self.agents.values_mut() {
            if let Some(body) = agent.body {
                if let Some(position) = self.physics.body_position(body) {
                    agent.position = position;
                }
            }
        }
    }

    fn player_view(&self) -> PlayerView {
        match self.player.as_ref() {
            Some(p) => PlayerView {
                position: p.position,
                speed: p.speed,
                attacking: p.attacking,
                alive: p.alive,
            },
            None => PlayerView {
                position: Vec3::ZERO,
                speed: 0.0,
                attacking: false,
                alive: false,
            },
        }
    }

    fn update_agents(&mut self, dt: f32) {
        let view = self.player_view();
        let tick = self.clock.tick();
        let count = self.agent_order.len();
        if count == 0 {
            return;
        }

        // Round-robin start point so the per-frame cap starves nobody.
        let offset = (tick as usize) % count;
        let cap = self.config.max_agents_per_tick.max(1);

        let mut attacks = Vec::new();
        let mut alerts = Vec::new();
        let mut processed = 0;

        for i in 0..count {
            if processed >= cap {
                break;
            }
            let id = self.agent_order[(offset + i) % count];
            let Some(agent) = self.agents.get_mut(&id) else {
                continue;
            };

            let distance = flat_distance(agent.position, view.position);
            if distance > self.config.cull_radius {
                continue;
            }
            // Mid band: alternate frames, offset by id so neighbors
            // don't all stall on the same frame.
            let throttled = distance > self.config.mid_radius;
            if throttled && (tick + id.0) % 2 != 0 {
                continue;
            }
            processed += 1;
            let step = if throttled { dt * 2.0 } else { dt };

            let out = fsm::tick(agent, &view, step, &mut self.rng);

            if let Some(body) = agent.body {
                self.physics.set_horizontal_velocity(body, out.velocity);
            } else {
                // Outside the physics window: integrate on the terrain
                // surface directly.
                agent.position += out.velocity * step;
                agent.position.y = self
                    .height
                    .elevation(agent.position.x, agent.position.z)
                    + agent.definition.stand_height();
            }

            if let Some(hit) = out.attack {
                attacks.push(hit);
            }
            if out.propagate_alert {
                alerts.push((id, agent.position));
            }
        }

        for hit in attacks {
            self.damage_player(hit.damage, hit.element, hit.source);
        }
        for (source_id, position) in alerts {
            self.propagate_alert(source_id, position);
        }
        self.sync_agent_bodies();
    }

    /// Wake allies near an agent that just committed to an engagement.
    fn propagate_alert(&mut self, source: AgentId, position: Vec3) {
        let view = self.player_view();
        for agent in self.agents.values_mut() {
            if agent.id == source {
                continue;
            }
            if flat_distance(agent.position, position) <= ALERT_PROPAGATION_RADIUS {
                fsm::alert(agent, view.position, PROPAGATED_WINDUP);
            }
        }
    }

    /// Give or take physics bodies as agents cross the active window.
    fn sync_agent_bodies(&mut self) {
        for agent in self.agents.values_mut() {
            if !agent.position.is_finite() {
                continue;
            }
            let should_have = self.streamer.physics_active_at(agent.position);
            match (agent.body, should_have) {
                (None, true) => {
                    let (half_height, radius) = agent.definition.capsule_dims();
                    agent.body = Some(self.physics.add_character_body(
                        agent.position,
                        half_height,
                        radius,
                    ));
                }
                (Some(body), false) => {
                    self.physics.remove_body(body);
                    agent.body = None;
                }
                _ => {}
            }
        }
    }

    fn update_streaming(&mut self) {
        self.streamer
            .update(self.prev_observer, &self.height, &mut self.physics);
        self.prev_observer = self.player.as_ref().filter(|p| p.alive).map(|p| p.position);
    }

    /// Deterministic enemy placement for chunks that just streamed in.
    fn populate_new_chunks(&mut self) {
        let chunk_size = self.streamer.config().chunk_size;
        for id in self.streamer.take_newly_loaded() {
            if self.agents.len() >= MAX_POPULATION {
                return;
            }
            self.populate_chunk(id, chunk_size);
        }
    }

    fn populate_chunk(&mut self, id: ChunkId, chunk_size: f32) {
        let (cx, cz) = id.center(chunk_size);
        // Two candidate sites per chunk, hashed from the chunk coordinates
        // so reloading a chunk re-places the same camp.
        for slot in 0..2u32 {
            let salt = self.config.seed.wrapping_add(0xA5A5).wrapping_add(slot * 131);
            let roll = decoration::hash_2d(id.cx, id.cz, salt);
            let jx = decoration::hash_2d(id.cx, id.cz, salt.wrapping_add(7));
            let jz = decoration::hash_2d(id.cx, id.cz, salt.wrapping_add(13));
            let x = cx + (jx - 0.5) * chunk_size * 0.8;
            let z = cz + (jz - 0.5) * chunk_size * 0.8;

            let biome = self.height.biome_at(x, z);
            let (template, chance) = match biome {
                Biome::Plains | Biome::Forest | Biome::Jungle => ("wolf", 0.30),
                Biome::Desert | Biome::Badlands => ("bandit_archer", 0.25),
                Biome::Mountain | Biome::Highlands => ("stone_golem", 0.15),
                Biome::Volcano => ("ember_tyrant", 0.05),
                Biome::Swamp => ("marsh_witch", 0.20),
                Biome::Snow => ("wolf", 0.10),
            };
            if roll < chance {
                self.spawn_agent(template, x, z);
            }
        }
    }

    /// Periodic transform sanity check; anything non-finite is put back
    /// somewhere sane instead of corrupting the physics solver.
    fn sanity_sweep(&mut self) {
        if let Some(player) = self.player.as_mut() {
            if !player.position.is_finite() {
                log::error!("player transform went non-finite, resetting");
                let ground = self.height.elevation(0.0, 0.0);
                player.position = Vec3::new(0.0, ground + 2.0, 0.0);
                self.physics.set_body_position(player.body, player.position);
                self.physics.set_body_velocity(player.body, Vec3::ZERO);
            }
        }
        for agent in self.agents.values_mut() {
            if !agent.position.is_finite() {
                log::error!("agent {:?} transform went non-finite, resetting", agent.id);
                agent.position = agent.spawn;
                if let Some(body) = agent.body {
                    self.physics.set_body_position(body, agent.spawn);
                    self.physics.set_body_velocity(body, Vec3::ZERO);
                }
            }
        }
    }

    /// Apply damage from the player (or any source) to an agent.
    pub fn damage_agent(
        &mut self,
        id: AgentId,
        amount: f32,
        element: Option<Element>,
        weak_point: bool,
        source: Vec3,
    ) {
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        if !agent.is_alive() {
            return;
        }
        if agent.definition.archetype == Archetype::Dummy {
            // Dummies report the hit but never react or die.
            let r = combat::resolve(
                amount,
                element,
                weak_point,
                source,
                &DefenseProfile {
                    blocks_when_facing: false,
                    armored: false,
                    position: agent.position,
                    forward: agent.facing,
                    pending_element: agent.pending_element,
                    staggered: false,
                },
            );
            agent.pending_element = r.pending_element;
            self.events.push(SimEvent::DamageApplied {
                target: DamageTarget::Agent(id),
                amount: r.damage,
                weak_point,
            });
            if let Some(kind) = r.reaction {
                self.events.push(SimEvent::Reaction { kind, position: agent.position });
            }
            return;
        }

        let is_tank = agent.definition.archetype == Archetype::Tank;
        let defense = DefenseProfile {
            blocks_when_facing: is_tank,
            armored: is_tank,
            position: agent.position,
            forward: agent.facing,
            pending_element: agent.pending_element,
            staggered: agent.is_staggered(),
        };
        let r = combat::resolve(amount, element, weak_point, source, &defense);

        agent.hp -= r.damage;
        agent.pending_element = r.pending_element;
        if r.freeze_duration > 0.0 {
            agent.freeze_timer = agent.freeze_timer.max(r.freeze_duration);
        }

        // Elite posture: enough weak-point pressure opens a stagger window.
        if agent.definition.archetype == Archetype::Elite
            && r.posture_damage > 0.0
            && !agent.is_staggered()
        {
            agent.posture += r.posture_damage;
            if agent.posture >= agent.definition.posture_max {
                agent.stagger_timer = STAGGER_DURATION;
                log::debug!("agent {:?} staggered", id);
            }
        }

        if r.knockback > 0.0 {
            let dir = flat_direction(source, agent.position);
            if let Some(body) = agent.body {
                self.physics.apply_impulse(body, dir * r.knockback);
            } else {
                agent.position += dir * r.knockback * 0.1;
            }
        }

        self.events.push(SimEvent::DamageApplied {
            target: DamageTarget::Agent(id),
            amount: r.damage,
            weak_point,
        });
        if let Some(kind) = r.reaction {
            self.events.push(SimEvent::Reaction { kind, position: agent.position });
        }

        // Getting hit wakes the agent instantly, and its allies shortly
        // after.
        if matches!(
            agent.state,
            EnemyState::Idle | EnemyState::Patrol | EnemyState::Return
        ) {
            fsm::alert(agent, source, 0.0);
            let position = agent.position;
            self.propagate_alert(id, position);
        }

        if let Some(agent) = self.agents.get(&id) {
            if !agent.is_alive() {
                self.process_death(id);
            }
        }
    }

    /// Death side effects, guarded so they run exactly once per agent.
    fn process_death(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        if agent.death_processed {
            return;
        }
        agent.death_processed = true;

        let position = agent.position;
        let exp = agent.definition.exp_reward;
        let loot = combat::roll_loot(&agent.definition.loot, &mut self.rng);
        if let Some(body) = agent.body.take() {
            self.physics.remove_body(body);
        }

        self.events.push(SimEvent::AgentDied { id, exp_reward: exp, position });
        for (item, count) in loot {
            self.events.push(SimEvent::LootDropped { item, count, position });
        }
        log::debug!("agent {:?} died, {} exp", id, exp);

        self.agents.remove(&id);
        self.agent_order.retain(|a| *a != id);
    }

    /// Apply damage to the player. Guarding blocks most frontal damage.
    pub fn damage_player(&mut self, amount: f32, element: Option<Element>, source: Vec3) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if !player.alive {
            return;
        }
        // Dodge grants invulnerability for its whole burst.
        if player.locomotion.state == PlayerState::Dodge {
            log::trace!("hit dodged");
            return;
        }
        let defense = DefenseProfile {
            blocks_when_facing: player.locomotion.is_guarding(),
            armored: false,
            position: player.position,
            forward: player.locomotion.facing,
            pending_element: None,
            staggered: false,
        };
        let r = combat::resolve(amount, element, false, source, &defense);
        player.hp = (player.hp - r.damage).max(0.0);
        self.events.push(SimEvent::PlayerDamaged { amount: r.damage });
        if player.hp == 0.0 {
            player.alive = false;
            log::info!("player died");
        }
    }

    /// A player melee/skill hit against one agent. Also marks the player
    /// as noisy this tick.
    pub fn player_attack(
        &mut self,
        target: AgentId,
        amount: f32,
        element: Option<Element>,
        weak_point: bool,
    ) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if !player.alive {
            return;
        }
        player.attacking = true;
        let source = player.position;
        self.damage_agent(target, amount, element, weak_point, source);
    }
}
