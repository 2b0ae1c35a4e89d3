//! Enemy behavior state machine.
//!
//! Each tick produces a desired horizontal velocity plus optional discrete
//! outcomes (an attack landing, an alert to propagate); the simulation
//! context owns applying those to physics, the player, and nearby allies.
//! The machine itself never touches anything but its own agent.

use glam::Vec3;
use rand::Rng;

use super::agent::{AgentInstance, Archetype};
use super::combat::Element;
use crate::math::{facing_cosine, flat_direction, flat_distance};

/// Reaction delay after spotting the player directly.
pub const ALERT_WINDUP: f32 = 1.0;
/// Shorter delay when alerted secondhand by an ally.
pub const PROPAGATED_WINDUP: f32 = 0.5;
/// Radius within which an alerting agent wakes its allies.
pub const ALERT_PROPAGATION_RADIUS: f32 = 10.0;
/// Agents never chase farther than this from their spawn point.
pub const LEASH_RADIUS: f32 = 40.0;

pub const ATTACK_WINDUP: f32 = 0.5;
pub const ATTACK_COOLDOWN: f32 = 2.0;
/// A winding-up attack still lands if the target stays within
/// `attack_range * ATTACK_REACH_MULTIPLIER`.
pub const ATTACK_REACH_MULTIPLIER: f32 = 1.5;
/// Ranged agents back away when the player closes inside this.
pub const RANGED_KITE_DISTANCE: f32 = 5.0;

/// Fraction of max hp regenerated per second while returning.
pub const RETURN_REGEN_RATE: f32 = 0.1;
/// Arriving within this of the spawn point completes the return.
pub const RETURN_ARRIVE_DISTANCE: f32 = 1.0;

/// Cosine of the half-angle of the vision cone (~60 degrees).
pub const VISION_COSINE: f32 = 0.5;
/// Hearing range, independent of facing.
pub const AUDIO_RADIUS: f32 = 15.0;
/// Minimum noise level that registers.
pub const AUDIO_THRESHOLD: f32 = 0.5;

/// Chase is abandoned after losing the target for this long.
const CHASE_GIVE_UP: f32 = 3.0;
/// Idle dwell before the next patrol leg, rolled per idle period.
const IDLE_DWELL_MIN: f32 = 5.0;
const IDLE_DWELL_MAX: f32 = 10.0;
/// Patrol destinations stay within this radius of spawn.
const PATROL_RADIUS: f32 = 10.0;
const PATROL_ARRIVE_DISTANCE: f32 = 1.0;

/// Behavior states. `Dummy` is terminal; everything else cycles through
/// the perceive/chase/attack/return loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Idle,
    Patrol,
    Alert,
    Chase,
    Attack,
    Return,
    Dummy,
}

/// What the FSM needs to know about the player this tick.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    pub position: Vec3,
    /// Horizontal speed, world units per second.
    pub speed: f32,
    pub attacking: bool,
    pub alive: bool,
}

/// An attack that landed this tick, to be resolved against the player.
#[derive(Clone, Copy, Debug)]
pub struct AttackHit {
    pub damage: f32,
    pub element: Option<Element>,
    pub source: Vec3,
}

/// Per-tick FSM output, applied by the simulation context.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsmOutcome {
    /// Desired horizontal velocity.
    pub velocity: Vec3,
    pub attack: Option<AttackHit>,
    /// The agent confirmed its sighting and committed to the chase;
    /// allies within the propagation radius should be woken too.
    pub propagate_alert: bool,
}

impl FsmOutcome {
    fn still() -> Self {
        Self::default()
    }
}

/// Noise level the player emits, in [0, 1].
fn player_noise(player: &PlayerView) -> f32 {
    if player.speed > 8.0 || player.attacking {
        1.0
    } else if player.speed > 2.0 {
        0.4
    } else {
        0.0
    }
}

/// Whether the agent notices the player right now, by sight or sound.
pub fn perceives(agent: &AgentInstance, player: &PlayerView) -> bool {
    if !player.alive {
        return false;
    }
    let distance = flat_distance(agent.position, player.position);

    // Sight: within the detection radius and inside the vision cone.
    if distance <= agent.definition.detection_radius
        && facing_cosine(agent.position, agent.facing, player.position) > VISION_COSINE
    {
        return true;
    }

    // Sound: omnidirectional, gated on the player's noise level.
    distance <= AUDIO_RADIUS && player_noise(player) >= AUDIO_THRESHOLD
}

/// Force an agent into Alert (taking damage, or an ally's warning).
/// `windup` is the reaction delay; damage uses zero, propagation uses
/// [`PROPAGATED_WINDUP`]. Already-engaged agents are unaffected.
pub fn alert(agent: &mut AgentInstance, toward: Vec3, windup: f32) {
    match agent.state {
        EnemyState::Idle | EnemyState::Patrol | EnemyState::Return => {
            let dir = flat_direction(agent.position, toward);
            if dir != Vec3::ZERO {
                agent.facing = dir;
            }
            agent.enter_state(EnemyState::Alert);
            agent.alert_windup = windup;
        }
        EnemyState::Alert => {
            // A stronger stimulus shortens the existing windup.
            agent.alert_windup = agent.alert_windup.min(windup);
        }
        _ => {}
    }
}

/// Advance one agent's behavior by `dt`.
pub fn tick<R: Rng>(
    agent: &mut AgentInstance,
    player: &PlayerView,
    dt: f32,
    rng: &mut R,
) -> FsmOutcome {
    if !agent.is_alive() || agent.state == EnemyState::Dummy {
        return FsmOutcome::still();
    }

    agent.state_timer += dt;
    agent.attack_cooldown = (agent.attack_cooldown - dt).max(0.0);

    // Frozen agents lose the tick entirely; staggered elites likewise.
    if agent.freeze_timer > 0.0 {
        agent.freeze_timer = (agent.freeze_timer - dt).max(0.0);
        return FsmOutcome::still();
    }
    if agent.stagger_timer > 0.0 {
        agent.stagger_timer = (agent.stagger_timer - dt).max(0.0);
        if agent.stagger_timer == 0.0 {
            agent.posture = 0.0;
        }
        return FsmOutcome::still();
    }

    // The leash overrides everything: an engaged agent that strays too
    // far disengages no matter what the player is doing.
    let engaged = matches!(
        agent.state,
        EnemyState::Alert | EnemyState::Chase | EnemyState::Attack
    );
    if engaged && flat_distance(agent.position, agent.spawn) > LEASH_RADIUS {
        agent.enter_state(EnemyState::Return);
        return FsmOutcome::still();
    }

    match agent.state {
        EnemyState::Idle => {
            if perceives(agent, player) {
                begin_alert(agent, player.position);
                return FsmOutcome::still();
            }
            if agent.idle_dwell <= 0.0 {
                agent.idle_dwell = rng.gen_range(IDLE_DWELL_MIN..IDLE_DWELL_MAX);
            }
            if agent.state_timer >= agent.idle_dwell {
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let dist = rng.gen_range(2.0..PATROL_RADIUS);
                agent.patrol_target = Some(
                    agent.spawn + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist),
                );
                agent.idle_dwell = 0.0;
                agent.enter_state(EnemyState::Patrol);
            }
            FsmOutcome::still()
        }

        EnemyState::Patrol => {
            if perceives(agent, player) {
                begin_alert(agent, player.position);
                return FsmOutcome::still();
            }
            let Some(target) = agent.patrol_target else {
                agent.enter_state(EnemyState::Idle);
                return FsmOutcome::still();
            };
            if flat_distance(agent.position, target) <= PATROL_ARRIVE_DISTANCE {
                agent.patrol_target = None;
                agent.enter_state(EnemyState::Idle);
                return FsmOutcome::still();
            }
            let dir = flat_direction(agent.position, target);
            agent.facing = dir;
            // Patrol at half speed.
            FsmOutcome {
                velocity: dir * agent.definition.move_speed * 0.5,
                ..FsmOutcome::still()
            }
        }

        EnemyState::Alert => {
            agent.alert_windup = (agent.alert_windup - dt).max(0.0);
            let dir = flat_direction(agent.position, player.position);
            if dir != Vec3::ZERO {
                agent.facing = dir;
            }
            if agent.alert_windup == 0.0 {
                if player.alive {
                    agent.lost_sight_timer = 0.0;
                    agent.enter_state(EnemyState::Chase);
                    // The confirmed sighting is what wakes the allies.
                    return FsmOutcome {
                        propagate_alert: true,
                        ..FsmOutcome::still()
                    };
                }
                agent.enter_state(EnemyState::Return);
            }
            FsmOutcome::still()
        }

        EnemyState::Chase => {
            if !player.alive {
                agent.enter_state(EnemyState::Return);
                return FsmOutcome::still();
            }
            if perceives(agent, player) {
                agent.lost_sight_timer = 0.0;
            } else {
                agent.lost_sight_timer += dt;
                if agent.lost_sight_timer >= CHASE_GIVE_UP {
                    agent.enter_state(EnemyState::Return);
                    return FsmOutcome::still();
                }
            }

            let distance = flat_distance(agent.position, player.position);
            let dir = flat_direction(agent.position, player.position);
            if dir != Vec3::ZERO {
                agent.facing = dir;
            }

            // Ranged agents keep their distance; casters stand and cast.
            if agent.definition.archetype == Archetype::Ranged
                && distance < RANGED_KITE_DISTANCE
            {
                return FsmOutcome {
                    velocity: -dir * agent.definition.move_speed,
                    ..FsmOutcome::still()
                };
            }

            if distance <= agent.definition.attack_range {
                if agent.attack_cooldown == 0.0 {
                    agent.attack_windup = ATTACK_WINDUP;
                    agent.enter_state(EnemyState::Attack);
                }
                return FsmOutcome::still();
            }

            FsmOutcome {
                velocity: dir * agent.definition.move_speed,
                ..FsmOutcome::still()
            }
        }

        EnemyState::Attack => {
            if !player.alive {
                agent.enter_state(EnemyState::Return);
                return FsmOutcome::still();
            }
            let dir = flat_direction(agent.position, player.position);
            if dir != Vec3::ZERO {
                agent.facing = dir;
            }
            agent.attack_windup = (agent.attack_windup - dt).max(0.0);
            if agent.attack_windup > 0.0 {
                return FsmOutcome::still();
            }

            agent.attack_cooldown = ATTACK_COOLDOWN;
            agent.lost_sight_timer = 0.0;
            agent.enter_state(EnemyState::Chase);

            // The swing whiffs if the target slipped out of reach during
            // the windup.
            let reach = agent.definition.attack_range * ATTACK_REACH_MULTIPLIER;
            let distance = flat_distance(agent.position, player.position);
            if distance <= reach {
                FsmOutcome {
                    attack: Some(AttackHit {
                        damage: agent.definition.attack_damage,
                        element: agent.definition.attack_element,
                        source: agent.position,
                    }),
                    ..FsmOutcome::still()
                }
            } else {
                log::trace!("agent {:?} attack whiffed at {distance:.1}", agent.id);
                FsmOutcome::still()
            }
        }

        EnemyState::Return => {
            // Out of combat: regenerate while walking home.
            agent.hp =
                (agent.hp + agent.definition.max_hp * RETURN_REGEN_RATE * dt)
                    .min(agent.definition.max_hp);

            let distance = flat_distance(agent.position, agent.spawn);
            if distance <= RETURN_ARRIVE_DISTANCE {
                agent.hp = agent.definition.max_hp;
                agent.pending_element = None;
                agent.enter_state(EnemyState::Idle);
                return FsmOutcome::still();
            }
            let dir = flat_direction(agent.position, agent.spawn);
            agent.facing = dir;
            FsmOutcome {
                velocity: dir * agent.definition.move_speed,
                ..FsmOutcome::still()
            }
        }

        EnemyState::Dummy => FsmOutcome::still(),
    }
}

fn begin_alert(agent: &mut AgentInstance, toward: Vec3) {
    let dir = flat_direction(agent.position, toward);
    if dir != Vec3::ZERO {
        agent.facing = dir;
    }
    agent.enter_state(EnemyState::Alert);
    agent.alert_windup = ALERT_WINDUP;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::agent::{AgentId, AgentTemplates};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawn(template: &str, position: Vec3) -> AgentInstance {
        let templates = AgentTemplates::builtin();
        AgentInstance::new(AgentId(1), templates.get(template).clone(), position)
    }

    fn quiet_player(position: Vec3) -> PlayerView {
        PlayerView {
            position,
            speed: 0.0,
            attacking: false,
            alive: true,
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(9)
    }

    #[test]
    fn test_vision_requires_facing() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(0.0, 0.0, 1.0);
        // In front, inside the 10-unit radius: seen.
        assert!(perceives(&agent, &quiet_player(Vec3::new(0.0, 0.0, 8.0))));
        // Behind: not seen.
        assert!(!perceives(&agent, &quiet_player(Vec3::new(0.0, 0.0, -8.0))));
        // In front but outside the radius: not seen.
        assert!(!perceives(&agent, &quiet_player(Vec3::new(0.0, 0.0, 12.0))));
    }

    #[test]
    fn test_audio_ignores_facing() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(0.0, 0.0, 1.0);
        let mut player = quiet_player(Vec3::new(0.0, 0.0, -12.0));
        // Quiet: unheard. Sprinting: heard even from behind.
        assert!(!perceives(&agent, &player));
        player.speed = 9.0;
        assert!(perceives(&agent, &player));
        // Walking noise (0.4) stays under the threshold.
        player.speed = 4.0;
        assert!(!perceives(&agent, &player));
    }

    #[test]
    fn test_sprint_at_12_units_heard_walk_is_not() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(-1.0, 0.0, 0.0);
        let mut player = quiet_player(Vec3::new(12.0, 0.0, 0.0));
        player.speed = 9.0;
        assert!(perceives(&agent, &player), "sprint at 12 units should be heard");
        player.speed = 4.0;
        assert!(!perceives(&agent, &player), "walk at 12 units should go unnoticed");
    }

    #[test]
    fn test_detection_at_8_units_in_cone() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(1.0, 0.0, 0.0);
        assert!(perceives(&agent, &quiet_player(Vec3::new(8.0, 0.0, 0.0))));
    }

    #[test]
    fn test_alert_windup_then_chase() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(0.0, 0.0, 1.0);
        let player = quiet_player(Vec3::new(0.0, 0.0, 6.0));
        let mut rng = rng();

        let out = tick(&mut agent, &player, 0.1, &mut rng);
        assert_eq!(agent.state, EnemyState::Alert);
        assert!(!out.propagate_alert);
        assert_eq!(out.velocity, Vec3::ZERO);

        // Still winding up at 0.6 s; no ally wakeup yet.
        for _ in 0..5 {
            let out = tick(&mut agent, &player, 0.1, &mut rng);
            assert!(!out.propagate_alert);
        }
        assert_eq!(agent.state, EnemyState::Alert);

        // Past 1.0 s: chasing, and allies are woken on the transition tick.
        let mut woke = false;
        for _ in 0..6 {
            let out = tick(&mut agent, &player, 0.1, &mut rng);
            if agent.state == EnemyState::Chase {
                woke = out.propagate_alert;
                break;
            }
        }
        assert_eq!(agent.state, EnemyState::Chase);
        assert!(woke);
    }

    #[test]
    fn test_ally_wakeup_waits_for_windup() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(0.0, 0.0, 1.0);
        let player = quiet_player(Vec3::new(0.0, 0.0, 6.0));
        let mut rng = rng();
        // Spotting the player starts the windup without waking allies.
        let out = tick(&mut agent, &player, 0.1, &mut rng);
        assert_eq!(agent.state, EnemyState::Alert);
        assert!(!out.propagate_alert);
        // The windup expiring is the wakeup.
        let out = tick(&mut agent, &player, ALERT_WINDUP, &mut rng);
        assert_eq!(agent.state, EnemyState::Chase);
        assert!(out.propagate_alert);
    }

    #[test]
    fn test_damage_alert_skips_windup() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.facing = Vec3::new(0.0, 0.0, 1.0);
        // Player hiding behind the wolf.
        let player = quiet_player(Vec3::new(0.0, 0.0, -20.0));
        alert(&mut agent, player.position, 0.0);
        assert_eq!(agent.state, EnemyState::Alert);

        let mut rng = rng();
        tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(agent.state, EnemyState::Chase);
    }

    #[test]
    fn test_propagated_alert_uses_short_windup() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        alert(&mut agent, Vec3::new(5.0, 0.0, 0.0), PROPAGATED_WINDUP);
        assert_eq!(agent.alert_windup, PROPAGATED_WINDUP);
        // A second, weaker stimulus never lengthens the windup.
        alert(&mut agent, Vec3::new(5.0, 0.0, 0.0), ALERT_WINDUP);
        assert_eq!(agent.alert_windup, PROPAGATED_WINDUP);
    }

    #[test]
    fn test_chase_moves_toward_player() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.enter_state(EnemyState::Chase);
        let player = quiet_player(Vec3::new(0.0, 0.0, 6.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.016, &mut rng);
        assert!(out.velocity.z > 0.0);
        assert!((out.velocity.length() - agent.definition.move_speed).abs() < 1e-4);
    }

    #[test]
    fn test_leash_overrides_chase() {
        let mut agent = spawn("wolf", Vec3::new(LEASH_RADIUS + 1.0, 0.0, 0.0));
        agent.spawn = Vec3::ZERO;
        agent.enter_state(EnemyState::Chase);
        // Player right next to the agent: leash still wins.
        let player = quiet_player(agent.position + Vec3::new(1.0, 0.0, 0.0));
        let mut rng = rng();
        tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(agent.state, EnemyState::Return);
    }

    #[test]
    fn test_attack_windup_cooldown_cycle() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.enter_state(EnemyState::Chase);
        let player = quiet_player(Vec3::new(0.0, 0.0, 1.0));
        let mut rng = rng();

        // In range with cooldown ready: winds up.
        tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(agent.state, EnemyState::Attack);

        // Windup ticks down without landing.
        let out = tick(&mut agent, &player, 0.3, &mut rng);
        assert!(out.attack.is_none());

        // Windup expires: the hit lands, cooldown starts.
        let out = tick(&mut agent, &player, 0.3, &mut rng);
        let hit = out.attack.expect("attack should land");
        assert_eq!(hit.damage, agent.definition.attack_damage);
        assert_eq!(agent.state, EnemyState::Chase);
        assert!(agent.attack_cooldown > 0.0);

        // Still in range, but on cooldown: no new windup.
        tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(agent.state, EnemyState::Chase);
    }

    #[test]
    fn test_attack_whiffs_out_of_reach() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.enter_state(EnemyState::Attack);
        agent.attack_windup = 0.1;
        // Player escaped past 1.5x range during the windup.
        let reach = agent.definition.attack_range * ATTACK_REACH_MULTIPLIER;
        let player = quiet_player(Vec3::new(0.0, 0.0, reach + 1.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.2, &mut rng);
        assert!(out.attack.is_none());
        assert_eq!(agent.state, EnemyState::Chase);
    }

    #[test]
    fn test_ranged_kites_when_crowded() {
        let mut agent = spawn("bandit_archer", Vec3::ZERO);
        agent.enter_state(EnemyState::Chase);
        let player = quiet_player(Vec3::new(0.0, 0.0, 3.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.016, &mut rng);
        assert!(out.velocity.z < 0.0, "archer should back away");
    }

    #[test]
    fn test_magic_caster_does_not_kite() {
        let mut agent = spawn("marsh_witch", Vec3::ZERO);
        agent.enter_state(EnemyState::Chase);
        // Inside the archer kiting distance but within attack range:
        // the caster stands and begins a cast instead of backing off.
        let player = quiet_player(Vec3::new(0.0, 0.0, 3.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(out.velocity, Vec3::ZERO);
        assert_eq!(agent.state, EnemyState::Attack);
    }

    #[test]
    fn test_return_regen_rate() {
        // 500/1000 hp; two seconds of return regen adds 10%/s = 200.
        let mut agent = spawn("ember_tyrant", Vec3::new(20.0, 0.0, 0.0));
        agent.spawn = Vec3::ZERO;
        agent.hp = 500.0;
        agent.enter_state(EnemyState::Return);
        // Anchor far enough that 2 s of walking does not arrive.
        agent.position = Vec3::new(30.0, 0.0, 0.0);
        let player = quiet_player(Vec3::new(100.0, 0.0, 0.0));
        let mut rng = rng();
        for _ in 0..20 {
            tick(&mut agent, &player, 0.1, &mut rng);
        }
        assert!((agent.hp - 700.0).abs() < 1.0, "hp was {}", agent.hp);
        assert_eq!(agent.state, EnemyState::Return);
    }

    #[test]
    fn test_return_completes_with_full_heal() {
        let mut agent = spawn("wolf", Vec3::new(0.5, 0.0, 0.0));
        agent.spawn = Vec3::ZERO;
        agent.hp = 10.0;
        agent.pending_element = Some(Element::Pyro);
        agent.enter_state(EnemyState::Return);
        let player = quiet_player(Vec3::new(100.0, 0.0, 0.0));
        let mut rng = rng();
        tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(agent.state, EnemyState::Idle);
        assert_eq!(agent.hp, agent.definition.max_hp);
        assert_eq!(agent.pending_element, None);
    }

    #[test]
    fn test_idle_to_patrol_and_back() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        let player = quiet_player(Vec3::new(100.0, 0.0, 0.0));
        let mut rng = rng();

        // The longest possible dwell expires and a patrol target near
        // spawn is picked.
        for _ in 0..105 {
            tick(&mut agent, &player, 0.1, &mut rng);
        }
        assert_eq!(agent.state, EnemyState::Patrol);
        let target = agent.patrol_target.expect("patrol target set");
        assert!(flat_distance(agent.spawn, target) <= PATROL_RADIUS + 1e-4);

        // Walk it there; patrol completes back to Idle.
        for _ in 0..200 {
            let out = tick(&mut agent, &player, 0.1, &mut rng);
            agent.position += out.velocity * 0.1;
            if agent.state == EnemyState::Idle {
                break;
            }
        }
        assert_eq!(agent.state, EnemyState::Idle);
    }

    #[test]
    fn test_idle_dwell_between_five_and_ten_seconds() {
        let player = quiet_player(Vec3::new(100.0, 0.0, 0.0));
        for seed in 0..8u64 {
            let mut agent = spawn("wolf", Vec3::ZERO);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            // 4.9 s elapsed: no roll is that short.
            for _ in 0..49 {
                tick(&mut agent, &player, 0.1, &mut rng);
            }
            assert_eq!(agent.state, EnemyState::Idle, "seed {seed} left idle early");
            // By 10.1 s every roll has expired.
            for _ in 0..52 {
                tick(&mut agent, &player, 0.1, &mut rng);
            }
            assert_eq!(agent.state, EnemyState::Patrol, "seed {seed} never patrolled");
        }
    }

    #[test]
    fn test_freeze_immobilizes() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.enter_state(EnemyState::Chase);
        agent.freeze_timer = 0.5;
        let player = quiet_player(Vec3::new(0.0, 0.0, 6.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.1, &mut rng);
        assert_eq!(out.velocity, Vec3::ZERO);
        assert_eq!(agent.state, EnemyState::Chase);
        assert!((agent.freeze_timer - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_stagger_clears_posture_when_over() {
        let mut agent = spawn("ember_tyrant", Vec3::ZERO);
        agent.posture = 100.0;
        agent.stagger_timer = 0.1;
        let player = quiet_player(Vec3::new(0.0, 0.0, 6.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.2, &mut rng);
        assert_eq!(out.velocity, Vec3::ZERO);
        assert_eq!(agent.stagger_timer, 0.0);
        assert_eq!(agent.posture, 0.0);
    }

    #[test]
    fn test_chase_gives_up_after_losing_target() {
        // Mid-chase, away from spawn, so giving up leaves a real walk home.
        let mut agent = spawn("wolf", Vec3::new(10.0, 0.0, 0.0));
        agent.spawn = Vec3::ZERO;
        agent.enter_state(EnemyState::Chase);
        // Player far outside both vision and hearing.
        let player = quiet_player(Vec3::new(40.0, 0.0, 0.0));
        let mut rng = rng();
        for _ in 0..35 {
            tick(&mut agent, &player, 0.1, &mut rng);
        }
        assert_eq!(agent.state, EnemyState::Return);
    }

    #[test]
    fn test_dead_player_ends_engagement() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.enter_state(EnemyState::Chase);
        let mut player = quiet_player(Vec3::new(0.0, 0.0, 3.0));
        player.alive = false;
        let mut rng = rng();
        tick(&mut agent, &player, 0.016, &mut rng);
        assert_eq!(agent.state, EnemyState::Return);
    }

    #[test]
    fn test_dummy_never_acts() {
        let mut agent = spawn("training_dummy", Vec3::ZERO);
        let player = quiet_player(Vec3::new(0.0, 0.0, 1.0));
        let mut rng = rng();
        for _ in 0..100 {
            let out = tick(&mut agent, &player, 0.1, &mut rng);
            assert_eq!(out.velocity, Vec3::ZERO);
            assert!(out.attack.is_none());
        }
        assert_eq!(agent.state, EnemyState::Dummy);
    }

    #[test]
    fn test_dead_agent_produces_nothing() {
        let mut agent = spawn("wolf", Vec3::ZERO);
        agent.hp = 0.0;
        agent.enter_state(EnemyState::Chase);
        let player = quiet_player(Vec3::new(0.0, 0.0, 1.0));
        let mut rng = rng();
        let out = tick(&mut agent, &player, 0.1, &mut rng);
        assert_eq!(out.velocity, Vec3::ZERO);
        assert!(out.attack.is_none());
    }
}
