//! Player locomotion: movement states, stamina, and velocity resolution.
//!
//! Input arrives as an intent snapshot and the environment as a probe
//! result; this module turns the pair into a state transition plus a
//! desired velocity. Gravity is the physics bridge's job except in the
//! states that explicitly shape vertical motion (glide, climb, swim).

use glam::Vec3;

pub const MAX_STAMINA: f32 = 100.0;
pub const STAMINA_REGEN: f32 = 20.0;
pub const SPRINT_DRAIN: f32 = 10.0;
pub const GLIDE_DRAIN: f32 = 8.0;
pub const CLIMB_DRAIN: f32 = 15.0;
pub const SURF_DRAIN: f32 = 12.0;
pub const DODGE_COST: f32 = 20.0;

pub const WALK_SPEED: f32 = 2.5;
pub const RUN_SPEED: f32 = 5.0;
pub const SPRINT_SPEED: f32 = 9.0;
pub const SWIM_SPEED: f32 = 2.0;
pub const SURF_SPEED: f32 = 6.5;
pub const CLIMB_SPEED: f32 = 1.5;
pub const GLIDE_SPEED: f32 = 4.0;
/// Gentle descent rate while gliding.
pub const GLIDE_FALL_SPEED: f32 = 2.0;
pub const DODGE_SPEED: f32 = 12.0;
pub const DODGE_DURATION: f32 = 0.4;
/// Air steering speed while falling.
const AIR_CONTROL_SPEED: f32 = 4.0;
/// Accelerated descent while diving.
const DIVE_FALL_SPEED: f32 = 20.0;
const JUMP_SPEED: f32 = 6.5;

/// Player movement states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Walk,
    Run,
    Sprint,
    /// Airborne without a glider.
    Air,
    Dodge,
    /// Fast, steep descent.
    Dive,
    Glide,
    Climb,
    Swim,
    /// Fast swimming; the aquatic analog of sprint.
    Surf,
    /// Standing block; damage from the front is mostly absorbed.
    Guard,
}

/// One frame of player input.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputIntent {
    /// Desired horizontal move direction, unit length or zero.
    pub move_dir: Vec3,
    pub walk: bool,
    pub sprint: bool,
    pub jump: bool,
    pub dodge: bool,
    /// Glider held while airborne.
    pub glide: bool,
    /// Dive held while airborne.
    pub dive: bool,
    pub guard: bool,
    pub climb: bool,
}

/// Environment probe around the player's body.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSample {
    pub grounded: bool,
    pub in_water: bool,
    /// A climbable surface is within grab range.
    pub on_wall: bool,
}

/// Velocity request handed to the physics bridge.
#[derive(Clone, Copy, Debug)]
pub struct LocomotionOutput {
    pub velocity: Vec3,
    /// When set, the vertical component replaces gravity's; otherwise
    /// only the horizontal part is applied.
    pub override_vertical: bool,
}

/// Player movement state machine.
pub struct PlayerLocomotion {
    pub state: PlayerState,
    pub stamina: f32,
    /// Unit facing on the XZ plane; persists when input goes idle.
    pub facing: Vec3,
    dodge_timer: f32,
    dodge_dir: Vec3,
    /// Edge trigger: a new dodge needs the button released first.
    dodge_ready: bool,
    jump_requested: bool,
}

impl PlayerLocomotion {
    pub fn new() -> Self {
        Self {
            state: PlayerState::Idle,
            stamina: MAX_STAMINA,
            facing: Vec3::new(0.0, 0.0, 1.0),
            dodge_timer: 0.0,
            dodge_dir: Vec3::ZERO,
            dodge_ready: true,
            jump_requested: false,
        }
    }

    /// Whether the player is currently guarding (front block active).
    pub fn is_guarding(&self) -> bool {
        self.state == PlayerState::Guard
    }

    /// Pending jump impulse, cleared once read.
    pub fn take_jump(&mut self) -> Option<f32> {
        if self.jump_requested {
            self.jump_requested = false;
            Some(JUMP_SPEED)
        } else {
            None
        }
    }

    /// Advance the state machine and produce this frame's velocity.
    pub fn update(&mut self, input: &InputIntent, env: &EnvSample, dt: f32) -> LocomotionOutput {
        if input.move_dir != Vec3::ZERO {
            self.facing = input.move_dir.normalize();
        }
        if !input.dodge {
            self.dodge_ready = true;
        }

        let next = self.next_state(input, env);
        if next != self.state {
            log::trace!("player {:?} -> {:?}", self.state, next);
            if next == PlayerState::Dodge {
                self.stamina -= DODGE_COST;
                self.dodge_timer = DODGE_DURATION;
                self.dodge_ready = false;
                self.dodge_dir = if input.move_dir != Vec3::ZERO {
                    input.move_dir.normalize()
                } else {
                    self.facing
                };
            }
            self.state = next;
        }

        if input.jump && env.grounded && self.state != PlayerState::Dodge {
            self.jump_requested = true;
        }

        let out = self.velocity_for(input, dt);
        self.apply_stamina(dt);
        out
    }

    fn next_state(&self, input: &InputIntent, env: &EnvSample) -> PlayerState {
        use PlayerState::*;

        // A running dodge finishes before anything else is considered;
        // once the timer expires the state falls through to the normal
        // selection, and re-entry needs a fresh press (edge trigger).
        if self.state == Dodge && self.dodge_timer > 0.0 {
            return Dodge;
        }

        if env.in_water {
            return if input.sprint && self.stamina > 0.0 { Surf } else { Swim };
        }

        if self.state == Climb {
            // Hold the wall until it ends, stamina runs out, or we let go.
            if env.on_wall && input.climb && self.stamina > 0.0 {
                return Climb;
            }
            return if env.grounded { Idle } else { Air };
        }
        if env.on_wall && input.climb && self.stamina > 0.0 && !env.grounded {
            return Climb;
        }

        if !env.grounded {
            if input.dive {
                return Dive;
            }
            if input.glide && self.stamina > 0.0 {
                return Glide;
            }
            return Air;
        }

        // Grounded.
        if input.dodge && self.dodge_ready && self.stamina >= DODGE_COST {
            return Dodge;
        }
        if input.guard {
            return Guard;
        }
        if input.move_dir == Vec3::ZERO {
            return Idle;
        }
        if input.sprint && self.stamina > 0.0 {
            return Sprint;
        }
        if input.walk {
            return Walk;
        }
        Run
    }

    fn velocity_for(&mut self, input: &InputIntent, dt: f32) -> LocomotionOutput {
        use PlayerState::*;
        let dir = if input.move_dir != Vec3::ZERO {
            input.move_dir.normalize()
        } else {
            Vec3::ZERO
        };

        match self.state {
            Idle | Guard => LocomotionOutput {
                velocity: Vec3::ZERO,
                override_vertical: false,
            },
            Walk => LocomotionOutput {
                velocity: dir * WALK_SPEED,
                override_vertical: false,
            },
            Run => LocomotionOutput {
                velocity: dir * RUN_SPEED,
                override_vertical: false,
            },
            Sprint => LocomotionOutput {
                velocity: dir * SPRINT_SPEED,
                override_vertical: false,
            },
            Dodge => {
                self.dodge_timer = (self.dodge_timer - dt).max(0.0);
                LocomotionOutput {
                    velocity: self.dodge_dir * DODGE_SPEED,
                    override_vertical: false,
                }
            }
            Air => LocomotionOutput {
                velocity: dir * AIR_CONTROL_SPEED,
                override_vertical: false,
            },
            Dive => LocomotionOutput {
                velocity: dir * AIR_CONTROL_SPEED + Vec3::new(0.0, -DIVE_FALL_SPEED, 0.0),
                override_vertical: true,
            },
            Glide => LocomotionOutput {
                velocity: dir * GLIDE_SPEED + Vec3::new(0.0, -GLIDE_FALL_SPEED, 0.0),
                override_vertical: true,
            },
            Climb => {
                // Vertical motion along the wall; forward input climbs up.
                let up = if input.move_dir != Vec3::ZERO { CLIMB_SPEED } else { 0.0 };
                LocomotionOutput {
                    velocity: Vec3::new(0.0, up, 0.0),
                    override_vertical: true,
                }
            }
            Swim => LocomotionOutput {
                velocity: dir * SWIM_SPEED,
                override_vertical: true,
            },
            Surf => LocomotionOutput {
                velocity: dir * SURF_SPEED,
                override_vertical: true,
            },
        }
    }

    fn apply_stamina(&mut self, dt: f32) {
        use PlayerState::*;
        let drain = match self.state {
            Sprint => SPRINT_DRAIN,
            Glide => GLIDE_DRAIN,
            Climb => CLIMB_DRAIN,
            Surf => SURF_DRAIN,
            // Dodge pays its cost up front; falling and swimming are free.
            _ => 0.0,
        };
        if drain > 0.0 {
            self.stamina = (self.stamina - drain * dt).max(0.0);
        } else if self.state != Dodge {
            self.stamina = (self.stamina + STAMINA_REGEN * dt).min(MAX_STAMINA);
        }
    }
}

impl Default for PlayerLocomotion {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> EnvSample {
        EnvSample { grounded: true, in_water: false, on_wall: false }
    }

    fn airborne() -> EnvSample {
        EnvSample { grounded: false, in_water: false, on_wall: false }
    }

    fn forward() -> Vec3 {
        Vec3::new(0.0, 0.0, 1.0)
    }

    #[test]
    fn test_ground_speed_tiers() {
        let mut p = PlayerLocomotion::new();
        let mut input = InputIntent { move_dir: forward(), ..Default::default() };

        let out = p.update(&input, &ground(), 0.016);
        assert_eq!(p.state, PlayerState::Run);
        assert!((out.velocity.length() - RUN_SPEED).abs() < 1e-4);

        input.walk = true;
        let out = p.update(&input, &ground(), 0.016);
        assert_eq!(p.state, PlayerState::Walk);
        assert!((out.velocity.length() - WALK_SPEED).abs() < 1e-4);

        input.walk = false;
        input.sprint = true;
        let out = p.update(&input, &ground(), 0.016);
        assert_eq!(p.state, PlayerState::Sprint);
        assert!((out.velocity.length() - SPRINT_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_sprint_drains_and_idle_regens() {
        let mut p = PlayerLocomotion::new();
        let sprint = InputIntent {
            move_dir: forward(),
            sprint: true,
            ..Default::default()
        };
        // Two seconds of sprint: 100 - 20 = 80.
        for _ in 0..20 {
            p.update(&sprint, &ground(), 0.1);
        }
        assert!((p.stamina - 80.0).abs() < 0.5, "stamina was {}", p.stamina);

        // One second idle: +20, capped at max.
        let idle = InputIntent::default();
        for _ in 0..10 {
            p.update(&idle, &ground(), 0.1);
        }
        assert!((p.stamina - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_sprint_exhaustion_drops_to_run() {
        let mut p = PlayerLocomotion::new();
        p.stamina = 0.0;
        let sprint = InputIntent {
            move_dir: forward(),
            sprint: true,
            ..Default::default()
        };
        p.update(&sprint, &ground(), 0.016);
        assert_eq!(p.state, PlayerState::Run);
    }

    #[test]
    fn test_dodge_burst_and_cost() {
        let mut p = PlayerLocomotion::new();
        let dodge = InputIntent {
            move_dir: forward(),
            dodge: true,
            ..Default::default()
        };
        let out = p.update(&dodge, &ground(), 0.016);
        assert_eq!(p.state, PlayerState::Dodge);
        assert!((out.velocity.length() - DODGE_SPEED).abs() < 1e-4);
        assert!((p.stamina - 80.0).abs() < 1e-3);

        // Dodge runs its full duration even when input changes.
        let idle = InputIntent::default();
        for _ in 0..20 {
            let out = p.update(&idle, &ground(), 0.02);
            if p.state != PlayerState::Dodge {
                break;
            }
            assert!((out.velocity.length() - DODGE_SPEED).abs() < 1e-4);
        }
        assert_ne!(p.state, PlayerState::Dodge);
    }

    #[test]
    fn test_held_dodge_ends_after_burst() {
        // Holding the button must not extend the burst past its duration.
        let mut p = PlayerLocomotion::new();
        let held = InputIntent {
            move_dir: forward(),
            dodge: true,
            ..Default::default()
        };
        for _ in 0..100 {
            p.update(&held, &ground(), 0.05);
        }
        assert_ne!(p.state, PlayerState::Dodge, "dodge held past its duration");
        // One burst's cost paid, then fully regenerated while running.
        assert!((p.stamina - MAX_STAMINA).abs() < 1e-3);
    }

    #[test]
    fn test_dodge_reentry_needs_fresh_press() {
        let mut p = PlayerLocomotion::new();
        let held = InputIntent {
            move_dir: forward(),
            dodge: true,
            ..Default::default()
        };
        for _ in 0..30 {
            p.update(&held, &ground(), 0.02);
        }
        assert_ne!(p.state, PlayerState::Dodge);
        // Still holding: no second burst.
        p.update(&held, &ground(), 0.02);
        assert_ne!(p.state, PlayerState::Dodge);

        // Release, press again: new burst, new cost.
        let released = InputIntent { move_dir: forward(), ..Default::default() };
        p.update(&released, &ground(), 0.02);
        let before = p.stamina;
        p.update(&held, &ground(), 0.02);
        assert_eq!(p.state, PlayerState::Dodge);
        assert!((before - p.stamina - DODGE_COST).abs() < 1e-3);
    }

    #[test]
    fn test_dodge_requires_stamina() {
        let mut p = PlayerLocomotion::new();
        p.stamina = 10.0;
        let dodge = InputIntent {
            move_dir: forward(),
            dodge: true,
            ..Default::default()
        };
        p.update(&dodge, &ground(), 0.016);
        assert_ne!(p.state, PlayerState::Dodge);
    }

    #[test]
    fn test_glide_shapes_vertical_and_drains() {
        let mut p = PlayerLocomotion::new();
        let glide = InputIntent {
            move_dir: forward(),
            glide: true,
            ..Default::default()
        };
        let out = p.update(&glide, &airborne(), 0.1);
        assert_eq!(p.state, PlayerState::Glide);
        assert!(out.override_vertical);
        assert_eq!(out.velocity.y, -GLIDE_FALL_SPEED);
        assert!(p.stamina < MAX_STAMINA);

        // Stamina exhaustion closes the glider.
        p.stamina = 0.0;
        p.update(&glide, &airborne(), 0.016);
        assert_eq!(p.state, PlayerState::Air);
    }

    #[test]
    fn test_dive_beats_glide() {
        let mut p = PlayerLocomotion::new();
        let input = InputIntent {
            glide: true,
            dive: true,
            ..Default::default()
        };
        let out = p.update(&input, &airborne(), 0.016);
        assert_eq!(p.state, PlayerState::Dive);
        assert!(out.velocity.y < -GLIDE_FALL_SPEED);
    }

    #[test]
    fn test_climb_until_exhausted() {
        let mut p = PlayerLocomotion::new();
        p.stamina = 1.5;
        let env = EnvSample { grounded: false, in_water: false, on_wall: true };
        let climb = InputIntent {
            move_dir: forward(),
            climb: true,
            ..Default::default()
        };
        let out = p.update(&climb, &env, 0.05);
        assert_eq!(p.state, PlayerState::Climb);
        assert_eq!(out.velocity.y, CLIMB_SPEED);
        assert!(out.override_vertical);

        // 1.5 stamina at 15/s lasts 0.1 s.
        p.update(&climb, &env, 0.1);
        p.update(&climb, &env, 0.1);
        assert_eq!(p.state, PlayerState::Air);
    }

    #[test]
    fn test_water_overrides_ground_states() {
        let mut p = PlayerLocomotion::new();
        let env = EnvSample { grounded: false, in_water: true, on_wall: false };
        let mut input = InputIntent { move_dir: forward(), ..Default::default() };

        let out = p.update(&input, &env, 0.016);
        assert_eq!(p.state, PlayerState::Swim);
        assert!((out.velocity.length() - SWIM_SPEED).abs() < 1e-4);

        input.sprint = true;
        let out = p.update(&input, &env, 0.1);
        assert_eq!(p.state, PlayerState::Surf);
        assert!((out.velocity.length() - SURF_SPEED).abs() < 1e-4);
        assert!(p.stamina < MAX_STAMINA);
    }

    #[test]
    fn test_guard_stops_movement() {
        let mut p = PlayerLocomotion::new();
        let input = InputIntent {
            move_dir: forward(),
            guard: true,
            ..Default::default()
        };
        let out = p.update(&input, &ground(), 0.016);
        assert!(p.is_guarding());
        assert_eq!(out.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_jump_impulse_consumed_once() {
        let mut p = PlayerLocomotion::new();
        let input = InputIntent { jump: true, ..Default::default() };
        p.update(&input, &ground(), 0.016);
        assert!(p.take_jump().is_some());
        assert!(p.take_jump().is_none());
    }

    #[test]
    fn test_facing_persists_when_idle() {
        let mut p = PlayerLocomotion::new();
        let east = InputIntent { move_dir: Vec3::new(1.0, 0.0, 0.0), ..Default::default() };
        p.update(&east, &ground(), 0.016);
        p.update(&InputIntent::default(), &ground(), 0.016);
        assert_eq!(p.facing, Vec3::new(1.0, 0.0, 0.0));
    }
}
