//! Stateless damage and elemental-reaction resolution.
//!
//! Everything here is a pure function of its inputs: the caller owns all
//! mutation (hp, pending element, knockback impulses). Centralizing damage
//! response here keeps weak-point and stagger handling out of the FSM.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::facing_cosine;

/// Weak-point hits multiply damage by this factor.
pub const WEAK_POINT_MULTIPLIER: f32 = 3.0;
/// Non-weak-point hits on tank-class targets are halved.
pub const TANK_ARMOR_MULTIPLIER: f32 = 0.5;
/// A facing tank blocks 80% of incoming damage.
pub const BLOCK_MULTIPLIER: f32 = 0.2;
/// Cosine threshold for the directional block (~60 degree half-angle).
pub const BLOCK_FACING_COSINE: f32 = 0.5;

pub const FREEZE_DURATION: f32 = 3.0;
pub const OVERLOAD_BONUS_DAMAGE: f32 = 50.0;
pub const OVERLOAD_KNOCKBACK: f32 = 10.0;
pub const MELT_MULTIPLIER: f32 = 2.0;
pub const VAPORIZE_MULTIPLIER: f32 = 1.5;

/// Posture damage a weak-point hit deals to an elite's stagger bar.
pub const WEAK_POINT_POSTURE_DAMAGE: f32 = 25.0;
/// Staggered targets take extra damage.
pub const STAGGER_DAMAGE_MULTIPLIER: f32 = 1.5;
pub const STAGGER_DURATION: f32 = 4.0;

/// Element tags carried by attacks and pending on targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Pyro,
    Hydro,
    Cryo,
    Electro,
}

/// Reaction triggered when two specific elements meet on one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionKind {
    /// 3 s immobilize.
    Freeze,
    /// Flat bonus damage plus knockback.
    Overload,
    /// x2.0 damage.
    Melt,
    /// x1.5 damage.
    Vaporize,
}

/// Reaction lookup. Symmetric and order-independent; unlisted pairings
/// (including same-element) produce no reaction.
pub fn reaction_between(a: Element, b: Element) -> Option<ReactionKind> {
    use Element::*;
    match (a, b) {
        (Hydro, Cryo) | (Cryo, Hydro) => Some(ReactionKind::Freeze),
        (Pyro, Electro) | (Electro, Pyro) => Some(ReactionKind::Overload),
        (Pyro, Cryo) | (Cryo, Pyro) => Some(ReactionKind::Melt),
        (Pyro, Hydro) | (Hydro, Pyro) => Some(ReactionKind::Vaporize),
        _ => None,
    }
}

/// Defensive posture of the damage target at the moment of the hit.
#[derive(Clone, Copy, Debug)]
pub struct DefenseProfile {
    /// Tank archetype (or the player analog: actively guarding).
    pub blocks_when_facing: bool,
    /// Tank archetype armor applies to non-weak-point hits.
    pub armored: bool,
    pub position: Vec3,
    pub forward: Vec3,
    /// Element already sitting on the target, if any.
    pub pending_element: Option<Element>,
    /// Elite stagger: currently in the vulnerable window.
    pub staggered: bool,
}

/// Everything the caller must apply after a resolved hit.
#[derive(Clone, Copy, Debug)]
pub struct Resolution {
    pub damage: f32,
    pub reaction: Option<ReactionKind>,
    /// New pending element for the target. A reaction always consumes the
    /// old one; a non-reacting elemental hit overwrites it.
    pub pending_element: Option<Element>,
    /// Knockback magnitude away from the damage source.
    pub knockback: f32,
    /// Immobilize duration (freeze), zero when absent.
    pub freeze_duration: f32,
    /// Damage to an elite's stagger bar.
    pub posture_damage: f32,
}

/// Resolve one damage event against a target.
pub fn resolve(
    base_amount: f32,
    element: Option<Element>,
    weak_point: bool,
    source_position: Vec3,
    defense: &DefenseProfile,
) -> Resolution {
    let mut damage = base_amount;

    if weak_point {
        damage *= WEAK_POINT_MULTIPLIER;
    } else if defense.armored {
        damage *= TANK_ARMOR_MULTIPLIER;
    }

    // Directional block: only when the defender faces the source.
    if defense.blocks_when_facing
        && facing_cosine(defense.position, defense.forward, source_position)
            > BLOCK_FACING_COSINE
    {
        damage *= BLOCK_MULTIPLIER;
    }

    let mut reaction = None;
    let mut pending = defense.pending_element;
    let mut knockback = 0.0;
    let mut freeze_duration = 0.0;

    match (element, defense.pending_element) {
        (Some(incoming), Some(prior)) => {
            if let Some(kind) = reaction_between(incoming, prior) {
                match kind {
                    ReactionKind::Freeze => freeze_duration = FREEZE_DURATION,
                    ReactionKind::Overload => {
                        damage += OVERLOAD_BONUS_DAMAGE;
                        knockback = OVERLOAD_KNOCKBACK;
                    }
                    ReactionKind::Melt => damage *= MELT_MULTIPLIER,
                    ReactionKind::Vaporize => damage *= VAPORIZE_MULTIPLIER,
                }
                reaction = Some(kind);
                // The reaction consumes the target's pending element.
                pending = None;
            } else {
                pending = Some(incoming);
            }
        }
        (Some(incoming), None) => pending = Some(incoming),
        (None, _) => {}
    }

    if defense.staggered {
        damage *= STAGGER_DAMAGE_MULTIPLIER;
    }

    Resolution {
        damage,
        reaction,
        pending_element: pending,
        knockback,
        freeze_duration,
        posture_damage: if weak_point { WEAK_POINT_POSTURE_DAMAGE } else { 0.0 },
    }
}

/// One weighted entry in a loot table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LootEntry {
    pub item: String,
    /// Independent drop chance in [0, 1].
    pub chance: f32,
    pub min: u32,
    pub max: u32,
}

/// Roll a loot table: each entry rolls its chance independently, then an
/// independent uniform count in [min, max].
pub fn roll_loot<R: Rng>(table: &[LootEntry], rng: &mut R) -> Vec<(String, u32)> {
    let mut drops = Vec::new();
    for entry in table {
        if rng.gen_range(0.0..1.0) >= entry.chance {
            continue;
        }
        let lo = entry.min.min(entry.max);
        let hi = entry.min.max(entry.max);
        let count = rng.gen_range(lo..=hi);
        if count > 0 {
            drops.push((entry.item.clone(), count));
        }
    }
    drops
}
