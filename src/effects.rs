use crate::errors::{EffectError, EffectResult};
use crate::field::DanceCategory;
use crate::fighter::Resource;
use serde::{Deserialize, Serialize};

/// When in a move's resolution an effect is considered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPhase {
    /// Consulted before any rolls are made; these effects shape the
    /// resolution itself (multipliers, roll bypasses).
    BeforeRoll,
    /// Applied after the move connected.
    OnHit,
}

/// A predicate evaluated against the move's resolved outcome (or the
/// ambient battle state). A failed condition only skips its own effect.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EffectCondition {
    /// The move connected and was not nullified by an evasion status.
    TargetDidNotEvade,
    /// The acting side currently has this dance effect live.
    DanceActive(DanceCategory),
}

/// What a conditional effect does when it fires.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EffectAction {
    /// Scales the attack's damage before the roll.
    DamageMultiplier(f64),
    /// Skip the accuracy roll entirely. Critical chance is still rolled
    /// and evasion statuses are still checked.
    NeverMiss,
    /// Connect through auto-evade statuses. Suppresses evasion only;
    /// a standing counter-attack still retaliates.
    IgnoreEvasion,
    /// Restore a percentage of the actor's resource pool.
    RestorePercent { resource: Resource, percent: u8 },
}

/// A conditional behavior attached to a move, evaluated against that
/// move's outcome. Effects are evaluated independently and in
/// declaration order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveEffect {
    pub phase: ActivationPhase,
    pub condition: Option<EffectCondition>,
    pub action: EffectAction,
}

impl MoveEffect {
    pub fn new(phase: ActivationPhase, action: EffectAction) -> Self {
        Self {
            phase,
            condition: None,
            action,
        }
    }

    pub fn when(mut self, condition: EffectCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Pre-roll damage multiplier.
    pub fn damage_multiplier(multiplier: f64) -> Self {
        Self::new(
            ActivationPhase::BeforeRoll,
            EffectAction::DamageMultiplier(multiplier),
        )
    }

    /// Unconditional miss bypass.
    pub fn never_miss() -> Self {
        Self::new(ActivationPhase::BeforeRoll, EffectAction::NeverMiss)
    }

    /// Unconditional evasion bypass.
    pub fn ignore_evasion() -> Self {
        Self::new(ActivationPhase::BeforeRoll, EffectAction::IgnoreEvasion)
    }

    /// Restoration effect applied to the actor on hit. The percentage
    /// must lie in (0, 100]; violations fail here, never at resolution.
    pub fn restore_on_hit(resource: Resource, percent: u8) -> EffectResult<Self> {
        if percent == 0 || percent > 100 {
            return Err(EffectError::PercentOutOfRange { resource, percent });
        }
        Ok(Self::new(
            ActivationPhase::OnHit,
            EffectAction::RestorePercent { resource, percent },
        ))
    }
}
