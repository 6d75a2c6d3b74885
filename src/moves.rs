use crate::effects::{EffectCondition, MoveEffect};
use crate::errors::{EffectError, EffectResult, MoveError, MoveResult};
use crate::field::{DanceCategory, FieldEffect};
use crate::fighter::{Element, FighterTag, Resource, Shield};
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Who a move may be aimed at.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCategory {
    User,
    SingleAlly,
    SingleAllyOrUser,
    SingleEnemy,
    OwnTeam,
    EnemyTeam,
    Field,
}

/// Optional restriction of target candidates to a capability subset.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetingRule {
    pub required_tag: Option<FighterTag>,
}

impl TargetingRule {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn requiring(tag: FighterTag) -> Self {
        Self {
            required_tag: Some(tag),
        }
    }
}

/// The offensive numbers of an attacking move.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttackProfile {
    /// Chance to connect, 0..=100.
    pub accuracy: u8,
    /// Chance to critically strike, 0..=100.
    pub crit_chance: u8,
    pub power: u32,
    /// Elemental attacks scale off magic instead of strength.
    pub element: Option<Element>,
}

impl AttackProfile {
    pub fn new(accuracy: u8, crit_chance: u8, power: u32) -> MoveResult<Self> {
        if accuracy > 100 {
            return Err(MoveError::AccuracyOutOfRange(accuracy));
        }
        if crit_chance > 100 {
            return Err(MoveError::CritChanceOutOfRange(crit_chance));
        }
        Ok(Self {
            accuracy,
            crit_chance,
            power,
            element: None,
        })
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }
}

/// A conditional bonus to an attack's power, granted when the condition
/// holds at resolution time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConditionalPowerBonus {
    pub condition: EffectCondition,
    pub bonus_power: u32,
}

/// Bespoke move behaviors that do not fit the other categories.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SpecialAction {
    /// Restore a defeated ally to a percentage of max health.
    Revive { percent: u8 },
    /// Strip every status from the target.
    Purge,
}

impl SpecialAction {
    pub fn revive(percent: u8) -> EffectResult<Self> {
        if percent == 0 || percent > 100 {
            return Err(EffectError::PercentOutOfRange {
                resource: Resource::Health,
                percent,
            });
        }
        Ok(SpecialAction::Revive { percent })
    }
}

/// The closed set of move categories, each parameterized by the data the
/// category needs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum MoveKind {
    Attack(AttackProfile),
    ConditionalPowerAttack {
        profile: AttackProfile,
        bonus: ConditionalPowerBonus,
    },
    /// Grants a status to the target.
    Status(Status),
    Special(SpecialAction),
    /// Registers a field effect for the acting side and a dance entry
    /// eligible for combination with a simultaneous dance.
    Dance {
        category: DanceCategory,
        effect: FieldEffect,
    },
    /// Attacks immediately, then the actor recharges for the given
    /// number of rounds.
    MultiTurn {
        profile: AttackProfile,
        recharge_rounds: u8,
    },
    /// Grants a shield to the target.
    Shield(Shield),
    /// Strengthens the target's existing shield.
    ShieldFortifier { bonus: u32 },
    /// An attack that shatters the target's shield before dealing damage.
    ShieldBuster(AttackProfile),
    /// Rings out a field effect, typically a magic burst against the
    /// opposing team.
    Bell(FieldEffect),
    DoNothing,
    /// Attempt to flee; success ends the battle and discards the rest of
    /// the round.
    Runaway { escape_chance: u8 },
    /// Consume an allied shade, restoring the actor by the shade's
    /// remaining-health percentage.
    AbsorbShade,
}

/// An immutable description of an action available in a round.
///
/// Moves are value records: customizing a shared template constructs a
/// new record through the `with_*` methods rather than mutating a clone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleMove {
    pub name: String,
    pub description: String,
    pub target: TargetCategory,
    /// Preempts speed-based turn ordering.
    pub priority: i32,
    pub mana_cost: u32,
    /// Optional display template; `[target]` is replaced with the
    /// target's name by presentation subscribers.
    pub execution_text: Option<String>,
    /// Conditional effects, evaluated in declaration order.
    pub effects: Vec<MoveEffect>,
    pub targeting: TargetingRule,
    pub kind: MoveKind,
}

impl BattleMove {
    pub fn new(name: &str, description: &str, target: TargetCategory, kind: MoveKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            target,
            priority: 0,
            mana_cost: 0,
            execution_text: None,
            effects: Vec::new(),
            targeting: TargetingRule::any(),
            kind,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_mana_cost(mut self, cost: u32) -> Self {
        self.mana_cost = cost;
        self
    }

    pub fn with_execution_text(mut self, template: &str) -> Self {
        self.execution_text = Some(template.to_string());
        self
    }

    pub fn with_effect(mut self, effect: MoveEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_targeting(mut self, rule: TargetingRule) -> Self {
        self.targeting = rule;
        self
    }

    /// The attack profile, when this move has one.
    pub fn attack_profile(&self) -> Option<&AttackProfile> {
        match &self.kind {
            MoveKind::Attack(profile)
            | MoveKind::ConditionalPowerAttack { profile, .. }
            | MoveKind::MultiTurn { profile, .. }
            | MoveKind::ShieldBuster(profile) => Some(profile),
            _ => None,
        }
    }
}

// Shared default instances, used verbatim wherever a fighter submits the
// universal action.
static RUN_AWAY: LazyLock<BattleMove> = LazyLock::new(|| {
    BattleMove::new(
        "Run Away",
        "Attempt to escape the battle.",
        TargetCategory::Field,
        MoveKind::Runaway { escape_chance: 50 },
    )
    .with_priority(5)
});

static DO_NOTHING: LazyLock<BattleMove> = LazyLock::new(|| {
    BattleMove::new(
        "Do Nothing",
        "Wait and watch.",
        TargetCategory::User,
        MoveKind::DoNothing,
    )
});

/// The shared runaway move.
pub fn run_away() -> &'static BattleMove {
    &RUN_AWAY
}

/// The shared do-nothing move.
pub fn do_nothing() -> &'static BattleMove {
    &DO_NOTHING
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::MoveEffect;

    #[test]
    fn attack_profile_validates_percentages() {
        assert!(matches!(
            AttackProfile::new(101, 10, 5),
            Err(MoveError::AccuracyOutOfRange(101))
        ));
        assert!(matches!(
            AttackProfile::new(90, 101, 5),
            Err(MoveError::CritChanceOutOfRange(101))
        ));
        assert!(AttackProfile::new(100, 100, 5).is_ok());
    }

    #[test]
    fn customizing_a_template_builds_a_new_record() {
        let template = BattleMove::new(
            "Cleave",
            "A sweeping strike.",
            TargetCategory::SingleEnemy,
            MoveKind::Attack(AttackProfile::new(90, 10, 4).unwrap()),
        );
        let bound = template
            .clone()
            .with_priority(2)
            .with_effect(MoveEffect::never_miss());

        assert_eq!(template.priority, 0);
        assert!(template.effects.is_empty());
        assert_eq!(bound.priority, 2);
        assert_eq!(bound.effects.len(), 1);
    }

    #[test]
    fn revive_percent_is_validated() {
        assert!(SpecialAction::revive(0).is_err());
        assert!(SpecialAction::revive(101).is_err());
        assert!(matches!(
            SpecialAction::revive(50),
            Ok(SpecialAction::Revive { percent: 50 })
        ));
    }

    #[test]
    fn shared_moves_are_stable_instances() {
        assert_eq!(run_away().name, "Run Away");
        assert!(std::ptr::eq(run_away(), run_away()));
        assert!(matches!(do_nothing().kind, MoveKind::DoNothing));
    }
}
