use crate::errors::{EffectError, EffectResult};
use crate::fighter::{Element, Resource, StatKind};
use serde::{Deserialize, Serialize};

/// The closed family of lingering per-fighter modifiers.
///
/// Two statuses are considered the same when their kinds match,
/// parameters included; the remaining-turn counter never participates
/// in that comparison.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum StatusKind {
    /// Automatically evade incoming attacks; optionally strike back
    /// after each evade.
    AutoEvade { counters: bool },
    /// Divides the afflicted fighter's own outgoing accuracy by 3.
    Blind,
    /// Retaliate after being hit by an attack.
    CounterAttack,
    /// Scales critical chance.
    CritBoost { multiplier: f64 },
    /// Scales outgoing damage of one element.
    ElementPower { element: Element, multiplier: f64 },
    /// Scales incoming damage of one element (below 1.0 resists).
    ElementResist { element: Element, multiplier: f64 },
    /// Scales one ordinary stat.
    StatBoost { stat: StatKind, multiplier: f64 },
    /// Scales mana costs (below 1.0 is a discount).
    SpellCost { multiplier: f64 },
    /// Redirects incoming magic of one element back at the attacker.
    Reflect {
        element: Element,
        power_multiplier: Option<f64>,
    },
    /// Restores a percentage of a resource pool every turn end.
    RestorePercent { resource: Resource, percent: u8 },
    /// Strips negative multipliers from the bearer once.
    Cleanse,
    /// The bearer cannot use moves that cost mana.
    MagicSealed,
}

impl StatusKind {
    /// Whether this kind hurts its bearer. Used by Cleanse.
    pub fn is_debuff(&self) -> bool {
        match self {
            StatusKind::Blind | StatusKind::MagicSealed => true,
            StatusKind::CritBoost { multiplier }
            | StatusKind::ElementPower { multiplier, .. }
            | StatusKind::StatBoost { multiplier, .. } => *multiplier < 1.0,
            StatusKind::ElementResist { multiplier, .. }
            | StatusKind::SpellCost { multiplier } => *multiplier > 1.0,
            _ => false,
        }
    }

    /// Whether this kind carries a payload that fires at turn end.
    fn fires_at_turn_end(&self) -> bool {
        matches!(
            self,
            StatusKind::RestorePercent { .. } | StatusKind::Cleanse
        )
    }
}

/// One lingering modifier instance with a turn-based lifetime.
///
/// Lifecycle: the turn-end tick runs the payload (if any) and decrements
/// the counter; a round ending with the counter at zero removes the
/// status with one notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub turns_remaining: u8,
    pub fires_at_turn_end: bool,
}

impl Status {
    pub fn new(kind: StatusKind, turns: u8) -> Self {
        let fires_at_turn_end = kind.fires_at_turn_end();
        Self {
            kind,
            turns_remaining: turns,
            fires_at_turn_end,
        }
    }

    /// Restoration status; percentage must lie in (0, 100].
    pub fn restore_percent(resource: Resource, percent: u8, turns: u8) -> EffectResult<Self> {
        if percent == 0 || percent > 100 {
            return Err(EffectError::PercentOutOfRange { resource, percent });
        }
        Ok(Self::new(
            StatusKind::RestorePercent { resource, percent },
            turns,
        ))
    }

    /// Same concrete kind and parameters, ignoring the counter.
    pub fn same_kind(&self, other: &Status) -> bool {
        self.kind == other.kind
    }
}

/// Per-fighter status collection with add-or-refresh, turn-end tick and
/// round-end expiry semantics. Insertion order is preserved so removal
/// notifications fire in the order statuses were gained.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StatusManager {
    statuses: Vec<Status>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a status, or refresh an equal one already present. A refresh
    /// keeps the longer remaining duration; it never shortens.
    /// Returns true when the status was newly added.
    pub fn apply(&mut self, status: Status) -> bool {
        if let Some(existing) = self.statuses.iter_mut().find(|s| s.same_kind(&status)) {
            existing.turns_remaining = existing.turns_remaining.max(status.turns_remaining);
            return false;
        }
        self.statuses.push(status);
        true
    }

    /// Turn-end tick: collect the payload kinds of every turn-end status
    /// (in insertion order), then decrement every counter by one.
    pub fn end_turn(&mut self) -> Vec<StatusKind> {
        let payloads: Vec<StatusKind> = self
            .statuses
            .iter()
            .filter(|s| s.fires_at_turn_end)
            .map(|s| s.kind.clone())
            .collect();

        for status in &mut self.statuses {
            status.turns_remaining = status.turns_remaining.saturating_sub(1);
        }

        payloads
    }

    /// Round-end sweep: remove statuses whose counter reached zero,
    /// returning them in insertion order so the caller can emit one
    /// removal notification each.
    pub fn end_round(&mut self) -> Vec<Status> {
        let mut removed = Vec::new();
        self.statuses.retain(|status| {
            if status.turns_remaining == 0 {
                removed.push(status.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Strip every debuff, returning the removed statuses in order.
    pub fn cleanse_debuffs(&mut self) -> Vec<Status> {
        let mut removed = Vec::new();
        self.statuses.retain(|status| {
            if status.kind.is_debuff() {
                removed.push(status.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Remove every status, returning them in order.
    pub fn clear_all(&mut self) -> Vec<Status> {
        std::mem::take(&mut self.statuses)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Status> {
        self.statuses.iter()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn contains(&self, kind: &StatusKind) -> bool {
        self.statuses.iter().any(|s| &s.kind == kind)
    }

    // --- Resolution-time queries ---

    pub fn has_blind(&self) -> bool {
        self.contains(&StatusKind::Blind)
    }

    pub fn is_magic_sealed(&self) -> bool {
        self.contains(&StatusKind::MagicSealed)
    }

    pub fn has_counter_attack(&self) -> bool {
        self.contains(&StatusKind::CounterAttack)
    }

    /// Active auto-evade, if any; the payload is the counters flag.
    pub fn auto_evade(&self) -> Option<bool> {
        self.statuses.iter().find_map(|s| match s.kind {
            StatusKind::AutoEvade { counters } => Some(counters),
            _ => None,
        })
    }

    /// Reflect entry for an element, if any; the payload is the optional
    /// power multiplier.
    pub fn reflect_for(&self, element: Element) -> Option<Option<f64>> {
        self.statuses.iter().find_map(|s| match s.kind {
            StatusKind::Reflect {
                element: reflected,
                power_multiplier,
            } if reflected == element => Some(power_multiplier),
            _ => None,
        })
    }

    pub fn stat_multiplier(&self, stat: StatKind) -> f64 {
        self.statuses
            .iter()
            .filter_map(|s| match s.kind {
                StatusKind::StatBoost {
                    stat: boosted,
                    multiplier,
                } if boosted == stat => Some(multiplier),
                _ => None,
            })
            .product()
    }

    pub fn element_power_multiplier(&self, element: Element) -> f64 {
        self.statuses
            .iter()
            .filter_map(|s| match s.kind {
                StatusKind::ElementPower {
                    element: boosted,
                    multiplier,
                } if boosted == element => Some(multiplier),
                _ => None,
            })
            .product()
    }

    pub fn element_resist_multiplier(&self, element: Element) -> f64 {
        self.statuses
            .iter()
            .filter_map(|s| match s.kind {
                StatusKind::ElementResist {
                    element: resisted,
                    multiplier,
                } if resisted == element => Some(multiplier),
                _ => None,
            })
            .product()
    }

    pub fn crit_multiplier(&self) -> f64 {
        self.statuses
            .iter()
            .filter_map(|s| match s.kind {
                StatusKind::CritBoost { multiplier } => Some(multiplier),
                _ => None,
            })
            .product()
    }

    pub fn spell_cost_multiplier(&self) -> f64 {
        self.statuses
            .iter()
            .filter_map(|s| match s.kind {
                StatusKind::SpellCost { multiplier } => Some(multiplier),
                _ => None,
            })
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strength_boost(multiplier: f64, turns: u8) -> Status {
        Status::new(
            StatusKind::StatBoost {
                stat: StatKind::Strength,
                multiplier,
            },
            turns,
        )
    }

    #[test]
    fn refresh_keeps_longer_duration() {
        let mut manager = StatusManager::new();
        assert!(manager.apply(strength_boost(2.0, 3)));
        assert!(!manager.apply(strength_boost(2.0, 1)));
        assert_eq!(manager.iter().next().unwrap().turns_remaining, 3);

        assert!(!manager.apply(strength_boost(2.0, 5)));
        assert_eq!(manager.iter().next().unwrap().turns_remaining, 5);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn different_parameters_are_independent_entries() {
        let mut manager = StatusManager::new();
        manager.apply(Status::new(
            StatusKind::ElementPower {
                element: Element::Fire,
                multiplier: 1.5,
            },
            2,
        ));
        manager.apply(Status::new(
            StatusKind::ElementPower {
                element: Element::Water,
                multiplier: 1.5,
            },
            2,
        ));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn turn_end_fires_payload_then_decrements() {
        let mut manager = StatusManager::new();
        manager.apply(Status::restore_percent(Resource::Health, 25, 1).unwrap());
        manager.apply(strength_boost(2.0, 2));

        let payloads = manager.end_turn();
        assert_eq!(payloads.len(), 1);
        assert!(matches!(
            payloads[0],
            StatusKind::RestorePercent {
                resource: Resource::Health,
                percent: 25
            }
        ));

        let turns: Vec<u8> = manager.iter().map(|s| s.turns_remaining).collect();
        assert_eq!(turns, vec![0, 1]);
    }

    #[test]
    fn round_end_removes_expired_in_insertion_order() {
        let mut manager = StatusManager::new();
        manager.apply(Status::new(StatusKind::Blind, 1));
        manager.apply(strength_boost(2.0, 3));
        manager.apply(Status::new(StatusKind::CounterAttack, 1));

        manager.end_turn();
        let removed = manager.end_round();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].kind, StatusKind::Blind);
        assert_eq!(removed[1].kind, StatusKind::CounterAttack);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn one_turn_status_survives_the_round_it_fires_in() {
        let mut manager = StatusManager::new();
        manager.apply(Status::restore_percent(Resource::Health, 10, 1).unwrap());

        // Round 1: fires once, then survives until the next round end.
        assert_eq!(manager.end_turn().len(), 1);
        // Counter is now zero, so the round-end sweep removes it.
        assert_eq!(manager.end_round().len(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn restore_percent_validates_at_construction() {
        assert!(matches!(
            Status::restore_percent(Resource::Mana, 0, 1),
            Err(EffectError::PercentOutOfRange { .. })
        ));
        assert!(matches!(
            Status::restore_percent(Resource::Health, 101, 1),
            Err(EffectError::PercentOutOfRange { .. })
        ));
        assert!(Status::restore_percent(Resource::Health, 100, 1).is_ok());
    }

    #[test]
    fn cleanse_strips_only_debuffs() {
        let mut manager = StatusManager::new();
        manager.apply(strength_boost(0.5, 3)); // debuff
        manager.apply(strength_boost(2.0, 3)); // buff
        manager.apply(Status::new(StatusKind::Blind, 3)); // debuff
        manager.apply(Status::new(StatusKind::SpellCost { multiplier: 1.5 }, 3)); // debuff

        let removed = manager.cleanse_debuffs();
        assert_eq!(removed.len(), 3);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.stat_multiplier(StatKind::Strength), 2.0);
    }

    #[test]
    fn multipliers_stack_multiplicatively() {
        let mut manager = StatusManager::new();
        manager.apply(strength_boost(2.0, 3));
        manager.apply(Status::new(
            StatusKind::StatBoost {
                stat: StatKind::Strength,
                multiplier: 1.5,
            },
            3,
        ));
        assert_eq!(manager.stat_multiplier(StatKind::Strength), 3.0);
        assert_eq!(manager.stat_multiplier(StatKind::Speed), 1.0);
    }
}
