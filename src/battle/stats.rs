//! Effective-stat and damage calculations.
//!
//! A fighter's effective value for anything is always
//! `base * product(status multipliers) * product(team field modifiers)`,
//! computed fresh at the moment it is needed. Nothing here caches.

use crate::fighter::{Element, Fighter, StatKind, Team};
use crate::field::FieldEffectKind;
use crate::status::StatusKind;

/// Product of the team-wide multipliers for one ordinary stat.
pub fn team_stat_multiplier(team: &Team, stat: StatKind) -> f64 {
    team.field_effects
        .iter()
        .filter_map(|fe| match &fe.effect.kind {
            FieldEffectKind::TeamModifier(StatusKind::StatBoost {
                stat: boosted,
                multiplier,
            }) if *boosted == stat => Some(*multiplier),
            _ => None,
        })
        .product()
}

/// Product of the team-wide outgoing-damage multipliers for one element.
pub fn team_element_power_multiplier(team: &Team, element: Element) -> f64 {
    team.field_effects
        .iter()
        .filter_map(|fe| match &fe.effect.kind {
            FieldEffectKind::TeamModifier(StatusKind::ElementPower {
                element: boosted,
                multiplier,
            }) if *boosted == element => Some(*multiplier),
            _ => None,
        })
        .product()
}

/// Product of the team-wide incoming-damage multipliers for one element.
pub fn team_element_resist_multiplier(team: &Team, element: Element) -> f64 {
    team.field_effects
        .iter()
        .filter_map(|fe| match &fe.effect.kind {
            FieldEffectKind::TeamModifier(StatusKind::ElementResist {
                element: resisted,
                multiplier,
            }) if *resisted == element => Some(*multiplier),
            _ => None,
        })
        .product()
}

/// Product of the team-wide critical-chance multipliers.
pub fn team_crit_multiplier(team: &Team) -> f64 {
    team.field_effects
        .iter()
        .filter_map(|fe| match &fe.effect.kind {
            FieldEffectKind::TeamModifier(StatusKind::CritBoost { multiplier }) => {
                Some(*multiplier)
            }
            _ => None,
        })
        .product()
}

/// Product of the team-wide spell-cost multipliers.
pub fn team_spell_cost_multiplier(team: &Team) -> f64 {
    team.field_effects
        .iter()
        .filter_map(|fe| match &fe.effect.kind {
            FieldEffectKind::TeamModifier(StatusKind::SpellCost { multiplier }) => {
                Some(*multiplier)
            }
            _ => None,
        })
        .product()
}

/// One ordinary stat with every personal and team multiplier applied.
pub fn effective_stat(fighter: &Fighter, team: &Team, stat: StatKind) -> u32 {
    let base = fighter.stats.base(stat) as f64;
    let scaled = base * fighter.statuses.stat_multiplier(stat) * team_stat_multiplier(team, stat);
    scaled.floor() as u32
}

pub fn effective_speed(fighter: &Fighter, team: &Team) -> u32 {
    effective_stat(fighter, team, StatKind::Speed)
}

/// The attacker's accuracy for one attack. Blindness divides the
/// outgoing accuracy by three.
pub fn outgoing_accuracy(base_accuracy: u8, attacker: &Fighter) -> u8 {
    if attacker.statuses.has_blind() {
        base_accuracy / 3
    } else {
        base_accuracy
    }
}

/// Critical chance for one attack: the base chance scaled by personal
/// and team crit multipliers, plus the attacker's effective luck,
/// clamped to 100.
pub fn effective_crit_chance(base_crit: u8, attacker: &Fighter, team: &Team) -> u8 {
    let scaled = base_crit as f64 * attacker.statuses.crit_multiplier() * team_crit_multiplier(team);
    let with_luck = scaled.floor() as u32 + effective_stat(attacker, team, StatKind::Luck);
    with_luck.min(100) as u8
}

/// The mana a move actually costs the attacker, after personal and team
/// spell-cost multipliers. Rounded to the nearest whole point.
pub fn effective_mana_cost(base_cost: u32, attacker: &Fighter, team: &Team) -> u32 {
    let scaled = base_cost as f64
        * attacker.statuses.spell_cost_multiplier()
        * team_spell_cost_multiplier(team);
    scaled.round() as u32
}

/// Damage for one connected attack.
///
/// Physical attacks scale off effective strength, elemental attacks off
/// effective magic. The attack stat plus move power is scaled by the
/// attack's damage multipliers, the attacker's elemental power bonuses,
/// a flat x2 on critical strikes, and the defender's elemental
/// resistances; the defender's effective defense is then subtracted and
/// the result floors at zero.
#[allow(clippy::too_many_arguments)]
pub fn compute_damage(
    attacker: &Fighter,
    attacker_team: &Team,
    defender: &Fighter,
    defender_team: &Team,
    power: u32,
    element: Option<Element>,
    damage_multiplier: f64,
    critical: bool,
) -> u32 {
    let attack_stat = match element {
        Some(_) => effective_stat(attacker, attacker_team, StatKind::Magic),
        None => effective_stat(attacker, attacker_team, StatKind::Strength),
    };

    let mut damage = (attack_stat + power) as f64 * damage_multiplier;
    if let Some(element) = element {
        damage *= attacker.innate_element_power(element)
            * attacker.statuses.element_power_multiplier(element)
            * team_element_power_multiplier(attacker_team, element);
    }
    if critical {
        damage *= 2.0;
    }
    if let Some(element) = element {
        damage *= defender.innate_element_resist(element)
            * defender.statuses.element_resist_multiplier(element)
            * team_element_resist_multiplier(defender_team, element);
    }

    let defense = effective_stat(defender, defender_team, StatKind::Defense) as i64;
    (damage.floor() as i64 - defense).max(0) as u32
}

/// Damage for a magic burst field effect. Bursts carry no attacker, so
/// the power is scaled only by the defender's elemental resistances and
/// bypasses defense.
pub fn compute_burst_damage(
    defender: &Fighter,
    defender_team: &Team,
    element: Element,
    power: u32,
) -> u32 {
    let damage = power as f64
        * defender.innate_element_resist(element)
        * defender.statuses.element_resist_multiplier(element)
        * team_element_resist_multiplier(defender_team, element);
    damage.floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ActiveFieldEffect, FieldEffect};
    use crate::fighter::Stats;
    use crate::status::Status;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn fighter(strength: u32, defense: u32, magic: u32) -> Fighter {
        Fighter::new("Unit", Stats::new(30, 10, strength, defense, 5, 3, 0, magic))
    }

    fn bare_team() -> Team {
        Team::new("Side", vec![])
    }

    #[test]
    fn boosted_strength_doubles_damage() {
        let mut attacker = fighter(4, 0, 0);
        attacker.statuses.apply(Status::new(
            StatusKind::StatBoost {
                stat: StatKind::Strength,
                multiplier: 2.0,
            },
            3,
        ));
        let defender = fighter(0, 0, 0);

        let damage = compute_damage(
            &attacker,
            &bare_team(),
            &defender,
            &bare_team(),
            0,
            None,
            1.0,
            false,
        );
        assert_eq!(damage, 8);
    }

    #[test]
    fn defense_subtracts_and_floors_at_zero() {
        let attacker = fighter(3, 0, 0);
        let defender = fighter(0, 50, 0);
        let damage = compute_damage(
            &attacker,
            &bare_team(),
            &defender,
            &bare_team(),
            2,
            None,
            1.0,
            false,
        );
        assert_eq!(damage, 0);
    }

    #[test]
    fn elemental_attacks_scale_off_magic_and_resistance() {
        let attacker = fighter(0, 0, 6).with_element_power(Element::Fire, 1.5);
        let defender = fighter(0, 1, 0).with_element_resist(Element::Fire, 0.5);

        // (6 + 2) * 1.5 = 12, * 0.5 resist = 6, - 1 defense = 5.
        let damage = compute_damage(
            &attacker,
            &bare_team(),
            &defender,
            &bare_team(),
            2,
            Some(Element::Fire),
            1.0,
            false,
        );
        assert_eq!(damage, 5);
    }

    #[test]
    fn criticals_double_after_power_bonuses() {
        let attacker = fighter(5, 0, 0);
        let defender = fighter(0, 0, 0);
        let damage = compute_damage(
            &attacker,
            &bare_team(),
            &defender,
            &bare_team(),
            1,
            None,
            1.0,
            true,
        );
        assert_eq!(damage, 12);
    }

    #[test]
    fn team_modifiers_stack_with_statuses() {
        let mut team = bare_team();
        team.field_effects.push(ActiveFieldEffect::new(FieldEffect::new(
            FieldEffectKind::TeamModifier(StatusKind::StatBoost {
                stat: StatKind::Speed,
                multiplier: 1.5,
            }),
            3,
        )));

        let mut runner = fighter(0, 0, 0);
        runner.stats.speed = 10;
        runner.statuses.apply(Status::new(
            StatusKind::StatBoost {
                stat: StatKind::Speed,
                multiplier: 2.0,
            },
            3,
        ));

        assert_eq!(effective_speed(&runner, &team), 30);
    }

    #[test]
    fn accuracy_is_untouched_without_blindness() {
        let attacker = fighter(4, 0, 0);
        assert_eq!(outgoing_accuracy(90, &attacker), 90);
    }

    #[rstest]
    #[case(90, 30)]
    #[case(100, 33)]
    #[case(2, 0)]
    fn blindness_divides_outgoing_accuracy(#[case] base: u8, #[case] expected: u8) {
        let mut attacker = fighter(4, 0, 0);
        attacker.statuses.apply(Status::new(StatusKind::Blind, 2));
        assert_eq!(outgoing_accuracy(base, &attacker), expected);
    }

    #[test]
    fn crit_chance_adds_luck_and_clamps() {
        let mut lucky = fighter(4, 0, 0);
        lucky.stats.luck = 30;
        lucky.statuses.apply(Status::new(
            StatusKind::CritBoost { multiplier: 2.0 },
            3,
        ));
        assert_eq!(effective_crit_chance(20, &lucky, &bare_team()), 70);
        assert_eq!(effective_crit_chance(60, &lucky, &bare_team()), 100);
    }

    #[test]
    fn burst_damage_bypasses_defense() {
        let defender = fighter(0, 100, 0).with_element_resist(Element::Lightning, 0.5);
        assert_eq!(
            compute_burst_damage(&defender, &bare_team(), Element::Lightning, 8),
            4
        );
    }
}
