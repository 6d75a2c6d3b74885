use crate::battle::engine::resolve_round;
use crate::battle::events::{ActionFailureReason, BattleEvent};
use crate::battle::tests::common::*;
use crate::chance::ScriptedChance;
use crate::fighter::FighterTag;
use crate::moves::{
    AttackProfile, BattleMove, MoveKind, SpecialAction, TargetCategory, TargetingRule,
};
use crate::status::{Status, StatusKind};
use pretty_assertions::assert_eq;

fn revive_move(percent: u8) -> BattleMove {
    BattleMove::new(
        "Second Dawn",
        "",
        TargetCategory::SingleAlly,
        MoveKind::Special(SpecialAction::revive(percent).unwrap()),
    )
}

#[test]
fn revive_restores_a_defeated_ally() {
    let healer = TestFighterBuilder::new("Healer").build();
    let mut fallen = TestFighterBuilder::new("Fallen").build();
    fallen.take_damage(999);
    let mut battle = battle_of(
        vec![healer, fallen],
        vec![TestFighterBuilder::new("Thorn").build()],
    );

    let actions = vec![
        act(ally(0), revive_move(50), ally(1)),
        wait_action(enemy(0)),
    ];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));

    assert!(bus.iter().any(|e| matches!(
        e,
        BattleEvent::FighterRevived { new_health: 15, .. }
    )));
    assert_eq!(battle.fighter(ally(1)).stats.health, 15);
}

#[test]
fn revive_with_no_fallen_ally_fails() {
    let healer = TestFighterBuilder::new("Healer").build();
    let hale = TestFighterBuilder::new("Hale").build();
    let mut battle = battle_of(
        vec![healer, hale],
        vec![TestFighterBuilder::new("Thorn").build()],
    );

    let actions = vec![
        act(ally(0), revive_move(50), ally(1)),
        wait_action(ally(1)),
        wait_action(enemy(0)),
    ];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));

    assert!(has_failure(&bus, ActionFailureReason::NoValidTarget));
    assert_eq!(battle.fighter(ally(1)).stats.health, 30);
}

#[test]
fn purge_strips_every_status() {
    let cleric = TestFighterBuilder::new("Cleric").build();
    let cursed = TestFighterBuilder::new("Thorn")
        .with_status(Status::new(StatusKind::Blind, 3))
        .with_status(Status::new(
            StatusKind::StatBoost {
                stat: crate::fighter::StatKind::Strength,
                multiplier: 2.0,
            },
            3,
        ))
        .build();
    let mut battle = duel(cleric, cursed);

    let purge = BattleMove::new(
        "Banish Workings",
        "",
        TargetCategory::SingleEnemy,
        MoveKind::Special(SpecialAction::Purge),
    );
    let actions = vec![act(ally(0), purge, enemy(0)), wait_action(enemy(0))];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));

    let removals = bus
        .iter()
        .filter(|e| matches!(e, BattleEvent::StatusRemoved { .. }))
        .count();
    assert_eq!(removals, 2);
    assert!(battle.fighter(enemy(0)).statuses.is_empty());
}

#[test]
fn absorbing_a_shade_converts_its_remaining_vitality() {
    let mut invoker = TestFighterBuilder::new("Invoker").with_speed(8).build();
    invoker.take_damage(20);
    invoker.stats.mana = 2;
    let mut shade = TestFighterBuilder::new("Duskling")
        .with_tag(FighterTag::Shade)
        .build();
    shade.take_damage(15); // half health left
    let mut battle = battle_of(
        vec![invoker, shade],
        vec![TestFighterBuilder::new("Thorn").build()],
    );

    let absorb = BattleMove::new(
        "Drink the Dusk",
        "",
        TargetCategory::SingleAlly,
        MoveKind::AbsorbShade,
    )
    .with_targeting(TargetingRule::requiring(FighterTag::Shade));
    let actions = vec![
        act(ally(0), absorb, ally(1)),
        wait_action(ally(1)),
        wait_action(enemy(0)),
    ];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));

    assert!(bus
        .iter()
        .any(|e| matches!(e, BattleEvent::ShadeAbsorbed { .. })));
    assert!(battle.fighter(ally(1)).is_defeated());
    // Half the invoker's pools come back: 15 health and 5 mana.
    assert_eq!(battle.fighter(ally(0)).stats.health, 25);
    assert_eq!(battle.fighter(ally(0)).stats.mana, 7);
}

#[test]
fn absorb_without_a_shade_ally_fails() {
    let invoker = TestFighterBuilder::new("Invoker").build();
    let plain = TestFighterBuilder::new("Squire").build();
    let mut battle = battle_of(
        vec![invoker, plain],
        vec![TestFighterBuilder::new("Thorn").build()],
    );

    let absorb = BattleMove::new(
        "Drink the Dusk",
        "",
        TargetCategory::SingleAlly,
        MoveKind::AbsorbShade,
    )
    .with_targeting(TargetingRule::requiring(FighterTag::Shade));
    let actions = vec![
        act(ally(0), absorb, ally(1)),
        wait_action(ally(1)),
        wait_action(enemy(0)),
    ];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));

    assert!(has_failure(&bus, ActionFailureReason::NoValidTarget));
}

#[test]
fn multi_turn_moves_force_a_recharge_round() {
    let titan = TestFighterBuilder::new("Titan").with_speed(9).build();
    let target = TestFighterBuilder::new("Thorn").with_health(40).build();
    let mut battle = duel(titan, target);

    let earthrend = BattleMove::new(
        "Earthrend",
        "",
        TargetCategory::SingleEnemy,
        MoveKind::MultiTurn {
            profile: AttackProfile::new(100, 0, 3).unwrap(),
            recharge_rounds: 1,
        },
    );

    // Round one: the blow lands and the recharge begins.
    let actions = vec![
        act(ally(0), earthrend.clone(), enemy(0)),
        wait_action(enemy(0)),
    ];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));
    assert_eq!(damage_amounts(&bus), vec![7]);
    assert_eq!(battle.fighter(ally(0)).recharge_turns, 1);

    // Round two: the titan must recover.
    let actions = vec![
        act(ally(0), earthrend.clone(), enemy(0)),
        wait_action(enemy(0)),
    ];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));
    assert!(has_failure(&bus, ActionFailureReason::Recharging));
    assert_eq!(battle.fighter(enemy(0)).stats.health, 33);

    // Round three: free to act again.
    let actions = vec![act(ally(0), earthrend, enemy(0)), wait_action(enemy(0))];
    let bus = resolve_round(&mut battle, actions, &mut ScriptedChance::new(vec![]));
    assert_eq!(damage_amounts(&bus), vec![7]);
    assert_eq!(battle.fighter(enemy(0)).stats.health, 26);
}
