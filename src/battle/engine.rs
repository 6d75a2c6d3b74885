//! Round resolution.
//!
//! A round takes one submitted action per living fighter, queues them,
//! and consumes the queue in priority-then-speed order, re-sorting
//! before every pop. Everything observable is appended to an
//! [`EventBus`]; the engine itself never prints.

use crate::battle::events::{ActionFailureReason, BattleEvent, EventBus};
use crate::battle::queue::{BattleMoveQueue, MoveTarget, QueuedMove};
use crate::battle::stats;
use crate::chance::ChanceService;
use crate::effects::{ActivationPhase, EffectAction, EffectCondition};
use crate::errors::{BattleFlowError, EngineResult};
use crate::field::{ActiveDance, ActiveFieldEffect, DanceCategory, DanceCombiner, FieldEffect, FieldEffectKind};
use crate::fighter::{Fighter, FighterRef, FighterTag, Resource, Team, TeamSide};
use crate::moves::{self, AttackProfile, BattleMove, ConditionalPowerBonus, MoveKind, SpecialAction, TargetCategory};
use crate::status::StatusKind;
use serde::{Deserialize, Serialize};

/// How a battle stands after the most recent round.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    InProgress,
    Victory(TeamSide),
    /// This side fled; the rest of the round was discarded.
    Escaped(TeamSide),
}

/// The whole battlefield: two teams, the round counter, and the dance
/// combination policy in force.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Battle {
    pub teams: [Team; 2],
    pub round_number: u32,
    pub outcome: BattleOutcome,
    #[serde(skip)]
    pub combiner: DanceCombiner,
}

impl Battle {
    pub fn new(allies: Team, enemies: Team) -> EngineResult<Self> {
        for team in [&allies, &enemies] {
            if team.fighters.is_empty() {
                return Err(BattleFlowError::EmptyTeam(team.name.clone()).into());
            }
        }
        Ok(Self {
            teams: [allies, enemies],
            round_number: 1,
            outcome: BattleOutcome::InProgress,
            combiner: DanceCombiner::new(),
        })
    }

    pub fn with_combiner(mut self, combiner: DanceCombiner) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        &self.teams[side.to_index()]
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        &mut self.teams[side.to_index()]
    }

    pub fn fighter(&self, fighter: FighterRef) -> &Fighter {
        &self.team(fighter.side).fighters[fighter.index]
    }

    pub fn fighter_mut(&mut self, fighter: FighterRef) -> &mut Fighter {
        &mut self.team_mut(fighter.side).fighters[fighter.index]
    }

    /// Checked lookup for handles arriving from outside the engine.
    pub fn try_fighter(&self, fighter: FighterRef) -> EngineResult<&Fighter> {
        self.team(fighter.side)
            .fighters
            .get(fighter.index)
            .ok_or_else(|| BattleFlowError::UnknownFighter(fighter.index).into())
    }

    pub fn living_refs(&self, side: TeamSide) -> Vec<FighterRef> {
        self.team(side)
            .living_indices()
            .into_iter()
            .map(|index| FighterRef::new(side, index))
            .collect()
    }

    pub fn is_over(&self) -> bool {
        self.outcome != BattleOutcome::InProgress
    }
}

/// One fighter's chosen action for the coming round.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedAction {
    pub owner: FighterRef,
    pub battle_move: BattleMove,
    pub target: MoveTarget,
    pub executor: Option<usize>,
}

impl SubmittedAction {
    pub fn new(owner: FighterRef, battle_move: BattleMove, target: MoveTarget) -> Self {
        Self {
            owner,
            battle_move,
            target,
            executor: None,
        }
    }

    pub fn with_executor(mut self, executor: usize) -> Self {
        self.executor = Some(executor);
        self
    }

    fn into_queued(self) -> QueuedMove {
        QueuedMove {
            owner: self.owner,
            battle_move: self.battle_move,
            target: self.target,
            executor: self.executor,
        }
    }
}

/// Strategy for picking one fighter's action. The console front end is
/// a selector over player input; AI sides plug in here.
pub trait MoveSelector {
    fn choose(
        &mut self,
        battle: &Battle,
        owner: FighterRef,
        chance: &mut dyn ChanceService,
    ) -> SubmittedAction;
}

/// Picks a uniformly random affordable move and a random valid target,
/// falling back to doing nothing.
pub struct RandomSelector;

impl MoveSelector for RandomSelector {
    fn choose(
        &mut self,
        battle: &Battle,
        owner: FighterRef,
        chance: &mut dyn ChanceService,
    ) -> SubmittedAction {
        let fighter = battle.fighter(owner);
        let affordable: Vec<&BattleMove> = fighter
            .moves
            .iter()
            .filter(|m| fighter.stats.mana >= m.mana_cost)
            .collect();

        if !affordable.is_empty() {
            let pick = chance.which_event(affordable.len(), "move selection");
            let chosen = affordable[pick].clone();
            if let Some(target) = default_target(battle, owner, &chosen, chance) {
                return SubmittedAction::new(owner, chosen, target);
            }
        }
        SubmittedAction::new(owner, moves::do_nothing().clone(), MoveTarget::Fighter(owner))
    }
}

/// Collect one action per living fighter on a side.
pub fn collect_actions(
    battle: &Battle,
    side: TeamSide,
    selector: &mut dyn MoveSelector,
    chance: &mut dyn ChanceService,
) -> Vec<SubmittedAction> {
    battle
        .living_refs(side)
        .into_iter()
        .map(|owner| selector.choose(battle, owner, chance))
        .collect()
}

/// The natural target for a move, or `None` when no candidate exists.
pub fn default_target(
    battle: &Battle,
    owner: FighterRef,
    battle_move: &BattleMove,
    chance: &mut dyn ChanceService,
) -> Option<MoveTarget> {
    match battle_move.target {
        TargetCategory::User => Some(MoveTarget::Fighter(owner)),
        TargetCategory::OwnTeam => Some(MoveTarget::Team(owner.side)),
        TargetCategory::EnemyTeam => Some(MoveTarget::Team(owner.side.opponent())),
        TargetCategory::Field => Some(MoveTarget::Field),
        TargetCategory::SingleEnemy
        | TargetCategory::SingleAlly
        | TargetCategory::SingleAllyOrUser => {
            let probe = QueuedMove::new(owner, battle_move.clone(), MoveTarget::Field);
            let candidates = target_candidates(battle, &probe);
            match candidates.len() {
                0 => None,
                1 => Some(MoveTarget::Fighter(candidates[0])),
                n => {
                    let pick = chance.which_event(n, "target selection");
                    Some(MoveTarget::Fighter(candidates[pick]))
                }
            }
        }
    }
}

/// A non-fighter battlefield object (terrain, traps, scripted set
/// pieces) that resolves queue entries addressed to it. Returning false
/// reports the move as failed.
pub trait MoveExecutor {
    fn execute_move(&mut self, entry: &QueuedMove, battle: &mut Battle, bus: &mut EventBus)
        -> bool;
}

/// Resolve one full round with no external executors.
pub fn resolve_round(
    battle: &mut Battle,
    actions: Vec<SubmittedAction>,
    chance: &mut dyn ChanceService,
) -> EventBus {
    resolve_round_with(battle, actions, chance, &mut [])
}

/// Resolve one full round: queue the actions, consume them in
/// priority-then-speed order, run per-fighter turn-end ticks as each
/// entry resolves, then the round-end sweep once the queue drains.
pub fn resolve_round_with(
    battle: &mut Battle,
    actions: Vec<SubmittedAction>,
    chance: &mut dyn ChanceService,
    executors: &mut [&mut dyn MoveExecutor],
) -> EventBus {
    let mut bus = EventBus::new();
    if battle.is_over() {
        return bus;
    }
    bus.push(BattleEvent::RoundStarted {
        round: battle.round_number,
    });

    let mut queue = BattleMoveQueue::new();
    for action in actions {
        if battle.fighter(action.owner).is_alive() {
            queue.push(action.into_queued());
        }
    }

    while !queue.is_empty() {
        let entry = {
            let speed_fn = |e: &QueuedMove| {
                stats::effective_speed(battle.fighter(e.owner), battle.team(e.owner.side)) as i64
            };
            queue.sort_and_pop(&speed_fn)
        };
        resolve_queued(battle, entry, chance, executors, &mut bus);
        check_team_defeat(battle, &mut bus);
        if battle.is_over() {
            // The rest of the round is discarded.
            queue.clear();
        }
    }

    if !battle.is_over() {
        end_of_round(battle, &mut bus);
        check_team_defeat(battle, &mut bus);
    }

    bus.push(BattleEvent::RoundEnded {
        round: battle.round_number,
    });
    battle.round_number += 1;
    bus
}

fn resolve_queued(
    battle: &mut Battle,
    mut entry: QueuedMove,
    chance: &mut dyn ChanceService,
    executors: &mut [&mut dyn MoveExecutor],
    bus: &mut EventBus,
) {
    let owner = entry.owner;
    // Defeated between submission and consumption: the entry lapses
    // silently.
    if battle.fighter(owner).is_defeated() {
        return;
    }

    if battle.fighter(owner).recharge_turns > 0 {
        battle.fighter_mut(owner).recharge_turns -= 1;
        bus.push(BattleEvent::ActionFailed {
            actor: owner,
            reason: ActionFailureReason::Recharging,
        });
        run_turn_end(battle, owner, bus);
        return;
    }

    if !ensure_target(battle, &mut entry, chance, bus) {
        run_turn_end(battle, owner, bus);
        return;
    }

    if let Some(index) = entry.executor {
        let handled = executors
            .get_mut(index)
            .map_or(false, |executor| executor.execute_move(&entry, battle, bus));
        if !handled {
            bus.push(BattleEvent::ActionFailed {
                actor: owner,
                reason: ActionFailureReason::MoveFailedToExecute,
            });
        }
    } else {
        execute_entry(battle, &entry, chance, bus);
    }

    if battle.fighter(owner).is_alive() {
        run_turn_end(battle, owner, bus);
    }
}

/// Validate the bound target, retargeting to a random valid candidate
/// if it has lapsed. Returns false (after reporting) when no candidate
/// is left.
fn ensure_target(
    battle: &Battle,
    entry: &mut QueuedMove,
    chance: &mut dyn ChanceService,
    bus: &mut EventBus,
) -> bool {
    let owner = entry.owner;
    match entry.battle_move.target {
        TargetCategory::User => {
            entry.retarget(MoveTarget::Fighter(owner));
            true
        }
        TargetCategory::OwnTeam => {
            entry.retarget(MoveTarget::Team(owner.side));
            true
        }
        TargetCategory::EnemyTeam => {
            entry.retarget(MoveTarget::Team(owner.side.opponent()));
            true
        }
        TargetCategory::Field => {
            entry.retarget(MoveTarget::Field);
            true
        }
        TargetCategory::SingleEnemy
        | TargetCategory::SingleAlly
        | TargetCategory::SingleAllyOrUser => {
            if let MoveTarget::Fighter(current) = entry.target {
                if candidate_ok(battle, entry, current) {
                    return true;
                }
            }
            let candidates = target_candidates(battle, entry);
            match candidates.len() {
                0 => {
                    bus.push(BattleEvent::ActionFailed {
                        actor: owner,
                        reason: ActionFailureReason::NoValidTarget,
                    });
                    false
                }
                1 => {
                    entry.retarget(MoveTarget::Fighter(candidates[0]));
                    true
                }
                n => {
                    let pick = chance.which_event(n, "retarget");
                    entry.retarget(MoveTarget::Fighter(candidates[pick]));
                    true
                }
            }
        }
    }
}

fn target_candidates(battle: &Battle, entry: &QueuedMove) -> Vec<FighterRef> {
    let side = match entry.battle_move.target {
        TargetCategory::SingleEnemy => entry.owner.side.opponent(),
        _ => entry.owner.side,
    };
    (0..battle.team(side).fighters.len())
        .map(|index| FighterRef::new(side, index))
        .filter(|&candidate| candidate_ok(battle, entry, candidate))
        .collect()
}

fn candidate_ok(battle: &Battle, entry: &QueuedMove, candidate: FighterRef) -> bool {
    let owner = entry.owner;
    let side_ok = match entry.battle_move.target {
        TargetCategory::SingleEnemy => candidate.side == owner.side.opponent(),
        TargetCategory::SingleAlly => candidate.side == owner.side && candidate != owner,
        TargetCategory::SingleAllyOrUser | TargetCategory::User => candidate.side == owner.side,
        _ => true,
    };
    if !side_ok {
        return false;
    }

    let fighter = battle.fighter(candidate);
    let life_ok = match &entry.battle_move.kind {
        // Revival only works on the fallen.
        MoveKind::Special(SpecialAction::Revive { .. }) => fighter.is_defeated(),
        _ => fighter.is_alive(),
    };
    let tag_ok = entry
        .battle_move
        .targeting
        .required_tag
        .map_or(true, |tag| fighter.has_tag(tag));
    let kind_ok = match entry.battle_move.kind {
        MoveKind::AbsorbShade => fighter.has_tag(FighterTag::Shade) && candidate != owner,
        _ => true,
    };
    life_ok && tag_ok && kind_ok
}

fn execute_entry(
    battle: &mut Battle,
    entry: &QueuedMove,
    chance: &mut dyn ChanceService,
    bus: &mut EventBus,
) {
    let owner = entry.owner;
    let mv = &entry.battle_move;

    if mv.mana_cost > 0 {
        if battle.fighter(owner).statuses.is_magic_sealed() {
            bus.push(BattleEvent::ActionFailed {
                actor: owner,
                reason: ActionFailureReason::MagicSealed,
            });
            return;
        }
        let cost =
            stats::effective_mana_cost(mv.mana_cost, battle.fighter(owner), battle.team(owner.side));
        if !battle.fighter_mut(owner).spend_mana(cost) {
            bus.push(BattleEvent::ActionFailed {
                actor: owner,
                reason: ActionFailureReason::InsufficientMana,
            });
            return;
        }
    }

    bus.push(BattleEvent::MoveUsed {
        actor: owner,
        move_name: mv.name.clone(),
        execution_text: mv.execution_text.clone(),
        target: entry.target_fighter(),
    });

    match &mv.kind {
        MoveKind::Attack(profile) => {
            if let Some(target) = entry.target_fighter() {
                resolve_attack(battle, owner, target, mv, profile, None, chance, bus);
            }
        }
        MoveKind::ConditionalPowerAttack { profile, bonus } => {
            if let Some(target) = entry.target_fighter() {
                resolve_attack(battle, owner, target, mv, profile, Some(bonus), chance, bus);
            }
        }
        MoveKind::MultiTurn {
            profile,
            recharge_rounds,
        } => {
            if let Some(target) = entry.target_fighter() {
                resolve_attack(battle, owner, target, mv, profile, None, chance, bus);
            }
            battle.fighter_mut(owner).recharge_turns = *recharge_rounds;
        }
        MoveKind::ShieldBuster(profile) => {
            if let Some(target) = entry.target_fighter() {
                if battle.fighter(target).shield.is_some() {
                    battle.fighter_mut(target).shield = None;
                    bus.push(BattleEvent::ShieldBroken { target });
                }
                resolve_attack(battle, owner, target, mv, profile, None, chance, bus);
            }
        }
        MoveKind::Status(status) => {
            if let Some(target) = entry.target_fighter() {
                let newly = battle.fighter_mut(target).statuses.apply(status.clone());
                bus.push(if newly {
                    BattleEvent::StatusAdded {
                        target,
                        status: status.clone(),
                    }
                } else {
                    BattleEvent::StatusRefreshed {
                        target,
                        status: status.clone(),
                    }
                });
            }
        }
        MoveKind::Special(action) => {
            if let Some(target) = entry.target_fighter() {
                resolve_special(battle, owner, target, action, bus);
            }
        }
        MoveKind::Dance { category, effect } => {
            resolve_dance(battle, owner, *category, effect, bus);
        }
        MoveKind::Shield(shield) => match entry.target {
            MoveTarget::Team(side) => {
                for target in battle.living_refs(side) {
                    grant_shield(battle, target, shield, bus);
                }
            }
            MoveTarget::Fighter(target) => grant_shield(battle, target, shield, bus),
            MoveTarget::Field => {}
        },
        MoveKind::ShieldFortifier { bonus } => {
            if let Some(target) = entry.target_fighter() {
                match battle.fighter_mut(target).shield.as_mut() {
                    Some(shield) => {
                        shield.strength += bonus;
                        let new_strength = shield.strength;
                        bus.push(BattleEvent::ShieldFortified {
                            target,
                            bonus: *bonus,
                            new_strength,
                        });
                    }
                    None => bus.push(BattleEvent::ActionFailed {
                        actor: owner,
                        reason: ActionFailureReason::NoShieldToFortify,
                    }),
                }
            }
        }
        MoveKind::Bell(effect) => {
            apply_field_effect(battle, owner.side, effect.clone(), bus);
        }
        MoveKind::DoNothing => {
            bus.push(BattleEvent::SpecialMoveExecuted {
                actor: owner,
                move_name: mv.name.clone(),
            });
        }
        MoveKind::Runaway { escape_chance } => {
            if chance.event_occurs(*escape_chance, "escape") {
                battle.outcome = BattleOutcome::Escaped(owner.side);
                bus.push(BattleEvent::Escaped { side: owner.side });
            } else {
                bus.push(BattleEvent::ActionFailed {
                    actor: owner,
                    reason: ActionFailureReason::EscapeFailed,
                });
            }
        }
        MoveKind::AbsorbShade => {
            if let Some(target) = entry.target_fighter() {
                resolve_absorb_shade(battle, owner, target, bus);
            }
        }
    }
}

fn condition_holds(
    battle: &Battle,
    actor: FighterRef,
    condition: Option<&EffectCondition>,
    evaded: Option<bool>,
) -> bool {
    match condition {
        None => true,
        Some(EffectCondition::TargetDidNotEvade) => evaded == Some(false),
        Some(EffectCondition::DanceActive(category)) => battle.team(actor.side).has_dance(*category),
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_attack(
    battle: &mut Battle,
    attacker_ref: FighterRef,
    target_ref: FighterRef,
    mv: &BattleMove,
    profile: &AttackProfile,
    bonus: Option<&ConditionalPowerBonus>,
    chance: &mut dyn ChanceService,
    bus: &mut EventBus,
) {
    let mut damage_multiplier = 1.0;
    let mut never_miss = false;
    let mut ignore_evasion = false;
    for effect in mv.effects.iter().filter(|e| e.phase == ActivationPhase::BeforeRoll) {
        if !condition_holds(battle, attacker_ref, effect.condition.as_ref(), None) {
            continue;
        }
        match effect.action {
            EffectAction::DamageMultiplier(multiplier) => damage_multiplier *= multiplier,
            EffectAction::NeverMiss => never_miss = true,
            EffectAction::IgnoreEvasion => ignore_evasion = true,
            EffectAction::RestorePercent { .. } => {}
        }
    }

    if !never_miss {
        let accuracy = stats::outgoing_accuracy(profile.accuracy, battle.fighter(attacker_ref));
        if !chance.event_occurs(accuracy, "accuracy") {
            bus.push(BattleEvent::MoveMissed {
                attacker: attacker_ref,
                target: target_ref,
            });
            return;
        }
    }

    let mut evaded = false;
    if let Some(counters) = battle.fighter(target_ref).statuses.auto_evade() {
        if !ignore_evasion {
            evaded = true;
            bus.push(BattleEvent::AutoEvaded { target: target_ref });
            if counters {
                counter_strike(battle, target_ref, attacker_ref, bus);
            }
        }
    }

    if !evaded {
        bus.push(BattleEvent::MoveHit {
            attacker: attacker_ref,
            target: target_ref,
        });

        let crit_chance = stats::effective_crit_chance(
            profile.crit_chance,
            battle.fighter(attacker_ref),
            battle.team(attacker_ref.side),
        );
        let critical = crit_chance > 0 && chance.event_occurs(crit_chance, "critical");
        if critical {
            bus.push(BattleEvent::CriticalHit {
                attacker: attacker_ref,
                target: target_ref,
            });
        }

        let mut power = profile.power;
        if let Some(bonus) = bonus {
            if condition_holds(battle, attacker_ref, Some(&bonus.condition), Some(false)) {
                power += bonus.bonus_power;
            }
        }

        let reflected = profile.element.and_then(|element| {
            battle
                .fighter(target_ref)
                .statuses
                .reflect_for(element)
                .map(|power_multiplier| (element, power_multiplier))
        });
        if let Some((element, power_multiplier)) = reflected {
            // The attack turns back on its caster; the intended target
            // is untouched and no on-hit effects run.
            let base = stats::compute_damage(
                battle.fighter(attacker_ref),
                battle.team(attacker_ref.side),
                battle.fighter(attacker_ref),
                battle.team(attacker_ref.side),
                power,
                Some(element),
                damage_multiplier,
                critical,
            );
            let damage = (base as f64 * power_multiplier.unwrap_or(1.0)).floor() as u32;
            bus.push(BattleEvent::DamageReflected {
                element,
                original_attacker: attacker_ref,
            });
            apply_damage(battle, attacker_ref, damage, bus);
            return;
        }

        let damage = stats::compute_damage(
            battle.fighter(attacker_ref),
            battle.team(attacker_ref.side),
            battle.fighter(target_ref),
            battle.team(target_ref.side),
            power,
            profile.element,
            damage_multiplier,
            critical,
        );
        apply_damage(battle, target_ref, damage, bus);

        if battle.fighter(target_ref).is_alive()
            && battle.fighter(target_ref).statuses.has_counter_attack()
            && battle.fighter(attacker_ref).is_alive()
        {
            counter_strike(battle, target_ref, attacker_ref, bus);
        }
    }

    // The accuracy roll succeeded, so on-hit effects get their look;
    // each condition sees whether the target evaded.
    for effect in mv.effects.iter().filter(|e| e.phase == ActivationPhase::OnHit) {
        if !condition_holds(battle, attacker_ref, effect.condition.as_ref(), Some(evaded)) {
            continue;
        }
        if let EffectAction::RestorePercent { resource, percent } = effect.action {
            restore_percent_of_max(battle, attacker_ref, resource, percent, bus);
        }
    }
}

/// An unarmed retaliation: effective strength against the victim's
/// defenses, no rolls.
fn counter_strike(
    battle: &mut Battle,
    striker_ref: FighterRef,
    victim_ref: FighterRef,
    bus: &mut EventBus,
) {
    let damage = stats::compute_damage(
        battle.fighter(striker_ref),
        battle.team(striker_ref.side),
        battle.fighter(victim_ref),
        battle.team(victim_ref.side),
        0,
        None,
        1.0,
        false,
    );
    bus.push(BattleEvent::Countered {
        defender: striker_ref,
        attacker: victim_ref,
        damage,
    });
    apply_damage(battle, victim_ref, damage, bus);
}

/// Route damage through the target's shield, then health.
fn apply_damage(battle: &mut Battle, target: FighterRef, amount: u32, bus: &mut EventBus) {
    let mut remainder = amount;

    let fighter = battle.fighter_mut(target);
    let mut shield_report = None;
    if let Some(shield) = fighter.shield.as_mut() {
        let absorbed = remainder.min(shield.strength);
        if absorbed > 0 {
            shield.strength -= absorbed;
            remainder -= absorbed;
            shield_report = Some((absorbed, shield.strength));
        }
    }
    if let Some((absorbed, remaining)) = shield_report {
        bus.push(BattleEvent::ShieldDamaged {
            target,
            absorbed,
            remaining,
        });
        if remaining == 0 {
            battle.fighter_mut(target).shield = None;
            bus.push(BattleEvent::ShieldBroken { target });
        }
    }

    if remainder > 0 || amount == 0 {
        let fighter = battle.fighter_mut(target);
        let defeated = fighter.take_damage(remainder);
        bus.push(BattleEvent::DamageDealt {
            target,
            amount: remainder,
            remaining_health: fighter.stats.health,
        });
        if defeated {
            bus.push(BattleEvent::FighterDefeated { target });
        }
    }
}

fn resolve_special(
    battle: &mut Battle,
    owner: FighterRef,
    target: FighterRef,
    action: &SpecialAction,
    bus: &mut EventBus,
) {
    match action {
        SpecialAction::Revive { percent } => {
            if battle.fighter(target).is_alive() {
                bus.push(BattleEvent::ActionFailed {
                    actor: owner,
                    reason: ActionFailureReason::TargetAlive,
                });
                return;
            }
            let fighter = battle.fighter_mut(target);
            let new_health = (fighter.stats.max_health * *percent as u32 / 100).max(1);
            fighter.stats.health = new_health.min(fighter.stats.max_health);
            let new_health = fighter.stats.health;
            bus.push(BattleEvent::FighterRevived { target, new_health });
        }
        SpecialAction::Purge => {
            let removed = battle.fighter_mut(target).statuses.clear_all();
            for status in removed {
                bus.push(BattleEvent::StatusRemoved { target, status });
            }
        }
    }
}

/// Consume an allied shade, restoring the actor's health and mana by
/// the shade's remaining-health percentage.
fn resolve_absorb_shade(
    battle: &mut Battle,
    actor: FighterRef,
    target: FighterRef,
    bus: &mut EventBus,
) {
    let shade = battle.fighter(target);
    if !shade.has_tag(FighterTag::Shade) || shade.is_defeated() {
        bus.push(BattleEvent::ActionFailed {
            actor,
            reason: ActionFailureReason::TargetNotShade,
        });
        return;
    }
    let percent = shade.stats.health * 100 / shade.stats.max_health;

    battle.fighter_mut(target).stats.health = 0;
    bus.push(BattleEvent::ShadeAbsorbed {
        actor,
        shade: target,
    });
    bus.push(BattleEvent::FighterDefeated { target });

    let max_health = battle.fighter(actor).stats.max_health;
    let max_mana = battle.fighter(actor).stats.max_mana;
    let healed = battle.fighter_mut(actor).heal(max_health * percent / 100);
    let new_health = battle.fighter(actor).stats.health;
    bus.push(BattleEvent::Healed {
        target: actor,
        amount: healed,
        new_health,
    });
    let restored = battle.fighter_mut(actor).restore_mana(max_mana * percent / 100);
    let new_mana = battle.fighter(actor).stats.mana;
    bus.push(BattleEvent::ManaRestored {
        target: actor,
        amount: restored,
        new_mana,
    });
}

/// Register a dance: its own effect always applies, and if another
/// dance is live on the same side, the pair may combine.
fn resolve_dance(
    battle: &mut Battle,
    owner: FighterRef,
    category: DanceCategory,
    effect: &FieldEffect,
    bus: &mut EventBus,
) {
    let side = owner.side;
    let partner = battle.team(side).active_dances.last().map(|d| d.category);

    apply_field_effect(battle, side, effect.clone(), bus);
    battle.team_mut(side).active_dances.push(ActiveDance {
        category,
        remaining: effect.duration.max(1),
    });

    if let Some(partner) = partner {
        let combo = battle.combiner.combine(category, partner);
        if let Some(combo) = combo {
            bus.push(BattleEvent::DanceComboFormed {
                side,
                name: combo.name.clone(),
            });
            for combined in combo.effects {
                apply_field_effect(battle, side, combined, bus);
            }
        }
    }
}

fn grant_shield(
    battle: &mut Battle,
    target: FighterRef,
    shield: &crate::fighter::Shield,
    bus: &mut EventBus,
) {
    battle.fighter_mut(target).shield = Some(shield.clone());
    bus.push(BattleEvent::ShieldGranted {
        target,
        shield: shield.clone(),
    });
}

/// Apply a field effect for a side. Team modifiers persist and tick
/// down at round end; everything else executes once immediately.
fn apply_field_effect(battle: &mut Battle, side: TeamSide, effect: FieldEffect, bus: &mut EventBus) {
    match &effect.kind {
        FieldEffectKind::TeamModifier(_) => {
            bus.push(BattleEvent::FieldEffectApplied {
                side,
                effect: effect.clone(),
            });
            battle
                .team_mut(side)
                .field_effects
                .push(ActiveFieldEffect::new(effect));
        }
        _ => {
            bus.push(BattleEvent::FieldEffectExecuted {
                side,
                effect: effect.clone(),
            });
            execute_field_effect(battle, side, &effect, bus);
        }
    }
}

fn execute_field_effect(
    battle: &mut Battle,
    side: TeamSide,
    effect: &FieldEffect,
    bus: &mut EventBus,
) {
    match &effect.kind {
        FieldEffectKind::MagicBurst { element, power } => {
            let enemy_side = side.opponent();
            for target in battle.living_refs(enemy_side) {
                let damage = stats::compute_burst_damage(
                    battle.fighter(target),
                    battle.team(enemy_side),
                    *element,
                    *power,
                );
                apply_damage(battle, target, damage, bus);
            }
        }
        FieldEffectKind::GrantShield(shield) => {
            for target in battle.living_refs(side) {
                grant_shield(battle, target, shield, bus);
            }
        }
        FieldEffectKind::GrantStatus(status) => {
            for target in battle.living_refs(side) {
                let newly = battle.fighter_mut(target).statuses.apply(status.clone());
                bus.push(if newly {
                    BattleEvent::StatusAdded {
                        target,
                        status: status.clone(),
                    }
                } else {
                    BattleEvent::StatusRefreshed {
                        target,
                        status: status.clone(),
                    }
                });
            }
        }
        FieldEffectKind::TeamModifier(_) => {}
    }
}

/// Turn-end tick for one fighter, run right after its own queue entry
/// resolves: fire turn-end payloads, then decrement every counter.
fn run_turn_end(battle: &mut Battle, owner: FighterRef, bus: &mut EventBus) {
    let payloads = battle.fighter_mut(owner).statuses.end_turn();
    for kind in payloads {
        match kind {
            StatusKind::RestorePercent { resource, percent } => {
                restore_percent_of_max(battle, owner, resource, percent, bus);
            }
            StatusKind::Cleanse => {
                let removed = battle.fighter_mut(owner).statuses.cleanse_debuffs();
                for status in removed {
                    bus.push(BattleEvent::StatusRemoved {
                        target: owner,
                        status,
                    });
                }
            }
            _ => {}
        }
    }
}

fn restore_percent_of_max(
    battle: &mut Battle,
    target: FighterRef,
    resource: Resource,
    percent: u8,
    bus: &mut EventBus,
) {
    match resource {
        Resource::Health => {
            let fighter = battle.fighter_mut(target);
            let amount = fighter.stats.max_health * percent as u32 / 100;
            let healed = fighter.heal(amount);
            let new_health = fighter.stats.health;
            bus.push(BattleEvent::Healed {
                target,
                amount: healed,
                new_health,
            });
        }
        Resource::Mana => {
            let fighter = battle.fighter_mut(target);
            let amount = fighter.stats.max_mana * percent as u32 / 100;
            let restored = fighter.restore_mana(amount);
            let new_mana = fighter.stats.mana;
            bus.push(BattleEvent::ManaRestored {
                target,
                amount: restored,
                new_mana,
            });
        }
    }
}

/// Round-end sweep once the queue drains: expire statuses, fire
/// team-wide restoration, tick down field effects and dances.
fn end_of_round(battle: &mut Battle, bus: &mut EventBus) {
    for side in [TeamSide::Allies, TeamSide::Enemies] {
        let roster = battle.team(side).fighters.len();
        for index in 0..roster {
            let target = FighterRef::new(side, index);
            let removed = battle.fighter_mut(target).statuses.end_round();
            for status in removed {
                bus.push(BattleEvent::StatusRemoved { target, status });
            }
        }

        let restores: Vec<(Resource, u8)> = battle
            .team(side)
            .field_effects
            .iter()
            .filter_map(|fe| match &fe.effect.kind {
                FieldEffectKind::TeamModifier(StatusKind::RestorePercent { resource, percent }) => {
                    Some((*resource, *percent))
                }
                _ => None,
            })
            .collect();
        for (resource, percent) in restores {
            for target in battle.living_refs(side) {
                restore_percent_of_max(battle, target, resource, percent, bus);
            }
        }

        let mut expired = Vec::new();
        battle.team_mut(side).field_effects.retain_mut(|fe| {
            fe.remaining = fe.remaining.saturating_sub(1);
            if fe.remaining == 0 {
                expired.push(fe.effect.clone());
                false
            } else {
                true
            }
        });
        for effect in expired {
            bus.push(BattleEvent::FieldEffectExpired { side, effect });
        }

        battle.team_mut(side).active_dances.retain_mut(|dance| {
            dance.remaining = dance.remaining.saturating_sub(1);
            dance.remaining > 0
        });
    }
}

fn check_team_defeat(battle: &mut Battle, bus: &mut EventBus) {
    if battle.is_over() {
        return;
    }
    for side in [TeamSide::Allies, TeamSide::Enemies] {
        if battle.team(side).is_defeated() {
            bus.push(BattleEvent::TeamDefeated { side });
            battle.outcome = BattleOutcome::Victory(side.opponent());
            return;
        }
    }
}
