use crate::battle::engine::Battle;
use crate::field::FieldEffect;
use crate::fighter::{Element, FighterRef, Shield, TeamSide};
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a submitted action produced nothing when it was popped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    InsufficientMana,
    MagicSealed,
    NoValidTarget,
    TargetAlive,
    TargetNotShade,
    NoShieldToFortify,
    EscapeFailed,
    Recharging,
    MoveFailedToExecute,
}

/// Everything observable that happens during resolution, in order.
///
/// Events carry handles and raw numbers; presentation is the
/// subscriber's problem. `format` renders the default console line for
/// an event, returning `None` for events with no player-facing line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    RoundStarted { round: u32 },
    RoundEnded { round: u32 },
    MoveUsed {
        actor: FighterRef,
        move_name: String,
        execution_text: Option<String>,
        target: Option<FighterRef>,
    },
    MoveMissed { attacker: FighterRef, target: FighterRef },
    MoveHit { attacker: FighterRef, target: FighterRef },
    CriticalHit { attacker: FighterRef, target: FighterRef },
    AutoEvaded { target: FighterRef },
    Countered {
        defender: FighterRef,
        attacker: FighterRef,
        damage: u32,
    },
    DamageDealt {
        target: FighterRef,
        amount: u32,
        remaining_health: u32,
    },
    DamageReflected {
        element: Element,
        original_attacker: FighterRef,
    },
    Healed {
        target: FighterRef,
        amount: u32,
        new_health: u32,
    },
    ManaRestored {
        target: FighterRef,
        amount: u32,
        new_mana: u32,
    },
    StatusAdded { target: FighterRef, status: Status },
    StatusRefreshed { target: FighterRef, status: Status },
    StatusRemoved { target: FighterRef, status: Status },
    ShieldGranted { target: FighterRef, shield: Shield },
    ShieldFortified {
        target: FighterRef,
        bonus: u32,
        new_strength: u32,
    },
    ShieldDamaged {
        target: FighterRef,
        absorbed: u32,
        remaining: u32,
    },
    ShieldBroken { target: FighterRef },
    FieldEffectApplied { side: TeamSide, effect: FieldEffect },
    FieldEffectExecuted { side: TeamSide, effect: FieldEffect },
    FieldEffectExpired { side: TeamSide, effect: FieldEffect },
    DanceComboFormed { side: TeamSide, name: String },
    SpecialMoveExecuted {
        actor: FighterRef,
        move_name: String,
    },
    ActionFailed {
        actor: FighterRef,
        reason: ActionFailureReason,
    },
    FighterRevived {
        target: FighterRef,
        new_health: u32,
    },
    ShadeAbsorbed {
        actor: FighterRef,
        shade: FighterRef,
    },
    FighterDefeated { target: FighterRef },
    TeamDefeated { side: TeamSide },
    Escaped { side: TeamSide },
}

impl BattleEvent {
    /// Render the default console line, or `None` for silent events.
    pub fn format(&self, battle: &Battle) -> Option<String> {
        let name = |fighter: &FighterRef| battle.fighter(*fighter).name.clone();
        let team_name = |side: &TeamSide| battle.team(*side).name.clone();

        match self {
            BattleEvent::RoundStarted { round } => Some(format!("--- Round {} ---", round)),
            BattleEvent::RoundEnded { .. } => None,
            BattleEvent::MoveUsed {
                actor,
                move_name,
                execution_text,
                target,
            } => match execution_text {
                Some(template) => {
                    let target_name = target.map(|t| name(&t)).unwrap_or_else(|| name(actor));
                    Some(
                        template
                            .replace("[user]", &name(actor))
                            .replace("[target]", &target_name),
                    )
                }
                None => Some(format!("{} used {}!", name(actor), move_name)),
            },
            BattleEvent::MoveMissed { attacker, .. } => {
                Some(format!("{}'s attack missed!", name(attacker)))
            }
            // A plain hit is narrated by the damage it deals.
            BattleEvent::MoveHit { .. } => None,
            BattleEvent::CriticalHit { .. } => Some("A critical hit!".to_string()),
            BattleEvent::AutoEvaded { target } => {
                Some(format!("{} evaded the attack!", name(target)))
            }
            BattleEvent::Countered {
                defender, damage, ..
            } => Some(format!(
                "{} struck back for {} damage!",
                name(defender),
                damage
            )),
            BattleEvent::DamageDealt { target, amount, .. } => {
                Some(format!("{} took {} damage!", name(target), amount))
            }
            BattleEvent::DamageReflected {
                original_attacker, ..
            } => Some(format!(
                "The attack was reflected back at {}!",
                name(original_attacker)
            )),
            BattleEvent::Healed { target, amount, .. } => {
                Some(format!("{} recovered {} health.", name(target), amount))
            }
            BattleEvent::ManaRestored { target, amount, .. } => {
                Some(format!("{} recovered {} mana.", name(target), amount))
            }
            BattleEvent::StatusAdded { target, status } => Some(format!(
                "{} is affected by {:?}.",
                name(target),
                status.kind
            )),
            BattleEvent::StatusRefreshed { .. } => None,
            BattleEvent::StatusRemoved { target, status } => Some(format!(
                "{} is no longer affected by {:?}.",
                name(target),
                status.kind
            )),
            BattleEvent::ShieldGranted { target, shield } => Some(format!(
                "{} is protected by {}!",
                name(target),
                shield.name
            )),
            BattleEvent::ShieldFortified {
                target,
                new_strength,
                ..
            } => Some(format!(
                "{}'s shield strengthened to {}!",
                name(target),
                new_strength
            )),
            BattleEvent::ShieldDamaged {
                target, absorbed, ..
            } => Some(format!(
                "{}'s shield absorbed {} damage.",
                name(target),
                absorbed
            )),
            BattleEvent::ShieldBroken { target } => {
                Some(format!("{}'s shield shattered!", name(target)))
            }
            BattleEvent::FieldEffectApplied { side, .. } => Some(format!(
                "A field effect settles over {}.",
                team_name(side)
            )),
            // One-shot executions narrate through the damage or grants
            // they produce.
            BattleEvent::FieldEffectExecuted { .. } => None,
            BattleEvent::FieldEffectExpired { side, .. } => Some(format!(
                "A field effect over {} faded.",
                team_name(side)
            )),
            BattleEvent::DanceComboFormed { name, .. } => {
                Some(format!("The dances combine into {}!", name))
            }
            BattleEvent::SpecialMoveExecuted {
                actor, move_name, ..
            } => Some(format!("{} performed {}.", name(actor), move_name)),
            BattleEvent::ActionFailed { actor, reason } => {
                let line = match reason {
                    ActionFailureReason::InsufficientMana => {
                        format!("{} doesn't have enough mana!", name(actor))
                    }
                    ActionFailureReason::MagicSealed => {
                        format!("{}'s magic is sealed!", name(actor))
                    }
                    ActionFailureReason::NoValidTarget => {
                        format!("{}'s move has no target!", name(actor))
                    }
                    ActionFailureReason::TargetAlive => {
                        format!("{}'s move only works on the fallen!", name(actor))
                    }
                    ActionFailureReason::TargetNotShade => {
                        format!("{} found nothing to absorb!", name(actor))
                    }
                    ActionFailureReason::NoShieldToFortify => {
                        format!("There is no shield for {} to strengthen!", name(actor))
                    }
                    ActionFailureReason::EscapeFailed => {
                        format!("{} couldn't get away!", name(actor))
                    }
                    ActionFailureReason::Recharging => {
                        format!("{} must recover!", name(actor))
                    }
                    ActionFailureReason::MoveFailedToExecute => {
                        format!("{}'s move failed!", name(actor))
                    }
                };
                Some(line)
            }
            BattleEvent::FighterRevived { target, .. } => {
                Some(format!("{} returned to the fight!", name(target)))
            }
            BattleEvent::ShadeAbsorbed { actor, shade } => Some(format!(
                "{} absorbed {}!",
                name(actor),
                name(shade)
            )),
            BattleEvent::FighterDefeated { target } => {
                Some(format!("{} was defeated!", name(target)))
            }
            BattleEvent::TeamDefeated { side } => {
                Some(format!("{} were wiped out!", team_name(side)))
            }
            BattleEvent::Escaped { side } => {
                Some(format!("{} fled the battle!", team_name(side)))
            }
        }
    }
}

/// Ordered record of everything that happened during one resolution
/// call. Subscribers read it back after the fact; the engine only ever
/// appends.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every default console line, in event order.
    pub fn narrate(&self, battle: &Battle) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(battle))
            .collect()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{:?}", event)?;
        }
        Ok(())
    }
}
