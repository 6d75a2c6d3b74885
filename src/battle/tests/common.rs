//! Shared builders for battle tests.

use crate::battle::engine::{Battle, SubmittedAction};
use crate::battle::events::{ActionFailureReason, BattleEvent, EventBus};
use crate::battle::queue::MoveTarget;
use crate::fighter::{Fighter, FighterRef, FighterTag, Shield, Stats, Team, TeamSide};
use crate::moves::{AttackProfile, BattleMove, MoveKind, TargetCategory};
use crate::status::Status;

pub struct TestFighterBuilder {
    name: String,
    stats: Stats,
    moves: Vec<BattleMove>,
    tags: Vec<FighterTag>,
    shield: Option<Shield>,
    statuses: Vec<Status>,
}

impl TestFighterBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stats: Stats::new(30, 10, 4, 0, 5, 0, 0, 3),
            moves: Vec::new(),
            tags: Vec::new(),
            shield: None,
            statuses: Vec::new(),
        }
    }

    pub fn with_health(mut self, max_health: u32) -> Self {
        self.stats.max_health = max_health;
        self.stats.health = max_health;
        self
    }

    pub fn with_mana(mut self, max_mana: u32) -> Self {
        self.stats.max_mana = max_mana;
        self.stats.mana = max_mana;
        self
    }

    pub fn with_strength(mut self, strength: u32) -> Self {
        self.stats.strength = strength;
        self
    }

    pub fn with_defense(mut self, defense: u32) -> Self {
        self.stats.defense = defense;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.stats.speed = speed;
        self
    }

    pub fn with_magic(mut self, magic: u32) -> Self {
        self.stats.magic = magic;
        self
    }

    pub fn with_luck(mut self, luck: u32) -> Self {
        self.stats.luck = luck;
        self
    }

    pub fn with_move(mut self, battle_move: BattleMove) -> Self {
        self.moves.push(battle_move);
        self
    }

    pub fn with_tag(mut self, tag: FighterTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_shield(mut self, shield: Shield) -> Self {
        self.shield = Some(shield);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn build(self) -> Fighter {
        let mut fighter = Fighter::new(&self.name, self.stats)
            .with_moves(self.moves)
            .with_tags(self.tags);
        if let Some(shield) = self.shield {
            fighter.shield = Some(shield);
        }
        for status in self.statuses {
            fighter.statuses.apply(status);
        }
        fighter
    }
}

pub fn duel(ally: Fighter, enemy: Fighter) -> Battle {
    battle_of(vec![ally], vec![enemy])
}

pub fn battle_of(allies: Vec<Fighter>, enemies: Vec<Fighter>) -> Battle {
    Battle::new(Team::new("Wardens", allies), Team::new("Marauders", enemies))
        .expect("test teams must not be empty")
}

pub fn ally(index: usize) -> FighterRef {
    FighterRef::new(TeamSide::Allies, index)
}

pub fn enemy(index: usize) -> FighterRef {
    FighterRef::new(TeamSide::Enemies, index)
}

/// A plain physical attack that always connects and never crits.
pub fn strike(power: u32) -> BattleMove {
    strike_with_accuracy(100, power)
}

pub fn strike_with_accuracy(accuracy: u8, power: u32) -> BattleMove {
    BattleMove::new(
        "Strike",
        "A plain blow.",
        TargetCategory::SingleEnemy,
        MoveKind::Attack(AttackProfile::new(accuracy, 0, power).unwrap()),
    )
}

pub fn act(owner: FighterRef, battle_move: BattleMove, target: FighterRef) -> SubmittedAction {
    SubmittedAction::new(owner, battle_move, MoveTarget::Fighter(target))
}

pub fn wait_action(owner: FighterRef) -> SubmittedAction {
    SubmittedAction::new(
        owner,
        crate::moves::do_nothing().clone(),
        MoveTarget::Fighter(owner),
    )
}

/// Names of every move used this round, in resolution order.
pub fn move_used_names(bus: &EventBus) -> Vec<String> {
    bus.iter()
        .filter_map(|event| match event {
            BattleEvent::MoveUsed { move_name, .. } => Some(move_name.clone()),
            _ => None,
        })
        .collect()
}

pub fn has_failure(bus: &EventBus, expected: ActionFailureReason) -> bool {
    bus.iter().any(|event| {
        matches!(event, BattleEvent::ActionFailed { reason, .. } if *reason == expected)
    })
}

pub fn damage_amounts(bus: &EventBus) -> Vec<u32> {
    bus.iter()
        .filter_map(|event| match event {
            BattleEvent::DamageDealt { amount, .. } => Some(*amount),
            _ => None,
        })
        .collect()
}
