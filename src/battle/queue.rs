use crate::fighter::{FighterRef, TeamSide};
use crate::moves::BattleMove;
use serde::{Deserialize, Serialize};

/// What a queued move is aimed at. Single-target moves carry a fighter
/// handle that can be replaced if it becomes invalid before the entry
/// is popped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    Fighter(FighterRef),
    Team(TeamSide),
    Field,
}

/// A move bound to its owner and a mutable target for one round.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueuedMove {
    pub owner: FighterRef,
    pub battle_move: BattleMove,
    pub target: MoveTarget,
    /// Index of a non-fighter battlefield object that resolves this
    /// entry itself, if any.
    pub executor: Option<usize>,
}

impl QueuedMove {
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

    /// Replace a target that became invalid before this entry was popped.
    pub fn retarget(&mut self, target: MoveTarget) {
        self.target = target;
    }

    /// The single fighter this entry is aimed at, if any.
    pub fn target_fighter(&self) -> Option<FighterRef> {
        match self.target {
            MoveTarget::Fighter(fighter) => Some(fighter),
            _ => None,
        }
    }
}

/// Priority dominates speed in the sort key. Any realistic effective
/// speed stays far below this weight.
const PRIORITY_WEIGHT: i64 = 100_000;

/// The round's ordered collection of submitted moves.
///
/// Sorting is injectable through an effective-speed function so that
/// statuses and field effects can bend turn order; `sort_and_pop`
/// re-sorts before every pop so mid-round speed changes are honored on
/// the next pop. The queue never drops entries whose owner has since
/// been defeated; the orchestrator checks at consumption time.
#[derive(Debug, Clone, Default)]
pub struct BattleMoveQueue {
    entries: Vec<QueuedMove>,
}

impl BattleMoveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: QueuedMove) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedMove> {
        self.entries.iter()
    }

    /// Order entries descending by `priority * 100_000 + speed_fn(entry)`.
    /// The sort is stable, so equal keys keep submission order.
    pub fn sort_with(&mut self, speed_fn: &dyn Fn(&QueuedMove) -> i64) {
        self.entries.sort_by_key(|entry| {
            let key = entry.battle_move.priority as i64 * PRIORITY_WEIGHT + speed_fn(entry);
            std::cmp::Reverse(key)
        });
    }

    /// Remove and return the first entry. Popping an empty queue is a
    /// precondition violation.
    pub fn pop(&mut self) -> QueuedMove {
        if self.entries.is_empty() {
            panic!("popped an empty battle move queue");
        }
        self.entries.remove(0)
    }

    /// Re-sort, then pop, so the result reflects the most current
    /// effective speeds.
    pub fn sort_and_pop(&mut self, speed_fn: &dyn Fn(&QueuedMove) -> i64) -> QueuedMove {
        self.sort_with(speed_fn);
        self.pop()
    }
}
