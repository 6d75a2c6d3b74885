//! Shadegrove: a deterministic turn-based battle engine for a
//! single-player console RPG.
//!
//! The engine resolves whole rounds: each living fighter submits one
//! move, the moves are queued and consumed in priority-then-speed
//! order, and everything observable lands on an event bus for the front
//! end to narrate. All randomness flows through the [`chance`] seam, so
//! a scripted chance service makes any round reproducible under test.

pub mod battle;
pub mod chance;
pub mod effects;
pub mod errors;
pub mod field;
pub mod fighter;
pub mod moves;
pub mod status;

pub use battle::engine::{
    collect_actions, default_target, resolve_round, resolve_round_with, Battle, BattleOutcome,
    MoveExecutor, MoveSelector, RandomSelector, SubmittedAction,
};
pub use battle::events::{ActionFailureReason, BattleEvent, EventBus};
pub use battle::queue::{BattleMoveQueue, MoveTarget, QueuedMove};
pub use chance::{ChanceService, RandomChance, ScriptedChance};
pub use errors::{EngineError, EngineResult};
pub use fighter::{Element, Fighter, FighterRef, FighterTag, Resource, Shield, StatKind, Stats, Team, TeamSide};
pub use moves::{AttackProfile, BattleMove, MoveKind, TargetCategory, TargetingRule};
pub use status::{Status, StatusKind, StatusManager};
