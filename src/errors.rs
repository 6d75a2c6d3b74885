use crate::fighter::Resource;
use std::fmt;

/// Main error type for the Shadegrove battle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Error constructing a move effect
    Effect(EffectError),
    /// Error constructing a move
    Move(MoveError),
    /// Error setting up or driving a battle
    Flow(BattleFlowError),
}

/// Errors raised when a conditional move effect is constructed with
/// out-of-range parameters. These always fail at construction time,
/// never at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// Restoration percentage must lie in (0, 100]
    PercentOutOfRange { resource: Resource, percent: u8 },
}

/// Errors raised when a move definition is constructed with invalid data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Accuracy must lie in 0..=100
    AccuracyOutOfRange(u8),
    /// Critical chance must lie in 0..=100
    CritChanceOutOfRange(u8),
}

/// Errors raised when assembling or driving a battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleFlowError {
    /// A team must contain at least one fighter
    EmptyTeam(String),
    /// A submitted action referenced a fighter index that does not exist
    UnknownFighter(usize),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Effect(err) => write!(f, "Effect error: {}", err),
            EngineError::Move(err) => write!(f, "Move error: {}", err),
            EngineError::Flow(err) => write!(f, "Battle flow error: {}", err),
        }
    }
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::PercentOutOfRange { resource, percent } => write!(
                f,
                "Restoration percentage for {:?} must be in (0, 100], got {}",
                resource, percent
            ),
        }
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::AccuracyOutOfRange(value) => {
                write!(f, "Accuracy must be in 0..=100, got {}", value)
            }
            MoveError::CritChanceOutOfRange(value) => {
                write!(f, "Critical chance must be in 0..=100, got {}", value)
            }
        }
    }
}

impl fmt::Display for BattleFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleFlowError::EmptyTeam(name) => {
                write!(f, "Team '{}' has no fighters", name)
            }
            BattleFlowError::UnknownFighter(index) => {
                write!(f, "No fighter at index {}", index)
            }
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for EffectError {}
impl std::error::Error for MoveError {}
impl std::error::Error for BattleFlowError {}

impl From<EffectError> for EngineError {
    fn from(err: EffectError) -> Self {
        EngineError::Effect(err)
    }
}

impl From<MoveError> for EngineError {
    fn from(err: MoveError) -> Self {
        EngineError::Move(err)
    }
}

impl From<BattleFlowError> for EngineError {
    fn from(err: BattleFlowError) -> Self {
        EngineError::Flow(err)
    }
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Type alias for Results using EffectError
pub type EffectResult<T> = Result<T, EffectError>;

/// Type alias for Results using MoveError
pub type MoveResult<T> = Result<T, MoveError>;
