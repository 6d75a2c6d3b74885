use crate::moves::BattleMove;
use crate::status::StatusManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The elemental types moves and bonuses are keyed by.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Fire,
    Water,
    Lightning,
    Shade,
}

/// The ordinary stats a fighter carries. Multiplier statuses and
/// team-wide field effects are parameterized by one of these.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Strength,
    Defense,
    Speed,
    Evade,
    Luck,
    Magic,
}

/// A restorable resource pool.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Health,
    Mana,
}

/// Capability tags used by targeting rules to restrict move candidates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FighterTag {
    /// A shade fighter, consumable by absorb-shade moves.
    Shade,
    /// A battlefield construct rather than a living combatant.
    Construct,
}

/// A damage-absorbing barrier. Shields soak damage before health and
/// shatter when their strength is spent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Shield {
    pub name: String,
    pub strength: u32,
}

impl Shield {
    pub fn new(name: &str, strength: u32) -> Self {
        Self {
            name: name.to_string(),
            strength,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stats {
    pub max_health: u32,
    pub health: u32,
    pub max_mana: u32,
    pub mana: u32,
    pub strength: u32,
    pub defense: u32,
    pub speed: u32,
    pub evade: u32,
    pub luck: u32,
    pub magic: u32,
    /// Innate outgoing damage bonus per element (1.0 = neutral).
    pub element_power: HashMap<Element, f64>,
    /// Innate incoming damage scale per element (1.0 = neutral, below
    /// 1.0 resists).
    pub element_resist: HashMap<Element, f64>,
}

impl Stats {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_health: u32,
        max_mana: u32,
        strength: u32,
        defense: u32,
        speed: u32,
        evade: u32,
        luck: u32,
        magic: u32,
    ) -> Self {
        Self {
            max_health,
            health: max_health,
            max_mana,
            mana: max_mana,
            strength,
            defense,
            speed,
            evade,
            luck,
            magic,
            element_power: HashMap::new(),
            element_resist: HashMap::new(),
        }
    }

    pub fn base(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Strength => self.strength,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
            StatKind::Evade => self.evade,
            StatKind::Luck => self.luck,
            StatKind::Magic => self.magic,
        }
    }
}

/// A combat participant: stats, lingering statuses, an optional shield,
/// capability tags and the moves it can submit.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Fighter {
    pub name: String,
    pub stats: Stats,
    pub statuses: StatusManager,
    pub shield: Option<Shield>,
    pub tags: Vec<FighterTag>,
    pub moves: Vec<BattleMove>,
    /// Rounds left before a multi-turn move user may act again.
    pub recharge_turns: u8,
}

impl Fighter {
    pub fn new(name: &str, stats: Stats) -> Self {
        Self {
            name: name.to_string(),
            stats,
            statuses: StatusManager::new(),
            shield: None,
            tags: Vec::new(),
            moves: Vec::new(),
            recharge_turns: 0,
        }
    }

    pub fn with_moves(mut self, moves: Vec<BattleMove>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_tags(mut self, tags: Vec<FighterTag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_shield(mut self, shield: Shield) -> Self {
        self.shield = Some(shield);
        self
    }

    pub fn with_element_power(mut self, element: Element, multiplier: f64) -> Self {
        self.stats.element_power.insert(element, multiplier);
        self
    }

    pub fn with_element_resist(mut self, element: Element, multiplier: f64) -> Self {
        self.stats.element_resist.insert(element, multiplier);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.stats.health > 0
    }

    pub fn is_defeated(&self) -> bool {
        !self.is_alive()
    }

    pub fn has_tag(&self, tag: FighterTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Apply damage to health, returning true if this defeated the fighter.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.stats.health = self.stats.health.saturating_sub(amount);
        self.stats.health == 0
    }

    /// Heal up to max health, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.stats.max_health - self.stats.health);
        self.stats.health += healed;
        healed
    }

    /// Restore mana up to the max pool, returning the amount restored.
    pub fn restore_mana(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.stats.max_mana - self.stats.mana);
        self.stats.mana += restored;
        restored
    }

    /// Spend mana if enough is available.
    pub fn spend_mana(&mut self, cost: u32) -> bool {
        if self.stats.mana < cost {
            return false;
        }
        self.stats.mana -= cost;
        true
    }

    pub fn innate_element_power(&self, element: Element) -> f64 {
        self.stats.element_power.get(&element).copied().unwrap_or(1.0)
    }

    pub fn innate_element_resist(&self, element: Element) -> f64 {
        self.stats.element_resist.get(&element).copied().unwrap_or(1.0)
    }
}

/// Which side of the battlefield a team fights on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSide {
    Allies,
    Enemies,
}

impl TeamSide {
    pub fn to_index(self) -> usize {
        match self {
            TeamSide::Allies => 0,
            TeamSide::Enemies => 1,
        }
    }

    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Allies => TeamSide::Enemies,
            TeamSide::Enemies => TeamSide::Allies,
        }
    }

    pub fn from_index(index: usize) -> TeamSide {
        match index {
            0 => TeamSide::Allies,
            1 => TeamSide::Enemies,
            _ => panic!("Invalid team index: {}", index),
        }
    }
}

/// A copyable handle to one fighter on the battlefield.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FighterRef {
    pub side: TeamSide,
    pub index: usize,
}

impl FighterRef {
    pub fn new(side: TeamSide, index: usize) -> Self {
        Self { side, index }
    }
}

/// A squad of fighters acting together, plus the team-scoped field
/// effects and live dance entries that modify them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub name: String,
    pub fighters: Vec<Fighter>,
    pub field_effects: Vec<crate::field::ActiveFieldEffect>,
    pub active_dances: Vec<crate::field::ActiveDance>,
}

impl Team {
    pub fn new(name: &str, fighters: Vec<Fighter>) -> Self {
        Self {
            name: name.to_string(),
            fighters,
            field_effects: Vec::new(),
            active_dances: Vec::new(),
        }
    }

    pub fn living_indices(&self) -> Vec<usize> {
        self.fighters
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_alive())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_defeated(&self) -> bool {
        self.fighters.iter().all(|f| f.is_defeated())
    }

    pub fn has_dance(&self, category: crate::field::DanceCategory) -> bool {
        self.active_dances.iter().any(|d| d.category == category)
    }
}
