use crate::fighter::{Element, Shield, StatKind};
use crate::status::{Status, StatusKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A team- or battlefield-scoped modifier, typically produced by dance
/// or bell moves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum FieldEffectKind {
    /// Grants a status-family modifier to the whole team while active.
    /// Restoration modifiers fire for every living member at round end.
    TeamModifier(StatusKind),
    /// A one-shot magical blast against the opposing team.
    MagicBurst { element: Element, power: u32 },
    /// Grants a shield to every living member on application.
    GrantShield(Shield),
    /// Grants a status to every living member on application.
    GrantStatus(Status),
}

/// A field effect definition: kind, round-scoped duration, and an
/// "immediately executed" flag that forces the duration to zero so the
/// effect fires exactly once on application.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FieldEffect {
    pub kind: FieldEffectKind,
    pub duration: u8,
    pub immediate: bool,
}

impl FieldEffect {
    pub fn new(kind: FieldEffectKind, duration: u8) -> Self {
        Self {
            kind,
            duration,
            immediate: false,
        }
    }

    pub fn immediate(kind: FieldEffectKind) -> Self {
        Self {
            kind,
            duration: 0,
            immediate: true,
        }
    }
}

/// A field effect currently live on a team, counting down rounds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActiveFieldEffect {
    pub effect: FieldEffect,
    pub remaining: u8,
}

impl ActiveFieldEffect {
    pub fn new(effect: FieldEffect) -> Self {
        let remaining = effect.duration;
        Self { effect, remaining }
    }
}

/// The eight dance categories. The numeric codes order unordered pairs
/// for combination lookup.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DanceCategory {
    Ember,
    Torrent,
    Gale,
    Quake,
    Storm,
    Moonlit,
    Sunrise,
    Umbral,
}

impl DanceCategory {
    pub fn code(self) -> u8 {
        match self {
            DanceCategory::Ember => 0,
            DanceCategory::Torrent => 1,
            DanceCategory::Gale => 2,
            DanceCategory::Quake => 3,
            DanceCategory::Storm => 4,
            DanceCategory::Moonlit => 5,
            DanceCategory::Sunrise => 6,
            DanceCategory::Umbral => 7,
        }
    }
}

/// A dance effect currently live for a team, eligible for combination.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ActiveDance {
    pub category: DanceCategory,
    pub remaining: u8,
}

/// The named bundle of field effects produced by two simultaneous
/// dances. Bundles hold one to three effects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CombinedFieldEffect {
    pub name: String,
    pub effects: Vec<FieldEffect>,
}

impl CombinedFieldEffect {
    pub fn new(name: &str, effects: Vec<FieldEffect>) -> Self {
        debug_assert!(
            !effects.is_empty() && effects.len() <= 3,
            "a dance combo bundles 1-3 field effects"
        );
        Self {
            name: name.to_string(),
            effects,
        }
    }
}

/// Combination policy for simultaneous dance effects.
///
/// Lookup is always over the unordered pair, normalized by the numeric
/// min/max of the category codes, so `combine(a, b) == combine(b, a)` by
/// construction. Pairs absent from both the override and default tables
/// have no special interaction: each dancer's individual effect still
/// applies independently.
#[derive(Debug, Clone, Default)]
pub struct DanceCombiner {
    overrides: HashMap<(DanceCategory, DanceCategory), Option<CombinedFieldEffect>>,
}

impl DanceCombiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-pair override for scripted content. Overridden pairs
    /// take precedence; everything else falls back to the default table.
    pub fn with_override(
        mut self,
        a: DanceCategory,
        b: DanceCategory,
        combo: Option<CombinedFieldEffect>,
    ) -> Self {
        self.overrides.insert(Self::normalize(a, b), combo);
        self
    }

    pub fn combine(&self, a: DanceCategory, b: DanceCategory) -> Option<CombinedFieldEffect> {
        let pair = Self::normalize(a, b);
        if let Some(overridden) = self.overrides.get(&pair) {
            return overridden.clone();
        }
        Self::default_combo(pair.0, pair.1)
    }

    fn normalize(a: DanceCategory, b: DanceCategory) -> (DanceCategory, DanceCategory) {
        if a.code() <= b.code() {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// The built-in combination table. `a` and `b` arrive normalized
    /// with `a.code() <= b.code()`.
    fn default_combo(a: DanceCategory, b: DanceCategory) -> Option<CombinedFieldEffect> {
        use DanceCategory::*;
        use FieldEffectKind::*;

        let combo = match (a, b) {
            (Ember, Torrent) => CombinedFieldEffect::new(
                "Scalding Veil",
                vec![
                    FieldEffect::new(
                        TeamModifier(StatusKind::ElementResist {
                            element: Element::Fire,
                            multiplier: 0.5,
                        }),
                        3,
                    ),
                    FieldEffect::new(
                        TeamModifier(StatusKind::ElementResist {
                            element: Element::Water,
                            multiplier: 0.5,
                        }),
                        3,
                    ),
                ],
            ),
            (Ember, Gale) => CombinedFieldEffect::new(
                "Cinder Reel",
                vec![FieldEffect::immediate(MagicBurst {
                    element: Element::Fire,
                    power: 6,
                })],
            ),
            (Ember, Sunrise) => CombinedFieldEffect::new(
                "Daybreak Blaze",
                vec![
                    FieldEffect::new(
                        TeamModifier(StatusKind::ElementPower {
                            element: Element::Fire,
                            multiplier: 1.5,
                        }),
                        3,
                    ),
                    FieldEffect::new(
                        TeamModifier(StatusKind::CritBoost { multiplier: 1.5 }),
                        3,
                    ),
                    FieldEffect::immediate(MagicBurst {
                        element: Element::Fire,
                        power: 4,
                    }),
                ],
            ),
            (Torrent, Quake) => CombinedFieldEffect::new(
                "Mudbind Circle",
                vec![FieldEffect::new(
                    TeamModifier(StatusKind::StatBoost {
                        stat: StatKind::Defense,
                        multiplier: 1.5,
                    }),
                    3,
                )],
            ),
            (Gale, Storm) => CombinedFieldEffect::new(
                "Tempest Round",
                vec![
                    FieldEffect::new(
                        TeamModifier(StatusKind::StatBoost {
                            stat: StatKind::Speed,
                            multiplier: 1.5,
                        }),
                        3,
                    ),
                    FieldEffect::new(
                        TeamModifier(StatusKind::StatBoost {
                            stat: StatKind::Evade,
                            multiplier: 1.5,
                        }),
                        3,
                    ),
                ],
            ),
            (Quake, Umbral) => CombinedFieldEffect::new(
                "Gravewall",
                vec![
                    FieldEffect::immediate(GrantShield(Shield::new("Gravewall", 12))),
                    FieldEffect::new(
                        TeamModifier(StatusKind::StatBoost {
                            stat: StatKind::Defense,
                            multiplier: 1.25,
                        }),
                        2,
                    ),
                ],
            ),
            (Storm, Umbral) => CombinedFieldEffect::new(
                "Night Thunder",
                vec![
                    FieldEffect::immediate(MagicBurst {
                        element: Element::Lightning,
                        power: 8,
                    }),
                    FieldEffect::new(
                        TeamModifier(StatusKind::ElementPower {
                            element: Element::Lightning,
                            multiplier: 1.5,
                        }),
                        3,
                    ),
                ],
            ),
            (Moonlit, Sunrise) => CombinedFieldEffect::new(
                "Eclipse Round",
                vec![FieldEffect::new(
                    TeamModifier(StatusKind::RestorePercent {
                        resource: crate::fighter::Resource::Health,
                        percent: 10,
                    }),
                    3,
                )],
            ),
            _ => return None,
        };
        Some(combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: [DanceCategory; 8] = [
        DanceCategory::Ember,
        DanceCategory::Torrent,
        DanceCategory::Gale,
        DanceCategory::Quake,
        DanceCategory::Storm,
        DanceCategory::Moonlit,
        DanceCategory::Sunrise,
        DanceCategory::Umbral,
    ];

    #[test]
    fn combine_is_symmetric_for_every_pair() {
        let combiner = DanceCombiner::new();
        for &a in &ALL {
            for &b in &ALL {
                assert_eq!(
                    combiner.combine(a, b),
                    combiner.combine(b, a),
                    "combine must be symmetric for ({:?}, {:?})",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn undefined_pairs_yield_none() {
        let combiner = DanceCombiner::new();
        assert_eq!(combiner.combine(DanceCategory::Gale, DanceCategory::Moonlit), None);
        assert_eq!(combiner.combine(DanceCategory::Moonlit, DanceCategory::Gale), None);
    }

    #[test]
    fn defined_pairs_bundle_one_to_three_effects() {
        let combiner = DanceCombiner::new();
        let mut defined = 0;
        for (i, &a) in ALL.iter().enumerate() {
            for &b in &ALL[i..] {
                if let Some(combo) = combiner.combine(a, b) {
                    defined += 1;
                    assert!(!combo.effects.is_empty() && combo.effects.len() <= 3);
                }
            }
        }
        assert_eq!(defined, 8);
    }

    #[test]
    fn overrides_take_precedence_and_fall_back() {
        let custom = CombinedFieldEffect::new(
            "Scripted Finale",
            vec![FieldEffect::immediate(FieldEffectKind::MagicBurst {
                element: Element::Shade,
                power: 20,
            })],
        );
        let combiner = DanceCombiner::new()
            .with_override(DanceCategory::Gale, DanceCategory::Ember, Some(custom.clone()))
            .with_override(DanceCategory::Ember, DanceCategory::Torrent, None);

        // Override hit, looked up in either order.
        assert_eq!(
            combiner.combine(DanceCategory::Ember, DanceCategory::Gale),
            Some(custom)
        );
        // Override can also blank out a default pair.
        assert_eq!(
            combiner.combine(DanceCategory::Torrent, DanceCategory::Ember),
            None
        );
        // Everything else falls back to the default table.
        assert!(combiner
            .combine(DanceCategory::Moonlit, DanceCategory::Sunrise)
            .is_some());
    }

    #[test]
    fn immediate_effects_force_zero_duration() {
        let effect = FieldEffect::immediate(FieldEffectKind::MagicBurst {
            element: Element::Fire,
            power: 5,
        });
        assert!(effect.immediate);
        assert_eq!(effect.duration, 0);
    }
}
