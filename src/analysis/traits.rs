//! Conditional champion bonuses.
//!
//! Each rule belongs to one champion and fires at most once per side per
//! evaluation when its owner is picked and its predicate holds. Rules run in
//! table order, blue side first, and later rules see the stat changes made
//! by earlier ones.

use crate::analysis::positions::{assign_positions, Assignment};
use crate::analysis::team_stats::{compute_team_stats, TeamStats};
use crate::model::champion::{Archetype, Catalog, Champion, DamageType, Position};
use crate::model::team::{PerSide, Side, TeamSlate};
use serde::Serialize;

/// How hard a rule's condition is to meet. Harder conditions pay more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRule {
    pub stat_scale: f64,
    pub win_scale: f64,
    pub debuff_scale: f64,
    pub stat_cap: f64,
    pub win_cap: f64,
    pub debuff_cap: f64,
}

impl Difficulty {
    pub fn scale(self) -> ScaleRule {
        match self {
            Difficulty::Easy => ScaleRule {
                stat_scale: 0.9,
                win_scale: 0.85,
                debuff_scale: 0.8,
                stat_cap: 6.0,
                win_cap: 7.0,
                debuff_cap: 12.0,
            },
            Difficulty::Medium => ScaleRule {
                stat_scale: 1.0,
                win_scale: 1.0,
                debuff_scale: 1.0,
                stat_cap: 7.0,
                win_cap: 8.0,
                debuff_cap: 12.0,
            },
            Difficulty::Hard => ScaleRule {
                stat_scale: 1.1,
                win_scale: 1.1,
                debuff_scale: 1.05,
                stat_cap: 8.0,
                win_cap: 10.0,
                debuff_cap: 14.0,
            },
        }
    }
}

impl ScaleRule {
    fn stat(&self, raw: f64) -> f64 {
        if raw > 0.0 {
            (raw * self.stat_scale).min(self.stat_cap)
        } else if raw < 0.0 {
            -(raw.abs() * self.debuff_scale).min(self.debuff_cap)
        } else {
            0.0
        }
    }

    fn win(&self, raw: f64) -> f64 {
        if raw >= 0.0 {
            (raw * self.win_scale).min(self.win_cap)
        } else {
            -(raw.abs() * self.win_scale).min(self.win_cap)
        }
    }
}

/// Additive change to a side's stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatDelta {
    pub cc: f64,
    pub damage: f64,
    pub tank: f64,
    pub dive: f64,
    pub poke: f64,
    pub anti: f64,
    pub early: f64,
    pub mid: f64,
    pub late: f64,
}

impl StatDelta {
    pub const ZERO: StatDelta = StatDelta {
        cc: 0.0,
        damage: 0.0,
        tank: 0.0,
        dive: 0.0,
        poke: 0.0,
        anti: 0.0,
        early: 0.0,
        mid: 0.0,
        late: 0.0,
    };

    pub fn scaled(&self, rule: &ScaleRule) -> StatDelta {
        StatDelta {
            cc: rule.stat(self.cc),
            damage: rule.stat(self.damage),
            tank: rule.stat(self.tank),
            dive: rule.stat(self.dive),
            poke: rule.stat(self.poke),
            anti: rule.stat(self.anti),
            early: rule.stat(self.early),
            mid: rule.stat(self.mid),
            late: rule.stat(self.late),
        }
    }

    pub fn apply_to(&self, stats: &mut TeamStats) {
        stats.cc += self.cc;
        stats.damage += self.damage;
        stats.tank += self.tank;
        stats.dive += self.dive;
        stats.poke += self.poke;
        stats.anti += self.anti;
        stats.early += self.early;
        stats.mid += self.mid;
        stats.late += self.late;
    }
}

/// Win-rate adjustments outside the stat model, in percentage points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TraitBonus {
    pub win: f64,
    pub early: f64,
    pub mid: f64,
    pub late: f64,
    pub late_bias: f64,
}

impl TraitBonus {
    pub fn scaled(&self, rule: &ScaleRule) -> TraitBonus {
        TraitBonus {
            win: rule.win(self.win),
            early: rule.stat(self.early),
            mid: rule.stat(self.mid),
            late: rule.stat(self.late),
            late_bias: rule.stat(self.late_bias),
        }
    }

    pub fn add(&mut self, other: &TraitBonus) {
        self.win += other.win;
        self.early += other.early;
        self.mid += other.mid;
        self.late += other.late;
        self.late_bias += other.late_bias;
    }
}

/// What a triggered rule does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraitEffect {
    Adjust {
        ally: StatDelta,
        enemy: StatDelta,
        bonus: TraitBonus,
    },
    /// Exchange the side's early and late sums. Carries no bonus.
    SwapEarlyLate,
}

impl TraitEffect {
    fn ally(delta: StatDelta) -> Self {
        TraitEffect::Adjust {
            ally: delta,
            enemy: StatDelta::ZERO,
            bonus: TraitBonus::default(),
        }
    }

    fn enemy(delta: StatDelta) -> Self {
        TraitEffect::Adjust {
            ally: StatDelta::ZERO,
            enemy: delta,
            bonus: TraitBonus::default(),
        }
    }
}

/// Read-only view a rule evaluates against.
pub struct RuleCtx<'a> {
    pub catalog: &'a Catalog,
    pub side: Side,
    pub stats: &'a PerSide<TeamStats>,
    pub picks: &'a PerSide<Vec<&'a str>>,
    pub roles: &'a PerSide<Assignment>,
}

impl<'a> RuleCtx<'a> {
    pub fn ally(&self) -> &TeamStats {
        &self.stats[self.side]
    }

    pub fn enemy(&self) -> &TeamStats {
        &self.stats[self.side.opponent()]
    }

    fn at(&self, side: Side, position: Position) -> Option<&'a Champion> {
        self.roles[side]
            .at(position)
            .and_then(|key| self.catalog.get(key))
    }

    pub fn ally_at(&self, position: Position) -> Option<&'a Champion> {
        self.at(self.side, position)
    }

    pub fn enemy_at(&self, position: Position) -> Option<&'a Champion> {
        self.at(self.side.opponent(), position)
    }

    pub fn ally_at_is(&self, position: Position, keys: &[&str]) -> bool {
        self.ally_at(position)
            .is_some_and(|c| keys.contains(&c.key.as_str()))
    }

    pub fn ally_has_any(&self, keys: &[&str]) -> bool {
        self.picks[self.side].iter().any(|k| keys.contains(k))
    }

    pub fn enemy_has_any(&self, keys: &[&str]) -> bool {
        self.picks[self.side.opponent()].iter().any(|k| keys.contains(k))
    }

    fn archetype_count(&self, side: Side, archetype: Archetype) -> usize {
        self.picks[side]
            .iter()
            .filter_map(|k| self.catalog.get(k))
            .filter(|c| c.archetype == archetype)
            .count()
    }

    pub fn ally_archetype_count(&self, archetype: Archetype) -> usize {
        self.archetype_count(self.side, archetype)
    }

    pub fn enemy_archetype_count(&self, archetype: Archetype) -> usize {
        self.archetype_count(self.side.opponent(), archetype)
    }
}

pub struct TraitRule {
    pub owner: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
    pub difficulty: Difficulty,
    pub predicate: fn(&RuleCtx) -> bool,
    pub effect: fn(&RuleCtx) -> TraitEffect,
}

const Z: StatDelta = StatDelta::ZERO;

fn thornmail(c: &RuleCtx) -> bool {
    c.enemy().ad_ratio >= 0.7
}

fn tank_gain(_: &RuleCtx) -> TraitEffect {
    TraitEffect::ally(StatDelta { tank: 5.0, ..Z })
}

static TRAIT_RULES: &[TraitRule] = &[
    TraitRule {
        owner: "LeeSin",
        name: "Solo Queue Smasher",
        summary: "Early +5 with LeBlanc or Ahri in mid",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Mid, &["Leblanc", "Ahri"]),
        effect: |_| TraitEffect::ally(StatDelta { early: 5.0, ..Z }),
    },
    TraitRule {
        owner: "Nidalee",
        name: "Spear Volley",
        summary: "Damage +3 when team CC reaches 10",
        difficulty: Difficulty::Medium,
        predicate: |c| c.ally().cc >= 10.0,
        effect: |_| TraitEffect::ally(StatDelta { damage: 3.0, ..Z }),
    },
    TraitRule {
        owner: "Sejuani",
        name: "Frost Resistance",
        summary: "Tank +3 against Ashe or Singed",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy_has_any(&["Ashe", "Singed"]),
        effect: |_| TraitEffect::ally(StatDelta { tank: 3.0, ..Z }),
    },
    TraitRule {
        owner: "Elise",
        name: "Let's Dive",
        summary: "Early/Mid +3 with Renekton or Darius top",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Top, &["Renekton", "Darius"]),
        effect: |_| TraitEffect::ally(StatDelta { early: 3.0, mid: 3.0, ..Z }),
    },
    TraitRule {
        owner: "Vi",
        name: "Assault Combo",
        summary: "Enemy ADC damage -12% with Ahri or Lissandra",
        difficulty: Difficulty::Hard,
        predicate: |c| {
            c.ally_has_any(&["Ahri", "Lissandra"]) && c.enemy_at(Position::Adc).is_some()
        },
        effect: |c| {
            let adc_damage = c.enemy_at(Position::Adc).map_or(0.0, |adc| adc.damage as f64);
            TraitEffect::enemy(StatDelta { damage: -(adc_damage * 0.12), ..Z })
        },
    },
    TraitRule {
        owner: "Maokai",
        name: "Nature's Might",
        summary: "Tank +7 when jungle and support are both tanks",
        difficulty: Difficulty::Hard,
        predicate: |c| {
            let jungle = c.ally_at(Position::Jungle);
            let support = c.ally_at(Position::Support);
            jungle.is_some_and(Champion::is_tanker) && support.is_some_and(Champion::is_tanker)
        },
        effect: |_| TraitEffect::ally(StatDelta { tank: 7.0, ..Z }),
    },
    TraitRule {
        owner: "Ivern",
        name: "Friend of the Forest",
        summary: "All phases +2 with Rengar",
        difficulty: Difficulty::Medium,
        predicate: |c| c.ally_has_any(&["Rengar"]),
        effect: |_| TraitEffect::ally(StatDelta { early: 2.0, mid: 2.0, late: 2.0, ..Z }),
    },
    TraitRule {
        owner: "Nocturne",
        name: "Lights Out",
        summary: "Win +8% with Twisted Fate or Shen",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_has_any(&["TwistedFate", "Shen"]),
        effect: |_| TraitEffect::Adjust {
            ally: Z,
            enemy: Z,
            bonus: TraitBonus { win: 8.0, ..TraitBonus::default() },
        },
    },
    TraitRule {
        owner: "Hecarim",
        name: "Charge",
        summary: "Dive +1 with Yuumi or Lulu",
        difficulty: Difficulty::Easy,
        predicate: |c| c.ally_has_any(&["Yuumi", "Lulu"]),
        effect: |_| TraitEffect::ally(StatDelta { dive: 1.0, ..Z }),
    },
    TraitRule {
        owner: "Kindred",
        name: "That's My Jungle",
        summary: "Mid +4 against a tanky jungler",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy_at(Position::Jungle).is_some_and(|j| j.tank >= 7),
        effect: |_| TraitEffect::ally(StatDelta { mid: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Trundle",
        name: "Anti-Tank",
        summary: "Steal 4 tank from a 27+ tank team",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy().tank >= 27.0,
        effect: |_| TraitEffect::Adjust {
            ally: StatDelta { tank: 4.0, ..Z },
            enemy: StatDelta { tank: -4.0, ..Z },
            bonus: TraitBonus::default(),
        },
    },
    TraitRule {
        owner: "Khazix",
        name: "Grasshopper World",
        summary: "Early +4 against a weak early jungler",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy_at(Position::Jungle).is_some_and(|j| j.curve.early <= 3),
        effect: |_| TraitEffect::ally(StatDelta { early: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Rammus",
        name: "Thornmail",
        summary: "Tank +5 against 70%+ physical damage",
        difficulty: Difficulty::Easy,
        predicate: thornmail,
        effect: tank_gain,
    },
    TraitRule {
        owner: "Malphite",
        name: "Thornmail",
        summary: "Tank +5 against 70%+ physical damage",
        difficulty: Difficulty::Easy,
        predicate: thornmail,
        effect: tank_gain,
    },
    TraitRule {
        owner: "Rakan",
        name: "Lovebirds",
        summary: "Early +2, Damage +1, Tank +1, early win +5 with Xayah",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["Xayah"]),
        effect: |_| TraitEffect::Adjust {
            ally: StatDelta { early: 2.0, damage: 1.0, tank: 1.0, ..Z },
            enemy: Z,
            bonus: TraitBonus { early: 5.0, ..TraitBonus::default() },
        },
    },
    TraitRule {
        owner: "Nami",
        name: "Classic Lane",
        summary: "Early +2, Damage +5 with Lucian",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["Lucian"]),
        effect: |_| TraitEffect::ally(StatDelta { early: 2.0, damage: 5.0, ..Z }),
    },
    TraitRule {
        owner: "Lulu",
        name: "Fae Companion",
        summary: "Late +7 with a hyper-carry ADC",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["KogMaw", "Jinx", "Vayne"]),
        effect: |_| TraitEffect::ally(StatDelta { late: 7.0, ..Z }),
    },
    TraitRule {
        owner: "Yuumi",
        name: "Perfect Attachment",
        summary: "Damage +4 with Zeri or Ezreal",
        difficulty: Difficulty::Medium,
        predicate: |c| c.ally_at_is(Position::Adc, &["Zeri", "Ezreal"]),
        effect: |_| TraitEffect::ally(StatDelta { damage: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Milio",
        name: "Cozy Campfire",
        summary: "Early +4 with Lucian or Caitlyn",
        difficulty: Difficulty::Medium,
        predicate: |c| c.ally_at_is(Position::Adc, &["Lucian", "Caitlyn"]),
        effect: |_| TraitEffect::ally(StatDelta { early: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Braum",
        name: "Freljord Shield",
        summary: "CC +1, Tank +2 with Ashe or Lucian",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["Ashe", "Lucian"]),
        effect: |_| TraitEffect::ally(StatDelta { cc: 1.0, tank: 2.0, ..Z }),
    },
    TraitRule {
        owner: "Nautilus",
        name: "Deep Pressure",
        summary: "Damage +2 with Kai'Sa or Samira",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["Kaisa", "Samira"]),
        effect: |_| TraitEffect::ally(StatDelta { damage: 2.0, ..Z }),
    },
    TraitRule {
        owner: "Karma",
        name: "Poke Together",
        summary: "Poke +4 with Ezreal or Sivir",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["Ezreal", "Sivir"]),
        effect: |_| TraitEffect::ally(StatDelta { poke: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Taric",
        name: "Cosmic Radiance",
        summary: "Mid +6 with Master Yi jungle",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Jungle, &["MasterYi"]),
        effect: |_| TraitEffect::ally(StatDelta { mid: 6.0, ..Z }),
    },
    TraitRule {
        owner: "Kassadin",
        name: "Can't Hold On",
        summary: "Late +5 against an AP mid, Early -5 against an AD mid",
        difficulty: Difficulty::Medium,
        predicate: |c| {
            c.enemy_at(Position::Mid)
                .is_some_and(|m| m.damage_type != DamageType::Hybrid)
        },
        effect: |c| match c.enemy_at(Position::Mid).map(|m| m.damage_type) {
            Some(DamageType::Magic) => TraitEffect::ally(StatDelta { late: 5.0, ..Z }),
            _ => TraitEffect::ally(StatDelta { early: -5.0, ..Z }),
        },
    },
    TraitRule {
        owner: "Fiora",
        name: "Grand Challenge",
        summary: "Late +3 against a tanky top laner",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy_at(Position::Top).is_some_and(|t| t.tank >= 8),
        effect: |_| TraitEffect::ally(StatDelta { late: 3.0, ..Z }),
    },
    TraitRule {
        owner: "Vex",
        name: "Gloom",
        summary: "CC +3 against four or more divers",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy_archetype_count(Archetype::Dive) >= 4,
        effect: |_| TraitEffect::ally(StatDelta { cc: 3.0, ..Z }),
    },
    TraitRule {
        owner: "Morgana",
        name: "Black Shield",
        summary: "Enemy CC -5 when it reaches 12",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy().cc >= 12.0,
        effect: |_| TraitEffect::enemy(StatDelta { cc: -5.0, ..Z }),
    },
    TraitRule {
        owner: "Vayne",
        name: "Tank Hunter",
        summary: "Damage +5 against a 27+ tank team",
        difficulty: Difficulty::Medium,
        predicate: |c| c.enemy().tank >= 27.0,
        effect: |_| TraitEffect::ally(StatDelta { damage: 5.0, ..Z }),
    },
    TraitRule {
        owner: "Sivir",
        name: "On the Hunt",
        summary: "Damage +5 with three or more allied divers",
        difficulty: Difficulty::Medium,
        predicate: |c| c.ally_archetype_count(Archetype::Dive) >= 3,
        effect: |_| TraitEffect::ally(StatDelta { damage: 5.0, ..Z }),
    },
    TraitRule {
        owner: "Ziggs",
        name: "Turret Defense",
        summary: "Late +3 and late-game win weighting",
        difficulty: Difficulty::Easy,
        predicate: |_| true,
        effect: |_| TraitEffect::Adjust {
            ally: StatDelta { late: 3.0, ..Z },
            enemy: Z,
            bonus: TraitBonus { late: 3.0, late_bias: 1.0, ..TraitBonus::default() },
        },
    },
    TraitRule {
        owner: "Azir",
        name: "Shurima Shuffle",
        summary: "Anti +3 against a dive composition",
        difficulty: Difficulty::Medium,
        predicate: |c| {
            let (archetype, value) = c.enemy().dominant_archetype();
            archetype == Archetype::Dive && value > 0.0
        },
        effect: |_| TraitEffect::ally(StatDelta { anti: 3.0, ..Z }),
    },
    TraitRule {
        owner: "Blitzcrank",
        name: "Got One",
        summary: "Damage +6 against a poke bot lane",
        difficulty: Difficulty::Hard,
        predicate: |c| {
            let adc = c.enemy_at(Position::Adc);
            let support = c.enemy_at(Position::Support);
            adc.is_some_and(|a| a.archetype == Archetype::Poke)
                && support.is_some_and(|s| s.archetype == Archetype::Poke)
        },
        effect: |_| TraitEffect::ally(StatDelta { damage: 6.0, ..Z }),
    },
    TraitRule {
        owner: "Ornn",
        name: "Forge on the Go",
        summary: "Damage/Tank/CC +3, Late +4",
        difficulty: Difficulty::Easy,
        predicate: |_| true,
        effect: |_| TraitEffect::ally(StatDelta { damage: 3.0, tank: 3.0, cc: 3.0, late: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Gangplank",
        name: "Powder Keg",
        summary: "Damage +7 with an even AD/AP split",
        difficulty: Difficulty::Hard,
        predicate: |c| (c.ally().ad_ratio - 0.5).abs() <= 0.05,
        effect: |_| TraitEffect::ally(StatDelta { damage: 7.0, ..Z }),
    },
    TraitRule {
        owner: "Yasuo",
        name: "Knock-Up Wanted",
        summary: "Damage +7 when team CC reaches 10",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally().cc >= 10.0,
        effect: |_| TraitEffect::ally(StatDelta { damage: 7.0, ..Z }),
    },
    TraitRule {
        owner: "Lissandra",
        name: "Frozen Tomb",
        summary: "CC +2 against a dive mid",
        difficulty: Difficulty::Medium,
        predicate: |c| {
            c.enemy_at(Position::Mid)
                .is_some_and(|m| m.archetype == Archetype::Dive)
        },
        effect: |_| TraitEffect::ally(StatDelta { cc: 2.0, ..Z }),
    },
    TraitRule {
        owner: "Zilean",
        name: "Time Rewind",
        summary: "Swap early and late strength",
        difficulty: Difficulty::Easy,
        predicate: |_| true,
        effect: |_| TraitEffect::SwapEarlyLate,
    },
    TraitRule {
        owner: "Orianna",
        name: "Ball Delivery",
        summary: "Damage +3 plus the dive jungler's intensity",
        difficulty: Difficulty::Medium,
        predicate: |c| {
            c.ally_at(Position::Jungle)
                .is_some_and(|j| j.archetype == Archetype::Dive)
        },
        effect: |c| {
            let intensity = c.ally_at(Position::Jungle).map_or(0.0, |j| j.intensity as f64);
            TraitEffect::ally(StatDelta { damage: 3.0 + intensity, ..Z })
        },
    },
    TraitRule {
        owner: "Smolder",
        name: "Twin Cannons",
        summary: "Mid +4 with Ziggs bot",
        difficulty: Difficulty::Hard,
        predicate: |c| c.ally_at_is(Position::Adc, &["Ziggs"]),
        effect: |_| TraitEffect::ally(StatDelta { mid: 4.0, ..Z }),
    },
    TraitRule {
        owner: "Galio",
        name: "Anti-Magic",
        summary: "Early +3 against an AP mid",
        difficulty: Difficulty::Medium,
        predicate: |c| {
            c.enemy_at(Position::Mid)
                .is_some_and(|m| m.damage_type == DamageType::Magic)
        },
        effect: |_| TraitEffect::ally(StatDelta { early: 3.0, ..Z }),
    },
];

/// The full rule table in evaluation order.
pub fn trait_rules() -> &'static [TraitRule] {
    TRAIT_RULES
}

pub fn trait_count_for(key: &str) -> usize {
    TRAIT_RULES.iter().filter(|r| r.owner == key).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveTrait {
    pub owner: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitResult {
    pub stats: PerSide<TeamStats>,
    pub active: PerSide<Vec<ActiveTrait>>,
    pub bonuses: PerSide<TraitBonus>,
}

/// Aggregate both sides and run every rule whose owner is picked.
pub fn evaluate_traits(catalog: &Catalog, slates: &PerSide<TeamSlate>) -> TraitResult {
    let picks = PerSide::from_fn(|side| slates[side].picked_keys());
    let roles = PerSide::from_fn(|side| assign_positions(catalog, &picks[side]));
    let mut stats = PerSide::from_fn(|side| compute_team_stats(catalog, picks[side].iter().copied()));
    let mut active: PerSide<Vec<ActiveTrait>> = PerSide::default();
    let mut bonuses: PerSide<TraitBonus> = PerSide::default();

    for side in Side::BOTH {
        for rule in TRAIT_RULES {
            if !picks[side].contains(&rule.owner) {
                continue;
            }
            let effect = {
                let ctx = RuleCtx {
                    catalog,
                    side,
                    stats: &stats,
                    picks: &picks,
                    roles: &roles,
                };
                if !(rule.predicate)(&ctx) {
                    continue;
                }
                (rule.effect)(&ctx)
            };

            let scale = rule.difficulty.scale();
            match effect {
                TraitEffect::Adjust { ally, enemy, bonus } => {
                    ally.scaled(&scale).apply_to(&mut stats[side]);
                    enemy.scaled(&scale).apply_to(&mut stats[side.opponent()]);
                    bonuses[side].add(&bonus.scaled(&scale));
                }
                TraitEffect::SwapEarlyLate => {
                    let team = &mut stats[side];
                    std::mem::swap(&mut team.early, &mut team.late);
                }
            }
            active[side].push(ActiveTrait {
                owner: rule.owner,
                name: rule.name,
                summary: rule.summary,
            });
        }
    }

    stats.blue.clamp_non_negative();
    stats.red.clamp_non_negative();

    TraitResult {
        stats,
        active,
        bonuses,
    }
}
