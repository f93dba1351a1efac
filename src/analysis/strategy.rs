//! Style preferences layered on top of trait-adjusted stats.
//!
//! Two independent layers share the same fit/mismatch classification: the
//! strategy a user selects for one side, and the preferred style of an
//! organization profile (plus its players' signature champions).

use crate::analysis::positions::assign_positions;
use crate::analysis::team_stats::TeamStats;
use crate::model::champion::{Archetype, Catalog, Champion, Phase, Position};
use crate::model::team::{OrgProfile, PerSide, Side, TeamSlate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    #[default]
    General,
    Dive,
    Poke,
    Anti,
    Early,
    Late,
    Mid,
}

impl Style {
    pub const ALL: [Style; 7] = [
        Style::General,
        Style::Dive,
        Style::Poke,
        Style::Anti,
        Style::Early,
        Style::Late,
        Style::Mid,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "general" | "none" => Some(Style::General),
            "dive" => Some(Style::Dive),
            "poke" => Some(Style::Poke),
            "anti" => Some(Style::Anti),
            "early" => Some(Style::Early),
            "late" => Some(Style::Late),
            "mid" => Some(Style::Mid),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Style::General => "General",
            Style::Dive => "Dive",
            Style::Poke => "Poke",
            Style::Anti => "Anti",
            Style::Early => "Early Game",
            Style::Late => "Late Game",
            Style::Mid => "Mid Game",
        }
    }

    pub fn archetype(self) -> Option<Archetype> {
        match self {
            Style::Dive => Some(Archetype::Dive),
            Style::Poke => Some(Archetype::Poke),
            Style::Anti => Some(Archetype::Anti),
            _ => None,
        }
    }

    pub fn phase(self) -> Option<Phase> {
        match self {
            Style::Early => Some(Phase::Early),
            Style::Mid => Some(Phase::Mid),
            Style::Late => Some(Phase::Late),
            _ => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitState {
    Fit,
    Neutral,
    Mismatch,
}

impl FitState {
    pub fn signum(self) -> f64 {
        match self {
            FitState::Fit => 1.0,
            FitState::Neutral => 0.0,
            FitState::Mismatch => -1.0,
        }
    }
}

/// Classify a champion against a style.
///
/// Archetype styles are binary. Phase styles fit when that phase is the
/// champion's peak and mismatch when some other phase beats it by 2 or more.
pub fn fit_state(champion: &Champion, style: Style) -> FitState {
    if let Some(archetype) = style.archetype() {
        return if champion.archetype == archetype {
            FitState::Fit
        } else {
            FitState::Mismatch
        };
    }
    let Some(phase) = style.phase() else {
        return FitState::Neutral;
    };
    let own = champion.curve.get(phase);
    let peak = champion.curve.peak_value();
    if own == peak {
        FitState::Fit
    } else if peak >= own + 2 {
        FitState::Mismatch
    } else {
        FitState::Neutral
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Weight {
    fit: f64,
    miss: f64,
}

const fn w(fit: f64, miss: f64) -> Weight {
    Weight { fit, miss }
}

impl Weight {
    fn of(self, fit: f64, mismatch: f64) -> f64 {
        fit * self.fit - mismatch * self.miss
    }
}

/// Per-field weights applied to fit and mismatch counts.
#[derive(Debug, Clone, Copy, Default)]
struct StyleWeights {
    archetype: Weight,
    cc: Weight,
    damage: Weight,
    tank: Weight,
    early: Weight,
    mid: Weight,
    late: Weight,
    win: Weight,
}

impl StyleWeights {
    fn for_strategy(style: Style) -> Self {
        match style {
            Style::General => StyleWeights::default(),
            Style::Dive | Style::Poke | Style::Anti => StyleWeights {
                archetype: w(1.4, 0.0),
                damage: w(0.9, 1.2),
                tank: w(0.5, 1.0),
                early: w(0.8, 1.0),
                mid: w(0.4, 0.7),
                late: w(0.4, 0.7),
                win: w(2.8, 3.4),
                ..StyleWeights::default()
            },
            Style::Early => StyleWeights {
                early: w(2.5, 2.7),
                mid: w(0.8, 1.1),
                damage: w(1.0, 0.9),
                tank: w(0.4, 0.8),
                win: w(3.2, 3.8),
                ..StyleWeights::default()
            },
            Style::Late => StyleWeights {
                late: w(2.5, 2.7),
                mid: w(0.9, 1.0),
                tank: w(1.1, 0.9),
                damage: w(0.8, 0.7),
                win: w(3.2, 3.8),
                ..StyleWeights::default()
            },
            Style::Mid => StyleWeights {
                mid: w(2.5, 2.7),
                early: w(0.6, 0.8),
                late: w(0.6, 0.8),
                damage: w(0.9, 0.8),
                win: w(3.2, 3.8),
                ..StyleWeights::default()
            },
        }
    }

    fn for_org(style: Style) -> Self {
        match style {
            Style::General => StyleWeights::default(),
            Style::Dive | Style::Poke | Style::Anti => StyleWeights {
                archetype: w(1.2, 0.0),
                damage: w(0.5, 0.5),
                tank: w(0.3, 0.0),
                mid: w(0.6, 0.0),
                win: w(1.4, 1.4),
                ..StyleWeights::default()
            },
            Style::Early => StyleWeights {
                early: w(2.0, 1.6),
                mid: w(0.6, 0.6),
                damage: w(0.6, 0.4),
                win: w(1.7, 1.5),
                ..StyleWeights::default()
            },
            Style::Late => StyleWeights {
                late: w(2.0, 1.6),
                tank: w(0.8, 0.4),
                damage: w(0.4, 0.4),
                win: w(1.7, 1.5),
                ..StyleWeights::default()
            },
            Style::Mid => StyleWeights {
                mid: w(2.0, 1.6),
                cc: w(0.4, 0.0),
                damage: w(0.4, 0.4),
                win: w(1.7, 1.5),
                ..StyleWeights::default()
            },
        }
    }

    /// Adjust `stats` in place and return the win bonus.
    fn apply(&self, style: Style, stats: &mut TeamStats, fit: u32, mismatch: u32) -> f64 {
        let (f, m) = (fit as f64, mismatch as f64);
        if let Some(archetype) = style.archetype() {
            *stats.archetype_value_mut(archetype) += self.archetype.of(f, m);
        }
        stats.cc += self.cc.of(f, m);
        stats.damage += self.damage.of(f, m);
        stats.tank += self.tank.of(f, m);
        stats.early += self.early.of(f, m);
        stats.mid += self.mid.of(f, m);
        stats.late += self.late.of(f, m);
        self.win.of(f, m)
    }
}

/// The user's chosen style and the side it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySelection {
    pub style: Style,
    pub focus: Side,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FitCounts {
    pub fit: u32,
    pub mismatch: u32,
    pub neutral: u32,
}

impl FitCounts {
    fn tally<'a>(champions: impl IntoIterator<Item = &'a Champion>, style: Style) -> Self {
        let mut counts = FitCounts::default();
        for champion in champions {
            match fit_state(champion, style) {
                FitState::Fit => counts.fit += 1,
                FitState::Mismatch => counts.mismatch += 1,
                FitState::Neutral => counts.neutral += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyEffect {
    pub side: Side,
    pub style: Style,
    pub counts: FitCounts,
    pub win_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    pub stats: PerSide<TeamStats>,
    pub effect: StrategyEffect,
}

pub fn apply_strategy(
    catalog: &Catalog,
    slates: &PerSide<TeamSlate>,
    stats: &PerSide<TeamStats>,
    selection: StrategySelection,
) -> StrategyResult {
    let mut stats = stats.clone();
    let side = selection.focus;
    let champions = slates[side]
        .picked_keys()
        .into_iter()
        .filter_map(|key| catalog.get(key));

    let counts = if selection.style == Style::General {
        FitCounts {
            neutral: champions.count() as u32,
            ..FitCounts::default()
        }
    } else {
        FitCounts::tally(champions, selection.style)
    };

    let weights = StyleWeights::for_strategy(selection.style);
    let win_bonus = weights.apply(selection.style, &mut stats[side], counts.fit, counts.mismatch);
    stats[side].clamp_non_negative();

    StrategyResult {
        stats,
        effect: StrategyEffect {
            side,
            style: selection.style,
            counts,
            win_bonus,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgResult {
    pub stats: PerSide<TeamStats>,
    pub bonus: PerSide<f64>,
    pub details: PerSide<Vec<String>>,
}

/// Apply each side's organization style and roster signatures.
///
/// Sides without a profile pass through unchanged.
pub fn apply_org_affinity(
    catalog: &Catalog,
    slates: &PerSide<TeamSlate>,
    stats: &PerSide<TeamStats>,
    orgs: PerSide<Option<&OrgProfile>>,
) -> OrgResult {
    let mut stats = stats.clone();
    let mut bonus = PerSide::new(0.0, 0.0);
    let mut details: PerSide<Vec<String>> = PerSide::default();

    for side in Side::BOTH {
        let Some(org) = orgs[side] else {
            continue;
        };
        let assignment = assign_positions(catalog, &slates[side].picked_keys());
        let team = &mut stats[side];
        let mut assigned = Vec::new();

        for position in Position::ALL {
            let Some(champion) = assignment.at(position).and_then(|key| catalog.get(key)) else {
                continue;
            };
            assigned.push(champion);
            let Some(player) = org.player_at(position) else {
                continue;
            };
            if player.has_signature(&champion.key) {
                match champion.curve.peak_phase() {
                    Phase::Early => team.early += 1.6,
                    Phase::Mid => team.mid += 1.6,
                    Phase::Late => team.late += 1.6,
                }
                team.damage += 1.1;
                bonus[side] += 2.2;
                details[side].push(format!("{} signature ({})", player.nick, champion.name));
            }
        }

        if org.style != Style::General {
            let counts = FitCounts::tally(assigned, org.style);
            let weights = StyleWeights::for_org(org.style);
            bonus[side] += weights.apply(org.style, team, counts.fit, counts.mismatch);
            details[side].push(format!(
                "Team style ({}) fit {} / mismatch {}",
                org.style, counts.fit, counts.mismatch
            ));
        }
        team.clamp_non_negative();
        debug!(org = %org.id, side = %side, bonus = bonus[side], "applied org affinity");
    }

    OrgResult {
        stats,
        bonus,
        details,
    }
}

/// Draft heuristic for how much an organization wants `key`.
///
/// Players whose role the champion can play count fully; a signature held
/// only by an off-role player earns a flat bonus.
pub fn signature_bonus(catalog: &Catalog, org: Option<&OrgProfile>, key: &str) -> f64 {
    let (Some(org), Some(champion)) = (org, catalog.get(key)) else {
        return 0.0;
    };
    let mut any = false;
    let mut on_role = 0u32;
    for (position, player) in &org.roster {
        if !player.has_signature(key) {
            continue;
        }
        any = true;
        if champion.can_play(*position) {
            on_role += 1;
        }
    }
    if on_role > 0 {
        3.6 + on_role as f64 * 0.6
    } else if any {
        1.4
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::team_stats::compute_team_stats;
    use crate::test_support::{demo_catalog, demo_orgs, slates};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    fn base_stats(catalog: &Catalog, s: &PerSide<TeamSlate>) -> PerSide<TeamStats> {
        PerSide::from_fn(|side| compute_team_stats(catalog, s[side].picked_keys()))
    }

    #[test]
    fn test_style_parse_is_case_insensitive() {
        assert_eq!(Style::parse("LATE"), Some(Style::Late));
        assert_eq!(Style::parse(" none "), Some(Style::General));
        assert_eq!(Style::parse("turtle"), None);
    }

    #[test]
    fn test_fit_state_for_phase_styles() {
        let catalog = demo_catalog();
        // Jinx 4/7/10
        let jinx = catalog.get("Jinx").unwrap();
        assert_eq!(fit_state(jinx, Style::Late), FitState::Fit);
        assert_eq!(fit_state(jinx, Style::Early), FitState::Mismatch);
        assert_eq!(fit_state(jinx, Style::Mid), FitState::Mismatch);
        // Lux 6/7/7: mid ties the peak
        let lux = catalog.get("Lux").unwrap();
        assert_eq!(fit_state(lux, Style::Mid), FitState::Fit);
        assert_eq!(fit_state(lux, Style::Early), FitState::Neutral);
        assert_eq!(fit_state(lux, Style::General), FitState::Neutral);
        assert_eq!(fit_state(lux, Style::Poke), FitState::Fit);
        assert_eq!(fit_state(lux, Style::Dive), FitState::Mismatch);
    }

    #[test]
    fn test_general_strategy_changes_nothing() {
        let catalog = demo_catalog();
        let s = slates(&["Jinx", "Lux", "Ornn"], &["Ahri"]);
        let stats = base_stats(&catalog, &s);
        let result = apply_strategy(
            &catalog,
            &s,
            &stats,
            StrategySelection {
                style: Style::General,
                focus: Side::Blue,
            },
        );
        assert_eq!(result.stats, stats);
        assert_eq!(result.effect.counts.neutral, 3);
        assert_close(result.effect.win_bonus, 0.0);
    }

    #[test]
    fn test_mismatch_costs_more_than_fit_earns() {
        let catalog = demo_catalog();
        // Jinx and Vayne both peak late; Lee Sin peaks early.
        let s = slates(&["Jinx", "Vayne", "LeeSin"], &[]);
        let stats = base_stats(&catalog, &s);
        let result = apply_strategy(
            &catalog,
            &s,
            &stats,
            StrategySelection {
                style: Style::Late,
                focus: Side::Blue,
            },
        );
        assert_eq!(result.effect.counts.fit, 2);
        assert_eq!(result.effect.counts.mismatch, 1);
        assert_close(result.effect.win_bonus, 2.0 * 3.2 - 3.8);
        assert_close(result.stats.blue.late, stats.blue.late + 2.0 * 2.5 - 2.7);
        assert_eq!(result.stats.red, stats.red);
    }

    #[test]
    fn test_signature_bonus_prefers_on_role() {
        let catalog = demo_catalog();
        let orgs = demo_orgs(&catalog);
        let azure = orgs.iter().find(|o| o.id == "azure");
        assert_close(signature_bonus(&catalog, azure, "LeeSin"), 4.2);
        assert_close(signature_bonus(&catalog, azure, "Jinx"), 0.0);
        assert_close(signature_bonus(&catalog, None, "LeeSin"), 0.0);
    }

    #[test]
    fn test_org_affinity_rewards_signatures() {
        let catalog = demo_catalog();
        let orgs = demo_orgs(&catalog);
        let crimson = orgs.iter().find(|o| o.id == "crimson");
        // Crimson prefers late game; Ornn and Jinx are signatures and peak late.
        let s = slates(&["Ornn", "Jinx"], &["Ornn", "Jinx"]);
        let stats = base_stats(&catalog, &s);
        let result = apply_org_affinity(&catalog, &s, &stats, PerSide::new(crimson, None));

        assert_close(result.bonus.blue, 2.0 * 2.2 + 2.0 * 1.7);
        assert_close(result.bonus.red, 0.0);
        assert_eq!(result.details.blue.len(), 3);
        assert_close(result.stats.blue.damage, stats.blue.damage + 2.0 * 1.1 + 2.0 * 0.4);
        assert_close(result.stats.blue.late, stats.blue.late + 2.0 * 1.6 + 2.0 * 2.0);
        assert_eq!(result.stats.red, stats.red);
    }
}
