//! Trigger statistics for the trait table, gathered from sampled drafts,
//! and the buff/nerf hints derived from them.

use crate::analysis::traits::{evaluate_traits, trait_rules, TraitResult};
use crate::analysis::win_rate::{clamp_percent, compute_win_rate};
use crate::draft::series::roll_winner;
use crate::model::champion::{Catalog, Position};
use crate::model::team::{PerSide, Side, TeamSlate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Rules seen fewer times than this are left out of reports.
pub const DEFAULT_MIN_OPPORTUNITY: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TraitTally {
    /// Games where the owner was picked.
    pub opportunities: usize,
    pub activations: usize,
    pub wins_when_active: usize,
    /// Sum of the owner side's win-percentage edge over 50 when active.
    pub win_edge_sum: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TraitAnalytics {
    pub total_games: usize,
    pub auto_samples: usize,
    by_rule: BTreeMap<(&'static str, &'static str), TraitTally>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitBalanceRow {
    pub owner: &'static str,
    pub name: &'static str,
    pub opportunities: usize,
    pub activations: usize,
    /// Percent of opportunities where the rule fired.
    pub activation_rate: f64,
    /// Percent of activations that ended in a win.
    pub active_win_rate: f64,
    pub avg_win_edge: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestion {
    Keep,
    Nerf,
    MinorNerf,
    /// Loosen the condition or raise the payoff.
    Buff,
    MinorBuff,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Keep => write!(f, "keep"),
            Suggestion::Nerf => write!(f, "nerf"),
            Suggestion::MinorNerf => write!(f, "minor nerf"),
            Suggestion::Buff => write!(f, "relax / buff"),
            Suggestion::MinorBuff => write!(f, "minor buff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceRow {
    #[serde(flatten)]
    pub row: TraitBalanceRow,
    pub suggestion: Suggestion,
}

pub fn suggest(row: &TraitBalanceRow) -> Suggestion {
    if row.activation_rate >= 45.0 && row.avg_win_edge >= 7.0 {
        Suggestion::Nerf
    } else if row.activation_rate <= 18.0 && row.avg_win_edge <= -4.0 {
        Suggestion::Buff
    } else if row.active_win_rate >= 62.0 && row.avg_win_edge >= 5.0 {
        Suggestion::MinorNerf
    } else if row.active_win_rate <= 43.0 && row.avg_win_edge <= -3.0 {
        Suggestion::MinorBuff
    } else {
        Suggestion::Keep
    }
}

/// Fill each role in order, blue then red, with a random unused champion
/// that can play it. Roles with no candidate stay empty.
pub fn random_sample_draft<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> PerSide<TeamSlate> {
    let mut used: BTreeSet<&str> = BTreeSet::new();
    let mut slates: PerSide<TeamSlate> = PerSide::default();
    for (slot, position) in Position::ALL.iter().enumerate() {
        for side in Side::BOTH {
            let pool: Vec<&str> = catalog
                .champions()
                .filter(|c| c.can_play(*position) && !used.contains(c.key.as_str()))
                .map(|c| c.key.as_str())
                .collect();
            if let Some(&key) = pool.choose(rng) {
                used.insert(key);
                slates[side].picks[slot] = Some(key.to_string());
            }
        }
    }
    slates
}

impl TraitAnalytics {
    pub fn new() -> Self {
        TraitAnalytics::default()
    }

    pub fn tally(&self, owner: &str, name: &str) -> Option<&TraitTally> {
        self.by_rule
            .iter()
            .find(|((o, n), _)| *o == owner && *n == name)
            .map(|(_, tally)| tally)
    }

    /// Count one finished game.
    pub fn record_sample(
        &mut self,
        slates: &PerSide<TeamSlate>,
        traits: &TraitResult,
        winner: Side,
        blue_win: f64,
        auto: bool,
    ) {
        for side in Side::BOTH {
            let picked = slates[side].picked_keys();
            for rule in trait_rules().iter().filter(|r| picked.contains(&r.owner)) {
                self.by_rule.entry((rule.owner, rule.name)).or_default().opportunities += 1;
            }
            let edge = side.perspective(blue_win) - 50.0;
            for active in &traits.active[side] {
                let tally = self.by_rule.entry((active.owner, active.name)).or_default();
                tally.activations += 1;
                tally.win_edge_sum += edge;
                if winner == side {
                    tally.wins_when_active += 1;
                }
            }
        }
        self.total_games += 1;
        if auto {
            self.auto_samples += 1;
        }
    }

    /// Score `count` random drafts on traits and the base model only.
    pub fn run_auto_sample<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R, count: usize) {
        for _ in 0..count {
            let slates = random_sample_draft(catalog, rng);
            let traits = evaluate_traits(catalog, &slates);
            let base = compute_win_rate(&traits.stats.blue, &traits.stats.red).blue_win;
            let blue_win = clamp_percent(base + traits.bonuses.blue.win - traits.bonuses.red.win);
            let winner = roll_winner(blue_win, rng);
            self.record_sample(&slates, &traits, winner, blue_win, true);
        }
    }

    /// Top up automatic samples to `target`.
    pub fn ensure_auto_samples<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R, target: usize) {
        if self.auto_samples < target {
            self.run_auto_sample(catalog, rng, target - self.auto_samples);
        }
    }

    /// Rules with enough opportunities, strongest average edge first.
    pub fn balance_report(&self, min_opportunity: usize) -> Vec<TraitBalanceRow> {
        let mut rows: Vec<TraitBalanceRow> = self
            .by_rule
            .iter()
            .filter(|(_, t)| t.opportunities >= min_opportunity)
            .map(|((owner, name), t)| {
                let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
                TraitBalanceRow {
                    owner: *owner,
                    name: *name,
                    opportunities: t.opportunities,
                    activations: t.activations,
                    activation_rate: ratio(t.activations, t.opportunities) * 100.0,
                    active_win_rate: ratio(t.wins_when_active, t.activations) * 100.0,
                    avg_win_edge: if t.activations > 0 {
                        t.win_edge_sum / t.activations as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.avg_win_edge
                .partial_cmp(&a.avg_win_edge)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }

    pub fn rebalance_suggestions(&self, min_opportunity: usize) -> Vec<RebalanceRow> {
        self.balance_report(min_opportunity)
            .into_iter()
            .map(|row| RebalanceRow {
                suggestion: suggest(&row),
                row,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::positions::assign_positions;
    use crate::test_support::{demo_catalog, slates};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn row(activation_rate: f64, active_win_rate: f64, avg_win_edge: f64) -> TraitBalanceRow {
        TraitBalanceRow {
            owner: "Ornn",
            name: "Forge on the Go",
            opportunities: 40,
            activations: 20,
            activation_rate,
            active_win_rate,
            avg_win_edge,
        }
    }

    #[test]
    fn test_sample_draft_fills_every_role() {
        let catalog = demo_catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let sample = random_sample_draft(&catalog, &mut rng);
        let mut seen = BTreeSet::new();
        for side in Side::BOTH {
            let picked = sample[side].picked_keys();
            assert_eq!(picked.len(), 5);
            for (slot, position) in Position::ALL.iter().enumerate() {
                let key = sample[side].picks[slot].as_deref().unwrap();
                assert!(catalog.get(key).unwrap().can_play(*position));
                assert!(seen.insert(key.to_string()), "{} drawn twice", key);
            }
            assert!(assign_positions(&catalog, &picked).complete);
        }
    }

    #[test]
    fn test_record_counts_opportunity_and_activation() {
        let catalog = demo_catalog();
        let s = slates(&["Ornn", "Blitzcrank"], &["Ahri"]);
        let traits = evaluate_traits(&catalog, &s);
        let mut analytics = TraitAnalytics::new();
        analytics.record_sample(&s, &traits, Side::Red, 40.0, false);

        let ornn = analytics.tally("Ornn", "Forge on the Go").unwrap();
        assert_eq!((ornn.opportunities, ornn.activations, ornn.wins_when_active), (1, 1, 0));
        assert!((ornn.win_edge_sum + 10.0).abs() < 1e-9);

        // Blitzcrank was picked but red has no bot lane.
        let blitz = analytics.tally("Blitzcrank", "Got One").unwrap();
        assert_eq!((blitz.opportunities, blitz.activations), (1, 0));
        assert_eq!(analytics.total_games, 1);
        assert_eq!(analytics.auto_samples, 0);
    }

    #[test]
    fn test_auto_sample_is_seeded_and_filtered() {
        let catalog = demo_catalog();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut analytics = TraitAnalytics::new();
            analytics.ensure_auto_samples(&catalog, &mut rng, 60);
            analytics.ensure_auto_samples(&catalog, &mut rng, 40);
            analytics
        };
        let first = run(13);
        assert_eq!(first.auto_samples, 60);
        assert_eq!(first.total_games, 60);
        assert_eq!(first.balance_report(0), run(13).balance_report(0));

        let report = first.balance_report(5);
        assert!(report.iter().all(|r| r.opportunities >= 5));
        assert!(report.iter().all(|r| r.activation_rate <= 100.0));
        for pair in report.windows(2) {
            assert!(pair[0].avg_win_edge >= pair[1].avg_win_edge);
        }
        assert!(first.balance_report(usize::MAX).is_empty());
    }

    #[test]
    fn test_suggestion_thresholds() {
        assert_eq!(suggest(&row(45.0, 50.0, 7.0)), Suggestion::Nerf);
        assert_eq!(suggest(&row(18.0, 50.0, -4.0)), Suggestion::Buff);
        assert_eq!(suggest(&row(30.0, 62.0, 5.0)), Suggestion::MinorNerf);
        assert_eq!(suggest(&row(30.0, 43.0, -3.0)), Suggestion::MinorBuff);
        assert_eq!(suggest(&row(50.0, 55.0, 4.0)), Suggestion::Keep);
        // A strong, common rule is a full nerf even with a high win rate.
        assert_eq!(suggest(&row(60.0, 70.0, 9.0)), Suggestion::Nerf);
    }
}
