//! Full evaluation of a draft: traits, strategy, organization affinity and
//! the win model, composed in that order.

use crate::analysis::strategy::{
    apply_org_affinity, apply_strategy, OrgResult, StrategyEffect, StrategySelection,
};
use crate::analysis::team_stats::TeamStats;
use crate::analysis::traits::{evaluate_traits, TraitResult};
use crate::analysis::win_rate::{clamp_percent, compute_win_rate, project_phases, PhaseProjection, WinBreakdown};
use crate::model::champion::Catalog;
use crate::model::team::{OrgProfile, PerSide, Side, TeamSlate};
use serde::Serialize;

const ORG_WEIGHT: f64 = 1.15;
const LATE_BIAS_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftEvaluation {
    pub blue_win: f64,
    pub phases: PhaseProjection,
    pub breakdown: WinBreakdown,
    /// Stats after every bonus layer.
    pub stats: PerSide<TeamStats>,
    pub traits: TraitResult,
    pub strategy: Option<StrategyEffect>,
    pub org: OrgResult,
}

impl DraftEvaluation {
    pub fn perspective(&self, side: Side) -> f64 {
        side.perspective(self.blue_win)
    }
}

/// Scores slates against a fixed catalog and bonus configuration.
#[derive(Debug, Clone, Copy)]
pub struct DraftEvaluator<'a> {
    pub catalog: &'a Catalog,
    pub strategy: Option<StrategySelection>,
    pub orgs: PerSide<Option<&'a OrgProfile>>,
}

impl<'a> DraftEvaluator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        DraftEvaluator {
            catalog,
            strategy: None,
            orgs: PerSide::new(None, None),
        }
    }

    pub fn with_strategy(mut self, selection: StrategySelection) -> Self {
        self.strategy = Some(selection);
        self
    }

    pub fn with_orgs(mut self, orgs: PerSide<Option<&'a OrgProfile>>) -> Self {
        self.orgs = orgs;
        self
    }

    pub fn evaluate(&self, slates: &PerSide<TeamSlate>) -> DraftEvaluation {
        let traits = evaluate_traits(self.catalog, slates);

        let (stats, strategy) = match self.strategy {
            Some(selection) => {
                let result = apply_strategy(self.catalog, slates, &traits.stats, selection);
                (result.stats, Some(result.effect))
            }
            None => (traits.stats.clone(), None),
        };

        let org = apply_org_affinity(self.catalog, slates, &stats, self.orgs);
        let stats = org.stats.clone();

        let details = compute_win_rate(&stats.blue, &stats.red);
        let strategy_edge = strategy.map_or(0.0, |effect| match effect.side {
            Side::Blue => effect.win_bonus,
            Side::Red => -effect.win_bonus,
        });
        let trait_edge = traits.bonuses.blue.win - traits.bonuses.red.win;
        let org_edge = (org.bonus.blue - org.bonus.red) * ORG_WEIGHT;
        let blue_win = clamp_percent(details.blue_win + trait_edge + strategy_edge + org_edge);

        let raw = project_phases(&stats.blue, &stats.red, blue_win);
        let (b, r) = (&traits.bonuses.blue, &traits.bonuses.red);
        let phases = PhaseProjection {
            early: clamp_percent(raw.early + (b.early - r.early)),
            mid: clamp_percent(raw.mid + (b.mid - r.mid)),
            late: clamp_percent(
                raw.late + (b.late - r.late) + (b.late_bias - r.late_bias) * LATE_BIAS_WEIGHT,
            ),
        };

        DraftEvaluation {
            blue_win,
            phases,
            breakdown: details.breakdown,
            stats,
            traits,
            strategy,
            org,
        }
    }

    pub fn perspective(&self, slates: &PerSide<TeamSlate>, side: Side) -> f64 {
        self.evaluate(slates).perspective(side)
    }
}
