//! Knockout bracket between organizations: Bo1 quarterfinals, then Bo3 and
//! Bo5 with per-team fearless locks.

use crate::analysis::evaluator::{DraftEvaluation, DraftEvaluator};
use crate::analysis::recommender::{AiConfig, DraftRecommender};
use crate::draft::series::{roll_winner, FearlessRule, Series, SeriesMode, SeriesRecord, Team};
use crate::draft::state::DraftState;
use crate::error::{AppError, DraftError};
use crate::model::champion::Catalog;
use crate::model::team::{OrgProfile, PerSide, Side};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub label: &'static str,
    pub mode: SeriesMode,
    pub fearless: FearlessRule,
}

pub const STAGES: [Stage; 3] = [
    Stage {
        label: "Quarterfinals",
        mode: SeriesMode::Single,
        fearless: FearlessRule::Off,
    },
    Stage {
        label: "Semifinals",
        mode: SeriesMode::Bo3,
        fearless: FearlessRule::PerTeam,
    },
    Stage {
        label: "Final",
        mode: SeriesMode::Bo5,
        fearless: FearlessRule::PerTeam,
    },
];

/// The closing stages a bracket of `teams` entrants plays.
pub fn stages_for(teams: usize) -> Result<&'static [Stage], AppError> {
    match teams {
        2 => Ok(&STAGES[2..]),
        4 => Ok(&STAGES[1..]),
        8 => Ok(&STAGES[..]),
        n => Err(AppError::ConfigError(format!(
            "A bracket needs 2, 4 or 8 teams, got {}",
            n
        ))),
    }
}

/// One AI-vs-AI game without series context.
#[derive(Debug, Clone)]
pub struct ExhibitionGame {
    pub draft: DraftState,
    pub evaluation: DraftEvaluation,
    pub winner: Side,
}

/// Draft a single game between two (optional) orgs and roll its outcome.
pub fn play_exhibition<R: Rng + ?Sized>(
    catalog: &Catalog,
    orgs: PerSide<Option<&OrgProfile>>,
    ai: AiConfig,
    rng: &mut R,
) -> Result<ExhibitionGame, DraftError> {
    let evaluator = DraftEvaluator::new(catalog).with_orgs(orgs);
    let draft = DraftRecommender::new(evaluator, ai).play_out(DraftState::new())?;
    let evaluation = evaluator.evaluate(&draft.slates);
    let winner = roll_winner(evaluation.blue_win, rng);
    Ok(ExhibitionGame {
        draft,
        evaluation,
        winner,
    })
}

/// Two distinct orgs on random sides, or no orgs when fewer than two exist.
pub fn random_pairing<'a, R: Rng + ?Sized>(
    orgs: &'a [OrgProfile],
    rng: &mut R,
) -> PerSide<Option<&'a OrgProfile>> {
    if orgs.len() < 2 {
        return PerSide::default();
    }
    let picked: Vec<&OrgProfile> = orgs.choose_multiple(rng, 2).collect();
    if rng.gen_bool(0.5) {
        PerSide::new(Some(picked[0]), Some(picked[1]))
    } else {
        PerSide::new(Some(picked[1]), Some(picked[0]))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    /// Team on blue for every game of the match.
    pub blue_team: String,
    pub red_team: String,
    pub winner: String,
    pub series: SeriesRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub stage: Stage,
    pub matches: Vec<MatchRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentRecord {
    pub rounds: Vec<RoundRecord>,
    pub champion: String,
}

/// Play one match. The blue org is the home team and both keep their sides.
pub fn play_match<R: Rng + ?Sized>(
    catalog: &Catalog,
    stage: Stage,
    blue: &OrgProfile,
    red: &OrgProfile,
    ai: AiConfig,
    rng: &mut R,
) -> Result<MatchRecord, DraftError> {
    let mut series = Series::with_rule(stage.mode, Side::Blue, stage.fearless);
    while !series.is_over() {
        let orgs = match series.home_side() {
            Side::Blue => PerSide::new(Some(blue), Some(red)),
            Side::Red => PerSide::new(Some(red), Some(blue)),
        };
        let evaluator = DraftEvaluator::new(catalog).with_orgs(orgs);
        let draft = DraftRecommender::new(evaluator, ai).play_out(series.next_draft())?;
        let blue_win = evaluator.evaluate(&draft.slates).blue_win;
        series.record_game(&draft, blue_win, rng);
    }

    let record = series.finish();
    let winner = match record.winner {
        Some(Team::Away) => red,
        _ => blue,
    };
    let score = format!("{}:{}", record.home_wins, record.away_wins);
    info!(
        stage = stage.label,
        blue = %blue.name,
        red = %red.name,
        score = %score,
        winner = %winner.name,
        "match finished"
    );
    Ok(MatchRecord {
        blue_team: blue.name.clone(),
        red_team: red.name.clone(),
        winner: winner.name.clone(),
        series: record,
    })
}

/// Run the bracket to a champion. Each round reshuffles the survivors and
/// flips a coin for sides.
pub fn run_tournament<R: Rng + ?Sized>(
    catalog: &Catalog,
    orgs: &[OrgProfile],
    ai: AiConfig,
    rng: &mut R,
) -> Result<TournamentRecord, AppError> {
    let stages = stages_for(orgs.len())?;
    let mut alive: Vec<&OrgProfile> = orgs.iter().collect();
    let mut rounds = Vec::with_capacity(stages.len());

    for stage in stages {
        alive.shuffle(rng);
        let mut matches = Vec::with_capacity(alive.len() / 2);
        let mut winners = Vec::with_capacity(alive.len() / 2);
        for pair in alive.chunks(2) {
            let [a, b] = pair else {
                continue;
            };
            let (blue, red) = if rng.gen_bool(0.5) { (*a, *b) } else { (*b, *a) };
            let record = play_match(catalog, *stage, blue, red, ai, rng)?;
            winners.push(match record.series.winner {
                Some(Team::Away) => red,
                _ => blue,
            });
            matches.push(record);
        }
        rounds.push(RoundRecord {
            stage: *stage,
            matches,
        });
        alive = winners;
    }

    let champion = alive
        .first()
        .map(|org| org.name.clone())
        .ok_or_else(|| AppError::DataError("Bracket finished without a champion".to_string()))?;
    info!(champion = %champion, "tournament finished");
    Ok(TournamentRecord { rounds, champion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_catalog, demo_orgs};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fast_ai() -> AiConfig {
        AiConfig {
            shortlist_pick: 2,
            shortlist_ban: 2,
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_stage_selection_by_bracket_size() {
        assert_eq!(stages_for(8).unwrap().len(), 3);
        assert_eq!(stages_for(4).unwrap()[0].label, "Semifinals");
        assert_eq!(stages_for(2).unwrap()[0].mode, SeriesMode::Bo5);
        assert!(matches!(stages_for(6), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_random_pairing_uses_distinct_orgs() {
        let catalog = demo_catalog();
        let orgs = demo_orgs(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..10 {
            let pair = random_pairing(&orgs, &mut rng);
            let (blue, red) = (pair.blue.unwrap(), pair.red.unwrap());
            assert_ne!(blue.id, red.id);
        }
        assert_eq!(random_pairing(&orgs[..1], &mut rng), PerSide::default());
    }

    #[test]
    fn test_semifinal_avoids_own_repicks() {
        let catalog = demo_catalog();
        let orgs = demo_orgs(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let record = play_match(&catalog, STAGES[1], &orgs[0], &orgs[1], fast_ai(), &mut rng).unwrap();

        let series = &record.series;
        assert!(series.games.len() >= 2 && series.games.len() <= 3);
        assert_eq!(series.home_wins.max(series.away_wins), 2);
        for side in Side::BOTH {
            let mut seen = std::collections::BTreeSet::new();
            for game in &series.games {
                assert_eq!(game.home_side, Side::Blue);
                for key in game.slates[side].picked_keys() {
                    assert!(seen.insert(key.to_string()), "{} repicked {}", side, key);
                }
            }
        }
    }

    #[test]
    fn test_tournament_is_reproducible() {
        let catalog = demo_catalog();
        let orgs = demo_orgs(&catalog);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            run_tournament(&catalog, &orgs[..4], fast_ai(), &mut rng).unwrap()
        };
        let first = run(8);
        let second = run(8);
        assert_eq!(first.rounds.len(), 2);
        assert_eq!(first.rounds[0].matches.len(), 2);
        assert_eq!(first.rounds[1].matches.len(), 1);
        assert_eq!(first.champion, first.rounds[1].matches[0].winner);
        let strip = |t: &TournamentRecord| -> Vec<String> {
            t.rounds
                .iter()
                .flat_map(|r| r.matches.iter().map(|m| format!("{}>{}", m.winner, m.series.games.len())))
                .collect()
        };
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(first.champion, second.champion);
    }
}
