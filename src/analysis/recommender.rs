use crate::analysis::evaluator::DraftEvaluator;
use crate::analysis::positions::can_add_champion;
use crate::analysis::strategy::{fit_state, signature_bonus};
use crate::analysis::team_stats::compute_team_stats;
use crate::analysis::traits::trait_count_for;
use crate::draft::state::{apply_draft_action, legal_candidates, ActionKind, DraftState, DraftTurn};
use crate::error::DraftError;
use crate::model::team::Side;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, trace};

const SCORE_EPSILON: f64 = 1e-9;

/// Search limits and blend weights for the AI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AiConfig {
    pub shortlist_pick: usize,
    pub shortlist_ban: usize,
    pub immediate_weight: f64,
    pub response_weight: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            shortlist_pick: 18,
            shortlist_ban: 24,
            immediate_weight: 0.6,
            response_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub key: String,
    pub quick: f64,
    pub immediate: f64,
    pub worst_case: f64,
    pub score: f64,
}

impl Recommendation {
    pub fn new(key: String, quick: f64, immediate: f64, worst_case: f64, score: f64) -> Self {
        Recommendation {
            key,
            quick,
            immediate,
            worst_case,
            score,
        }
    }
}

fn by_score_then_key(a: (&str, f64), b: (&str, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

pub struct DraftRecommender<'a> {
    evaluator: DraftEvaluator<'a>,
    config: AiConfig,
}

impl<'a> DraftRecommender<'a> {
    pub fn new(evaluator: DraftEvaluator<'a>, config: AiConfig) -> Self {
        DraftRecommender { evaluator, config }
    }

    /// Fast pick heuristic:
    /// - raw power, weighted toward cc and damage
    /// - style fit when `side` carries the user's strategy
    /// - organization signature bonus
    /// - counter bonus against the enemy's dominant archetype
    pub fn quick_pick_score(&self, state: &DraftState, side: Side, key: &str) -> f64 {
        let catalog = self.evaluator.catalog;
        let Some(champion) = catalog.get(key) else {
            return f64::NEG_INFINITY;
        };
        let mut score = champion.damage as f64 * 1.35
            + champion.tank as f64 * 0.95
            + champion.cc as f64 * 1.5
            + champion.intensity as f64 * 1.2
            + champion.curve.mid as f64 * 0.35;

        if let Some(selection) = self.evaluator.strategy {
            if selection.focus == side {
                score += fit_state(champion, selection.style).signum() * 1.8;
            }
        }
        score += signature_bonus(catalog, self.evaluator.orgs[side], key);

        let enemy = compute_team_stats(catalog, state.slates[side.opponent()].picked_keys());
        let (enemy_type, enemy_value) = enemy.dominant_archetype();
        if champion.archetype.beats() == enemy_type {
            score += 2.0 + enemy_value * 0.3;
        } else if enemy_type.beats() == champion.archetype {
            score -= 1.4 + enemy_value * 0.2;
        }
        score
    }

    /// How dangerous `key` would be in the enemy's hands.
    pub fn ban_threat_score(&self, state: &DraftState, side: Side, key: &str) -> f64 {
        let catalog = self.evaluator.catalog;
        let enemy = side.opponent();
        let Some(champion) = catalog.get(key) else {
            return f64::NEG_INFINITY;
        };
        if !can_add_champion(catalog, &state.slates[enemy], key) {
            return f64::NEG_INFINITY;
        }
        champion.damage as f64 * 1.25
            + champion.tank as f64 * 0.65
            + champion.cc as f64 * 1.6
            + champion.intensity as f64 * 1.1
            + champion.curve.mid as f64 * 0.3
            + trait_count_for(key) as f64 * 0.8
            + signature_bonus(catalog, self.evaluator.orgs[enemy], key) * 1.2
    }

    /// `side`'s loss in win percentage if the enemy picked `key` next.
    fn threat_if_enemy_gets(&self, state: &DraftState, side: Side, key: &str) -> f64 {
        let enemy = side.opponent();
        let slate = &state.slates[enemy];
        if !can_add_champion(self.evaluator.catalog, slate, key) {
            return 0.0;
        }
        let Some(slot) = slate.first_open_pick() else {
            return 0.0;
        };
        let placed = state.with_slot(enemy, ActionKind::Pick, slot, key);
        100.0 - self.evaluator.perspective(&placed.slates, side)
    }

    /// The opponent's best achievable perspective on `response`.
    fn best_response(&self, state: &DraftState, response: DraftTurn) -> f64 {
        let candidates = legal_candidates(self.evaluator.catalog, state, response);
        if candidates.is_empty() {
            // No role-legal reply exists; the opponent keeps the current board.
            return self.evaluator.perspective(&state.slates, response.side);
        }
        let mut best = f64::NEG_INFINITY;
        for key in &candidates {
            let after = state.with_slot(response.side, response.action, response.slot, key);
            let value = self.evaluator.perspective(&after.slates, response.side);
            // candidates arrive in key order, so ties keep the earlier key
            if value > best + SCORE_EPSILON {
                best = value;
            }
        }
        best
    }

    fn shortlist(&self, state: &DraftState, turn: DraftTurn, candidates: Vec<String>) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = candidates
            .into_iter()
            .map(|key| {
                let quick = match turn.action {
                    ActionKind::Pick => self.quick_pick_score(state, turn.side, &key),
                    ActionKind::Ban => self.ban_threat_score(state, turn.side, &key),
                };
                (key, quick)
            })
            .collect();

        ranked.sort_by(|a, b| by_score_then_key((a.0.as_str(), a.1), (b.0.as_str(), b.1)));
        ranked.truncate(match turn.action {
            ActionKind::Pick => self.config.shortlist_pick,
            ActionKind::Ban => self.config.shortlist_ban,
        });
        ranked
    }

    /// Score the shortlist for the current turn with one ply of lookahead.
    /// Results are ordered best first.
    pub fn get_recommendations(&self, state: &DraftState) -> Result<Vec<Recommendation>, DraftError> {
        let turn = state.current_turn().ok_or(DraftError::DraftComplete)?;
        let candidates = legal_candidates(self.evaluator.catalog, state, turn);
        if candidates.is_empty() {
            return Err(DraftError::NoLegalCandidates { turn: state.turn });
        }
        let response = state.next_turn().filter(|next| next.side != turn.side);

        let mut recommendations: Vec<Recommendation> = self
            .shortlist(state, turn, candidates)
            .into_iter()
            .map(|(key, quick)| {
                let mut after = state.with_slot(turn.side, turn.action, turn.slot, &key);
                after.turn += 1;
                let immediate = match turn.action {
                    ActionKind::Pick => self.evaluator.perspective(&after.slates, turn.side),
                    ActionKind::Ban => self.threat_if_enemy_gets(state, turn.side, &key),
                };
                let worst_case = match response {
                    Some(next) => 100.0 - self.best_response(&after, next),
                    None => immediate,
                };
                let score = immediate * self.config.immediate_weight
                    + worst_case * self.config.response_weight;
                trace!(key = %key, quick, immediate, worst_case, score, "scored candidate");
                Recommendation::new(key, quick, immediate, worst_case, score)
            })
            .collect();

        recommendations.sort_by(|a, b| by_score_then_key((a.key.as_str(), a.score), (b.key.as_str(), b.score)));
        Ok(recommendations)
    }

    /// Pick the key for the current turn. Scores within 1e-9 of each other
    /// count as tied and go to the lexically smaller key.
    pub fn choose_action(&self, state: &DraftState) -> Result<String, DraftError> {
        let recommendations = self.get_recommendations(state)?;
        let chosen = best_recommendation(&recommendations)
            .map(|rec| rec.key.clone())
            .ok_or(DraftError::NoLegalCandidates { turn: state.turn })?;
        debug!(turn = state.turn, key = %chosen, "AI chose action");
        Ok(chosen)
    }

    /// Let the AI take every remaining turn of `state`.
    pub fn play_out(&self, mut state: DraftState) -> Result<DraftState, DraftError> {
        while let Some(turn) = state.current_turn() {
            let key = self.choose_action(&state)?;
            state = apply_draft_action(self.evaluator.catalog, &state, turn.side, &key)?;
        }
        Ok(state)
    }
}

/// Highest score wins; scores within 1e-9 tie and go to the smaller key.
pub fn best_recommendation(recommendations: &[Recommendation]) -> Option<&Recommendation> {
    let mut best: Option<&Recommendation> = None;
    for rec in recommendations {
        best = match best {
            None => Some(rec),
            Some(current) => {
                let better = rec.score > current.score + SCORE_EPSILON
                    || ((rec.score - current.score).abs() < SCORE_EPSILON && rec.key < current.key);
                if better {
                    Some(rec)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::state::DRAFT_ORDER;
    use crate::model::champion::Catalog;
    use crate::test_support::demo_catalog;
    use std::collections::BTreeSet;

    fn small_config() -> AiConfig {
        AiConfig {
            shortlist_pick: 4,
            shortlist_ban: 4,
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_single_legal_candidate_is_returned() {
        let catalog = demo_catalog();
        let locked: BTreeSet<String> = catalog.keys().filter(|k| *k != "Thresh").map(str::to_string).collect();
        let state = DraftState::with_locked(locked);
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), AiConfig::default());
        assert_eq!(recommender.choose_action(&state).unwrap(), "Thresh");
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        let catalog = demo_catalog();
        let state = DraftState::with_locked(catalog.keys().map(str::to_string).collect());
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), AiConfig::default());
        assert_eq!(
            recommender.choose_action(&state),
            Err(DraftError::NoLegalCandidates { turn: 0 })
        );
    }

    #[test]
    fn test_shortlist_is_truncated_and_ordered() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), small_config());
        let recs = recommender.get_recommendations(&DraftState::new()).unwrap();
        assert_eq!(recs.len(), 4);
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_choice_is_deterministic_and_legal() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), small_config());
        let mut state = DraftState::new();
        for _ in 0..8 {
            let first = recommender.choose_action(&state).unwrap();
            let second = recommender.choose_action(&state).unwrap();
            assert_eq!(first, second);
            let side = state.current_turn().unwrap().side;
            state = apply_draft_action(&catalog, &state, side, &first).unwrap();
        }
        assert_eq!(state.turn, 8);
    }

    #[test]
    fn test_ban_threat_ignores_unpickable() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), AiConfig::default());
        let mut state = DraftState::new();
        state = state.with_slot(Side::Red, ActionKind::Pick, 0, "Ahri");
        state = state.with_slot(Side::Red, ActionKind::Pick, 1, "Jinx");
        // Red's mid is taken by Ahri; Viktor only plays mid.
        let threat = recommender.ban_threat_score(&state, Side::Blue, "Viktor");
        assert_eq!(threat, f64::NEG_INFINITY);
        assert!(recommender.ban_threat_score(&state, Side::Blue, "Braum").is_finite());
    }

    #[test]
    fn test_counter_pick_bonus() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), AiConfig::default());
        // Red leans dive; anti champions counter it.
        let state = DraftState::new()
            .with_slot(Side::Red, ActionKind::Pick, 0, "LeeSin")
            .with_slot(Side::Red, ActionKind::Pick, 1, "Ahri");
        let with_enemy = recommender.quick_pick_score(&state, Side::Blue, "Braum");
        let without_enemy = recommender.quick_pick_score(&DraftState::new(), Side::Blue, "Braum");
        // Braum is anti; Lee Sin (3) + Ahri (2) give red dive 5.
        assert!((with_enemy - without_enemy - 5.0 * 0.3).abs() < 1e-9);
    }
    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    /// Red's third ban: the opponent (blue) picks right after.
    fn before_red_ban(catalog: &Catalog) -> DraftState {
        let mut state = DraftState::new();
        for key in ["Sylas", "Viego", "Aatrox", "Ashe", "Akali"] {
            let side = state.current_turn().unwrap().side;
            state = apply_draft_action(catalog, &state, side, key).unwrap();
        }
        state
    }

    #[test]
    fn test_ban_score_blends_threat_and_opponent_reply() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), small_config());
        let state = before_red_ban(&catalog);
        assert_eq!(state.turn, 5);
        let turn = state.current_turn().unwrap();
        assert_eq!((turn.side, turn.action), (Side::Red, ActionKind::Ban));

        let recs = recommender.get_recommendations(&state).unwrap();
        let top = &recs[0];
        let mut after = state.with_slot(Side::Red, ActionKind::Ban, turn.slot, &top.key);
        after.turn += 1;

        let threat = recommender.threat_if_enemy_gets(&state, Side::Red, &top.key);
        let reply = recommender.best_response(&after, DRAFT_ORDER[6]);
        assert_close(top.immediate, threat);
        assert_close(top.worst_case, 100.0 - reply);
        assert_close(top.score, threat * 0.6 + (100.0 - reply) * 0.4);
    }

    #[test]
    fn test_pick_score_blends_own_view_and_opponent_reply() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), small_config());
        let mut state = before_red_ban(&catalog);
        state = apply_draft_action(&catalog, &state, Side::Red, "Lux").unwrap();
        let turn = state.current_turn().unwrap();
        assert_eq!((turn.side, turn.action), (Side::Blue, ActionKind::Pick));
        assert_eq!(state.next_turn().unwrap().side, Side::Red);

        let recs = recommender.get_recommendations(&state).unwrap();
        for rec in &recs {
            let mut after = state.with_slot(Side::Blue, ActionKind::Pick, turn.slot, &rec.key);
            after.turn += 1;
            let own = recommender.evaluator.perspective(&after.slates, Side::Blue);
            let reply = recommender.best_response(&after, DRAFT_ORDER[7]);
            assert_close(rec.immediate, own);
            assert_close(rec.worst_case, 100.0 - reply);
            assert_close(rec.score, own * 0.6 + (100.0 - reply) * 0.4);
        }
    }

    #[test]
    fn test_back_to_back_pick_has_no_reply() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), small_config());
        let mut state = before_red_ban(&catalog);
        for key in ["Lux", "Ornn"] {
            let side = state.current_turn().unwrap().side;
            state = apply_draft_action(&catalog, &state, side, key).unwrap();
        }
        // Red picks twice in a row.
        assert_eq!(state.turn, 7);
        for rec in recommender.get_recommendations(&state).unwrap() {
            assert_close(rec.worst_case, rec.immediate);
            assert_close(rec.score, rec.immediate);
        }
    }

    #[test]
    fn test_play_out_completes_draft() {
        let catalog = demo_catalog();
        let recommender = DraftRecommender::new(DraftEvaluator::new(&catalog), small_config());
        let done = recommender.play_out(DraftState::new()).unwrap();
        assert!(done.is_complete());
        for side in Side::BOTH {
            assert_eq!(done.slates[side].picked_keys().len(), 5);
        }
    }

    #[test]
    fn test_best_recommendation_tie_break() {
        let recs = vec![
            Recommendation::new("Zed".to_string(), 0.0, 0.0, 0.0, 51.0),
            Recommendation::new("Ahri".to_string(), 0.0, 0.0, 0.0, 51.0 + 1e-12),
            Recommendation::new("Braum".to_string(), 0.0, 0.0, 0.0, 50.0),
        ];
        assert_eq!(best_recommendation(&recs).map(|r| r.key.as_str()), Some("Ahri"));
        assert!(best_recommendation(&[]).is_none());
    }
}
