//! Best-of-N series with fearless locks and randomized outcomes.

use crate::analysis::evaluator::DraftEvaluation;
use crate::draft::state::DraftState;
use crate::model::team::{PerSide, Side, TeamSlate};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    Single,
    Bo3,
    Bo5,
}

impl SeriesMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "single" | "bo1" => Some(SeriesMode::Single),
            "bo3" => Some(SeriesMode::Bo3),
            "bo5" => Some(SeriesMode::Bo5),
            _ => None,
        }
    }

    pub fn max_games(self) -> usize {
        match self {
            SeriesMode::Single => 1,
            SeriesMode::Bo3 => 3,
            SeriesMode::Bo5 => 5,
        }
    }

    pub fn wins_needed(self) -> u32 {
        match self {
            SeriesMode::Single => 1,
            SeriesMode::Bo3 => 2,
            SeriesMode::Bo5 => 3,
        }
    }

    /// Every champion picked in a game is locked for the rest of the series.
    pub fn hard_fearless(self) -> bool {
        !matches!(self, SeriesMode::Single)
    }
}

impl fmt::Display for SeriesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesMode::Single => write!(f, "Single Game"),
            SeriesMode::Bo3 => write!(f, "Best of 3"),
            SeriesMode::Bo5 => write!(f, "Best of 5"),
        }
    }
}

/// How picks from earlier games restrict later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FearlessRule {
    Off,
    /// Every pick is locked for both sides; teams swap sides each game.
    Hard,
    /// Each team avoids its own earlier picks; sides stay fixed.
    PerTeam,
}

impl FearlessRule {
    pub fn for_mode(mode: SeriesMode) -> Self {
        if mode.hard_fearless() {
            FearlessRule::Hard
        } else {
            FearlessRule::Off
        }
    }
}

/// The two participants, independent of which side they draft on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Away,
}

/// Resolve a finished draft into a winner.
pub fn roll_winner<R: Rng + ?Sized>(blue_win: f64, rng: &mut R) -> Side {
    if rng.gen::<f64>() * 100.0 < blue_win {
        Side::Blue
    } else {
        Side::Red
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub number: usize,
    pub home_side: Side,
    pub blue_win: f64,
    pub winner: Side,
    pub slates: PerSide<TeamSlate>,
}

impl GameRecord {
    pub fn winning_team(&self) -> Team {
        if self.winner == self.home_side {
            Team::Home
        } else {
            Team::Away
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    pub mode: SeriesMode,
    pub fearless: FearlessRule,
    pub home_wins: u32,
    pub away_wins: u32,
    pub winner: Option<Team>,
    pub games: Vec<GameRecord>,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Series {
    mode: SeriesMode,
    fearless: FearlessRule,
    home_side: Side,
    home_wins: u32,
    away_wins: u32,
    locked: BTreeSet<String>,
    home_locked: BTreeSet<String>,
    away_locked: BTreeSet<String>,
    games: Vec<GameRecord>,
}

impl Series {
    pub fn new(mode: SeriesMode, home_side: Side) -> Self {
        Series::with_rule(mode, home_side, FearlessRule::for_mode(mode))
    }

    pub fn with_rule(mode: SeriesMode, home_side: Side, fearless: FearlessRule) -> Self {
        Series {
            mode,
            fearless,
            home_side,
            home_wins: 0,
            away_wins: 0,
            locked: BTreeSet::new(),
            home_locked: BTreeSet::new(),
            away_locked: BTreeSet::new(),
            games: Vec::new(),
        }
    }

    pub fn mode(&self) -> SeriesMode {
        self.mode
    }

    pub fn fearless(&self) -> FearlessRule {
        self.fearless
    }

    /// Side the home team drafts on in the next game.
    pub fn home_side(&self) -> Side {
        self.home_side
    }

    pub fn locked(&self) -> &BTreeSet<String> {
        &self.locked
    }

    /// Champions `team` already played under [`FearlessRule::PerTeam`].
    pub fn team_locked(&self, team: Team) -> &BTreeSet<String> {
        match team {
            Team::Home => &self.home_locked,
            Team::Away => &self.away_locked,
        }
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn score(&self) -> (u32, u32) {
        (self.home_wins, self.away_wins)
    }

    /// A fresh draft for the next game, carrying the series locks.
    pub fn next_draft(&self) -> DraftState {
        let mut team_locked: PerSide<BTreeSet<String>> = PerSide::default();
        team_locked[self.home_side] = self.home_locked.clone();
        team_locked[self.home_side.opponent()] = self.away_locked.clone();
        DraftState {
            locked: self.locked.clone(),
            team_locked,
            ..DraftState::default()
        }
    }

    pub fn is_over(&self) -> bool {
        let target = self.mode.wins_needed();
        self.home_wins >= target || self.away_wins >= target || self.games.len() >= self.mode.max_games()
    }

    pub fn winner(&self) -> Option<Team> {
        if !self.is_over() {
            return None;
        }
        match self.home_wins.cmp(&self.away_wins) {
            std::cmp::Ordering::Greater => Some(Team::Home),
            std::cmp::Ordering::Less => Some(Team::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Roll the outcome of a completed draft and advance the series.
    pub fn record_game<R: Rng + ?Sized>(&mut self, draft: &DraftState, blue_win: f64, rng: &mut R) -> &GameRecord {
        let winner = roll_winner(blue_win, rng);
        let record = GameRecord {
            number: self.games.len() + 1,
            home_side: self.home_side,
            blue_win,
            winner,
            slates: draft.slates.clone(),
        };
        match record.winning_team() {
            Team::Home => self.home_wins += 1,
            Team::Away => self.away_wins += 1,
        }
        info!(
            game = record.number,
            winner = %winner,
            blue_win,
            home = self.home_wins,
            away = self.away_wins,
            "game finished"
        );

        let picks = |side: Side| {
            draft.slates[side]
                .picked_keys()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        match self.fearless {
            FearlessRule::Off => {}
            FearlessRule::Hard => {
                for side in Side::BOTH {
                    self.locked.extend(picks(side));
                }
                self.home_side = self.home_side.opponent();
            }
            FearlessRule::PerTeam => {
                self.home_locked.extend(picks(self.home_side));
                self.away_locked.extend(picks(self.home_side.opponent()));
            }
        }
        self.games.push(record);
        &self.games[self.games.len() - 1]
    }

    pub fn finish(self) -> SeriesRecord {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(self, played_at: DateTime<Utc>) -> SeriesRecord {
        let winner = self.winner();
        SeriesRecord {
            mode: self.mode,
            fearless: self.fearless,
            home_wins: self.home_wins,
            away_wins: self.away_wins,
            winner,
            games: self.games,
            played_at,
        }
    }
}

/// Games played and won by one champion, team or composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WinTally {
    pub games: usize,
    pub wins: usize,
}

impl WinTally {
    fn add(&mut self, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games as f64 * 100.0
    }
}

/// Aggregate of many independent AI-vs-AI games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceReport {
    pub games: usize,
    pub blue_wins: usize,
    pub red_wins: usize,
    pub total_blue_win: f64,
    pub champions: BTreeMap<String, WinTally>,
    pub teams: BTreeMap<String, WinTally>,
    pub compositions: BTreeMap<String, WinTally>,
}

impl BalanceReport {
    /// Tally one finished game. `teams` names the org on each side, if any.
    pub fn record(
        &mut self,
        slates: &PerSide<TeamSlate>,
        evaluation: &DraftEvaluation,
        teams: PerSide<Option<&str>>,
        winner: Side,
    ) {
        self.games += 1;
        self.total_blue_win += evaluation.blue_win;
        match winner {
            Side::Blue => self.blue_wins += 1,
            Side::Red => self.red_wins += 1,
        }

        for side in Side::BOTH {
            let won = side == winner;
            for key in slates[side].picked_keys() {
                self.champions.entry(key.to_string()).or_default().add(won);
            }
            if let Some(team) = teams[side] {
                self.teams.entry(team.to_string()).or_default().add(won);
            }
            let label = evaluation.stats[side].composition_label();
            self.compositions.entry(label.to_string()).or_default().add(won);
        }
    }

    pub fn mean_blue_win(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_blue_win / self.games as f64
    }

    pub fn blue_share(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.blue_wins as f64 / self.games as f64 * 100.0
    }
}

/// Rows ordered by win rate, then by games played.
pub fn ranked(tallies: &BTreeMap<String, WinTally>) -> Vec<(&str, WinTally)> {
    let mut rows: Vec<(&str, WinTally)> = tallies.iter().map(|(k, t)| (k.as_str(), *t)).collect();
    rows.sort_by(|a, b| {
        b.1.win_rate()
            .partial_cmp(&a.1.win_rate())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.1.games.cmp(&a.1.games))
    });
    rows
}
