use crate::analysis::evaluator::DraftEvaluation;
use crate::analysis::positions::assign_positions;
use crate::analysis::recommender::Recommendation;
use crate::analysis::trait_analytics::{RebalanceRow, Suggestion, TraitAnalytics};
use crate::draft::series::{ranked, BalanceReport, FearlessRule, GameRecord, SeriesRecord, Team, WinTally};
use crate::draft::state::DraftState;
use crate::draft::tournament::TournamentRecord;
use crate::model::champion::{Catalog, Position};
use crate::model::team::{Side, TeamSlate};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct BoardRow {
    role: String,
    blue: String,
    red: String,
}

#[derive(Tabled)]
struct PhaseRow {
    phase: String,
    blue: String,
    red: String,
}

#[derive(Tabled)]
struct CandidateRow {
    rank: String,
    champion: String,
    quick: String,
    immediate: String,
    worst_case: String,
    score: String,
}

#[derive(Tabled)]
struct TallyRow {
    name: String,
    win_rate: String,
    record: String,
    games: usize,
}

#[derive(Tabled)]
struct TraitRow {
    #[tabled(rename = "trait")]
    label: String,
    seen: usize,
    fired: usize,
    fire_rate: String,
    win_rate: String,
    avg_edge: String,
    suggestion: String,
}

#[derive(Tabled)]
struct MatchRow {
    blue: String,
    red: String,
    score: String,
    winner: String,
}

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "#")]
    number: String,
    home_side: String,
    blue_win: String,
    winner: String,
}

fn side_label(side: Side) -> ColoredString {
    match side {
        Side::Blue => "BLUE".blue().bold(),
        Side::Red => "RED".red().bold(),
    }
}

fn roster_by_role(catalog: &Catalog, slate: &TeamSlate) -> Vec<String> {
    let picked = slate.picked_keys();
    let assignment = assign_positions(catalog, &picked);
    Position::ALL
        .iter()
        .map(|position| {
            assignment
                .at(*position)
                .map(|key| catalog.display_name(key).to_string())
                .unwrap_or_else(|| "-".to_string())
        })
        .collect()
}

fn ban_line(catalog: &Catalog, slate: &TeamSlate) -> String {
    let names: Vec<&str> = slate
        .banned_keys()
        .into_iter()
        .map(|key| catalog.display_name(key))
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

pub fn display_draft_board(catalog: &Catalog, state: &DraftState, title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let blue = roster_by_role(catalog, &state.slates.blue);
    let red = roster_by_role(catalog, &state.slates.red);
    let rows: Vec<BoardRow> = Position::ALL
        .iter()
        .zip(blue.into_iter().zip(red))
        .map(|(position, (blue, red))| BoardRow {
            role: position.to_string(),
            blue,
            red,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!("{} {}", "Blue bans:".blue(), ban_line(catalog, &state.slates.blue));
    println!("{} {}", "Red bans: ".red(), ban_line(catalog, &state.slates.red));
    if !state.locked.is_empty() {
        let locked: Vec<&str> = state.locked.iter().map(|key| catalog.display_name(key)).collect();
        println!("{} {}", "Fearless locked:".yellow(), locked.join(", "));
    }
    println!();
}

pub fn display_evaluation(evaluation: &DraftEvaluation) {
    let blue_win = evaluation.blue_win;
    println!(
        "{} {} {:.1}%  vs  {} {:.1}%",
        "📊 Win Probability:".bold(),
        side_label(Side::Blue),
        blue_win,
        side_label(Side::Red),
        100.0 - blue_win
    );

    let phases = &evaluation.phases;
    let rows = vec![
        PhaseRow {
            phase: "Early".to_string(),
            blue: format!("{:.1}%", phases.early),
            red: format!("{:.1}%", 100.0 - phases.early),
        },
        PhaseRow {
            phase: "Mid".to_string(),
            blue: format!("{:.1}%", phases.mid),
            red: format!("{:.1}%", 100.0 - phases.mid),
        },
        PhaseRow {
            phase: "Late".to_string(),
            blue: format!("{:.1}%", phases.late),
            red: format!("{:.1}%", 100.0 - phases.late),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let b = &evaluation.breakdown;
    println!("\n{}", "Breakdown (blue edge)".bold().yellow());
    println!("• Power: {:+.1}", b.power_edge);
    println!(
        "• Core penalty: {:+.1} (blue {:.1} / red {:.1})",
        b.core_penalty_edge, b.core_penalty_blue, b.core_penalty_red
    );
    println!("• Damage balance: {:+.1}", b.damage_balance_edge);
    println!("• Archetype counter: {:+.1}", b.archetype_edge);
    println!("• Scaling: {:+.1}", b.scaling_edge);
    println!("• Volatility: {:+.1}", b.volatility_edge);

    for side in Side::BOTH {
        let stats = &evaluation.stats[side];
        println!(
            "\n{} {} | CC {:.1} | DMG {:.1} | TANK {:.1} | AD {:.0}%",
            side_label(side),
            stats.composition_label(),
            stats.cc,
            stats.damage,
            stats.tank,
            stats.ad_ratio * 100.0
        );
        for t in &evaluation.traits.active[side] {
            println!("  {} {} · {}: {}", "✦".yellow(), t.owner, t.name, t.summary);
        }
        for line in &evaluation.org.details[side] {
            println!("  {} {}", "★".cyan(), line);
        }
    }

    if let Some(effect) = &evaluation.strategy {
        println!(
            "\n{} {} on {}: fit {} / mismatch {} ({:+.1})",
            "🎯 Strategy".bold(),
            effect.style,
            side_label(effect.side),
            effect.counts.fit,
            effect.counts.mismatch,
            effect.win_bonus
        );
    }
    println!();
}

pub fn display_recommendations(catalog: &Catalog, recommendations: &[Recommendation], top_n: usize) {
    if recommendations.is_empty() {
        println!("{}", "No legal candidates".yellow());
        return;
    }

    let rows: Vec<CandidateRow> = recommendations
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(idx, rec)| CandidateRow {
            rank: format!("#{}", idx + 1),
            champion: catalog.display_name(&rec.key).to_string(),
            quick: format!("{:.2}", rec.quick),
            immediate: format!("{:.1}", rec.immediate),
            worst_case: format!("{:.1}", rec.worst_case),
            score: format!("{:.2}", rec.score),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_game_result(game: &GameRecord, home: &str, away: &str) {
    let winner = match game.winning_team() {
        Team::Home => home,
        Team::Away => away,
    };
    println!(
        "{} Game {}: {} wins on {} (blue win {:.1}%)",
        "🏆".yellow(),
        game.number,
        winner.bold(),
        side_label(game.winner),
        game.blue_win
    );
}

pub fn display_series_summary(record: &SeriesRecord, home: &str, away: &str) {
    println!(
        "\n{}",
        format!("📈 {} | {} {} : {} {}", record.mode, home, record.home_wins, record.away_wins, away)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    let rows: Vec<GameRow> = record
        .games
        .iter()
        .map(|game| GameRow {
            number: game.number.to_string(),
            home_side: game.home_side.to_string(),
            blue_win: format!("{:.1}%", game.blue_win),
            winner: match game.winning_team() {
                Team::Home => home.green().to_string(),
                Team::Away => away.red().to_string(),
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    match record.winner {
        Some(Team::Home) => display_success(&format!("{} takes the series", home)),
        Some(Team::Away) => display_success(&format!("{} takes the series", away)),
        None => display_info("Series drawn"),
    }
}

fn tally_rows(rows: Vec<(&str, WinTally)>, limit: usize) -> Vec<TallyRow> {
    rows.into_iter()
        .take(limit)
        .map(|(name, tally)| TallyRow {
            name: name.to_string(),
            win_rate: format!("{:.1}%", tally.win_rate()),
            record: format!("{}W {}L", tally.wins, tally.games - tally.wins),
            games: tally.games,
        })
        .collect()
}

fn print_tally_table(title: &str, rows: Vec<TallyRow>) {
    println!("{}", title.bold());
    if rows.is_empty() {
        println!("{}\n", "No data".dimmed());
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_balance_report(catalog: &Catalog, report: &BalanceReport) {
    println!("\n{}", format!("⚖️  AI Balance ({} games)", report.games).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
    println!(
        "{} {} wins ({:.1}%)",
        side_label(Side::Blue),
        report.blue_wins,
        report.blue_share()
    );
    println!(
        "{} {} wins ({:.1}%)",
        side_label(Side::Red),
        report.red_wins,
        100.0 - report.blue_share()
    );
    println!("Mean blue win probability: {:.1}%\n", report.mean_blue_win());

    let champions: Vec<(&str, WinTally)> = ranked(&report.champions)
        .into_iter()
        .map(|(key, tally)| (catalog.display_name(key), tally))
        .collect();
    print_tally_table("🏅 Champion win rate (top 20)", tally_rows(champions, 20));
    print_tally_table("👥 Team win rate", tally_rows(ranked(&report.teams), usize::MAX));
    print_tally_table("🧩 Composition win rate", tally_rows(ranked(&report.compositions), usize::MAX));
}

fn suggestion_label(suggestion: Suggestion) -> ColoredString {
    let text = suggestion.to_string();
    match suggestion {
        Suggestion::Keep => text.normal(),
        Suggestion::Nerf | Suggestion::MinorNerf => text.red(),
        Suggestion::Buff | Suggestion::MinorBuff => text.green(),
    }
}

pub fn display_trait_report(analytics: &TraitAnalytics, rows: &[RebalanceRow]) {
    println!(
        "\n{}",
        format!("🔬 Trait Balance ({} sampled games)", analytics.total_games)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());
    if rows.is_empty() {
        display_info("No trait has enough samples yet");
        return;
    }

    let table_rows: Vec<TraitRow> = rows
        .iter()
        .map(|r| TraitRow {
            label: format!("{} · {}", r.row.owner, r.row.name),
            seen: r.row.opportunities,
            fired: r.row.activations,
            fire_rate: format!("{:.1}%", r.row.activation_rate),
            win_rate: format!("{:.1}%", r.row.active_win_rate),
            avg_edge: format!("{:+.2}", r.row.avg_win_edge),
            suggestion: suggestion_label(r.suggestion).to_string(),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_tournament(record: &TournamentRecord) {
    for round in &record.rounds {
        let stage = &round.stage;
        let fearless = if stage.fearless == FearlessRule::Off {
            ""
        } else {
            " · fearless"
        };
        println!(
            "\n{}",
            format!("🏟️  {} ({}{})", stage.label, stage.mode, fearless).bold().cyan()
        );
        let rows: Vec<MatchRow> = round
            .matches
            .iter()
            .map(|m| MatchRow {
                blue: m.blue_team.clone(),
                red: m.red_team.clone(),
                score: format!("{}:{}", m.series.home_wins, m.series.away_wins),
                winner: m.winner.green().to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }
    display_success(&format!("🏆 Champion: {}", record.champion.bold()));
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
