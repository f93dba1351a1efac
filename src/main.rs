use clap::Parser;
use draft_sim::analysis::evaluator::{DraftEvaluation, DraftEvaluator};
use draft_sim::analysis::recommender::{best_recommendation, AiConfig, DraftRecommender};
use draft_sim::analysis::trait_analytics::{TraitAnalytics, DEFAULT_MIN_OPPORTUNITY};
use draft_sim::analysis::strategy::{StrategySelection, Style};
use draft_sim::config::Config;
use draft_sim::display::output::{
    display_balance_report, display_draft_board, display_error, display_evaluation,
    display_game_result, display_info, display_recommendations, display_series_summary,
    display_success, display_tournament, display_trait_report,
};
use draft_sim::draft::series::{BalanceReport, Series, SeriesMode, SeriesRecord};
use draft_sim::draft::state::{apply_draft_action, DraftState};
use draft_sim::draft::tournament::{play_exhibition, random_pairing, run_tournament};
use draft_sim::error::DraftError;
use draft_sim::error::AppError;
use draft_sim::model::champion::Catalog;
use draft_sim::model::team::{load_org_profiles, OrgProfile, PerSide, Side};
use indicatif::ProgressBar;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "Draft Sim")]
#[command(about = "Simulate pick/ban drafts between two AI teams and score the result", long_about = None)]
struct Args {
    /// Champion catalog JSON (overrides DRAFT_CATALOG_PATH)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Organization profiles JSON (overrides DRAFT_TEAMS_PATH)
    #[arg(long)]
    teams: Option<PathBuf>,

    /// Series format: single, bo3 or bo5
    #[arg(short, long, default_value = "single")]
    mode: String,

    /// Strategy for the home team: general, dive, poke, anti, early, mid, late
    #[arg(short, long, default_value = "general")]
    strategy: String,

    /// Side the home team drafts on in game 1
    #[arg(long, default_value = "blue")]
    side: String,

    /// Organization id for the home team
    #[arg(long)]
    home: Option<String>,

    /// Organization id for the away team
    #[arg(long)]
    away: Option<String>,

    /// RNG seed for outcome rolls (overrides DRAFT_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Show the AI's top N candidates on every turn
    #[arg(long, default_value = "0")]
    show_candidates: usize,

    /// Play N independent AI-vs-AI games and report side balance
    #[arg(long)]
    balance: Option<usize>,

    /// Sample N random drafts and report how often each trait fires and pays off
    #[arg(long)]
    trait_report: Option<usize>,

    /// Run a knockout bracket between all loaded organizations
    #[arg(long)]
    tournament: bool,

    /// Print results as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SeriesOutput<'a> {
    home: &'a str,
    away: &'a str,
    record: &'a SeriesRecord,
    evaluations: &'a [DraftEvaluation],
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn find_org<'a>(orgs: &'a [OrgProfile], id: Option<&str>) -> Result<Option<&'a OrgProfile>, AppError> {
    let Some(id) = id else {
        return Ok(None);
    };
    orgs.iter()
        .find(|org| org.id == id)
        .map(Some)
        .ok_or_else(|| AppError::ConfigError(format!("Unknown organization: {}", id)))
}

/// Let the AI make every move of one draft.
fn play_draft(
    catalog: &Catalog,
    evaluator: DraftEvaluator<'_>,
    ai: AiConfig,
    mut state: DraftState,
    show_candidates: usize,
) -> Result<DraftState, AppError> {
    let recommender = DraftRecommender::new(evaluator, ai);
    if show_candidates == 0 {
        return Ok(recommender.play_out(state)?);
    }
    while let Some(turn) = state.current_turn() {
        let recommendations = recommender.get_recommendations(&state)?;
        display_info(&format!(
            "Turn {} · {} {} ({} left in phase)",
            state.turn + 1,
            turn.side,
            turn.action,
            state.remaining_actions_in_phase()
        ));
        display_recommendations(catalog, &recommendations, show_candidates);
        let key = best_recommendation(&recommendations)
            .map(|rec| rec.key.clone())
            .ok_or(DraftError::NoLegalCandidates { turn: state.turn })?;
        debug!(turn = state.turn, side = %turn.side, action = %turn.action, key = %key, "draft action");
        state = apply_draft_action(catalog, &state, turn.side, &key)?;
    }
    Ok(state)
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(path) = args.catalog {
        config.catalog_path = path;
    }
    if let Some(path) = args.teams {
        config.teams_path = Some(path);
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mode = SeriesMode::parse(&args.mode)
        .ok_or_else(|| AppError::ConfigError(format!("Unknown mode: {}", args.mode)))?;
    let style = Style::parse(&args.strategy)
        .ok_or_else(|| AppError::ConfigError(format!("Unknown strategy: {}", args.strategy)))?;
    let first_side = Side::parse(&args.side)
        .ok_or_else(|| AppError::ConfigError(format!("Unknown side: {}", args.side)))?;

    let catalog = Catalog::from_json_str(&fs::read_to_string(&config.catalog_path)?)?;
    info!(champions = catalog.len(), path = %config.catalog_path.display(), "catalog loaded");

    let orgs = match &config.teams_path {
        Some(path) => load_org_profiles(&fs::read_to_string(path)?, &catalog)?,
        None => Vec::new(),
    };
    let home_org = find_org(&orgs, args.home.as_deref())?;
    let away_org = find_org(&orgs, args.away.as_deref())?;
    let home_name = home_org.map_or("Home", |org| org.name.as_str());
    let away_name = away_org.map_or("Away", |org| org.name.as_str());

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    if !args.json {
        display_info(&format!("Seed: {}", seed));
    }

    if let Some(samples) = args.trait_report {
        let pb = ProgressBar::new(samples as u64);
        pb.set_message("Sampling random drafts");
        let mut analytics = TraitAnalytics::new();
        for _ in 0..samples {
            analytics.run_auto_sample(&catalog, &mut rng, 1);
            pb.inc(1);
        }
        pb.finish_with_message("✓ Trait sampling complete");

        let rows = analytics.rebalance_suggestions(DEFAULT_MIN_OPPORTUNITY);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            display_trait_report(&analytics, &rows);
        }
        return Ok(());
    }

    if args.tournament {
        let record = run_tournament(&catalog, &orgs, config.ai, &mut rng)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            display_tournament(&record);
        }
        return Ok(());
    }

    if let Some(games) = args.balance {
        let pb = ProgressBar::new(games as u64);
        pb.set_message("Playing AI-vs-AI drafts");
        let mut report = BalanceReport::default();
        for _ in 0..games {
            let pairing = random_pairing(&orgs, &mut rng);
            let game = play_exhibition(&catalog, pairing, config.ai, &mut rng)?;
            let names = PerSide::new(
                pairing.blue.map(|org| org.name.as_str()),
                pairing.red.map(|org| org.name.as_str()),
            );
            report.record(&game.draft.slates, &game.evaluation, names, game.winner);
            pb.inc(1);
        }
        pb.finish_with_message("✓ Balance run complete");

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            display_balance_report(&catalog, &report);
        }
        return Ok(());
    }

    let mut series = Series::new(mode, first_side);
    let mut evaluations = Vec::new();
    while !series.is_over() {
        let home_side = series.home_side();
        let orgs = match home_side {
            Side::Blue => PerSide::new(home_org, away_org),
            Side::Red => PerSide::new(away_org, home_org),
        };
        let evaluator = DraftEvaluator::new(&catalog)
            .with_strategy(StrategySelection {
                style,
                focus: home_side,
            })
            .with_orgs(orgs);

        let game_number = series.games().len() + 1;
        if !args.json {
            display_info(&format!(
                "Game {}: {} on {}, {} on {}",
                game_number,
                home_name,
                home_side,
                away_name,
                home_side.opponent()
            ));
        }
        let show = if args.json { 0 } else { args.show_candidates };
        let draft = play_draft(&catalog, evaluator, config.ai, series.next_draft(), show)?;
        let evaluation = evaluator.evaluate(&draft.slates);

        if !args.json {
            display_draft_board(&catalog, &draft, &format!("🎮 Game {} Draft", game_number));
            display_evaluation(&evaluation);
        }
        let game = series.record_game(&draft, evaluation.blue_win, &mut rng);
        if !args.json {
            display_game_result(game, home_name, away_name);
        }
        evaluations.push(evaluation);
    }

    let record = series.finish();
    if args.json {
        let output = SeriesOutput {
            home: home_name,
            away: away_name,
            record: &record,
            evaluations: &evaluations,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        display_series_summary(&record, home_name, away_name);
        display_success(&format!("Played {} game(s) in {}", record.games.len(), record.mode));
    }

    Ok(())
}
