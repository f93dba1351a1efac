pub mod evaluator;
pub mod positions;
pub mod recommender;
pub mod strategy;
pub mod team_stats;
pub mod trait_analytics;
pub mod traits;
pub mod win_rate;
