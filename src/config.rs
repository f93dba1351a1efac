use crate::analysis::recommender::AiConfig;
use crate::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_CATALOG_PATH: &str = "data/champions.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub teams_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub ai: AiConfig,
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::ConfigError(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| PathBuf::from(raw.trim()))
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let catalog_path =
            path_var("DRAFT_CATALOG_PATH").unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH));
        let teams_path = path_var("DRAFT_TEAMS_PATH");
        let seed = parse_var("DRAFT_SEED")?;

        let defaults = AiConfig::default();
        let ai = AiConfig {
            shortlist_pick: parse_var("DRAFT_AI_SHORTLIST_PICK")?.unwrap_or(defaults.shortlist_pick),
            shortlist_ban: parse_var("DRAFT_AI_SHORTLIST_BAN")?.unwrap_or(defaults.shortlist_ban),
            immediate_weight: parse_var("DRAFT_AI_IMMEDIATE_WEIGHT")?.unwrap_or(defaults.immediate_weight),
            response_weight: parse_var("DRAFT_AI_RESPONSE_WEIGHT")?.unwrap_or(defaults.response_weight),
        };

        let config = Config {
            catalog_path,
            teams_path,
            seed,
            ai,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.ai.shortlist_pick == 0 || self.ai.shortlist_ban == 0 {
            return Err(AppError::ConfigError(
                "AI shortlist sizes must be at least 1".to_string(),
            ));
        }
        let weights = [self.ai.immediate_weight, self.ai.response_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::ConfigError(
                "AI blend weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            teams_path: None,
            seed: None,
            ai: AiConfig::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_shortlist() {
        let mut bad = config();
        bad.ai.shortlist_ban = 0;
        assert!(matches!(bad.validate(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut bad = config();
        bad.ai.response_weight = -0.4;
        assert!(matches!(bad.validate(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_parse_var_reads_and_rejects() {
        env::set_var("DRAFT_TEST_PARSE_OK", " 12 ");
        env::set_var("DRAFT_TEST_PARSE_BAD", "twelve");
        assert_eq!(parse_var::<usize>("DRAFT_TEST_PARSE_OK").unwrap(), Some(12));
        assert!(parse_var::<usize>("DRAFT_TEST_PARSE_BAD").is_err());
        assert_eq!(parse_var::<usize>("DRAFT_TEST_PARSE_MISSING").unwrap(), None);
    }

    #[test]
    fn test_blank_path_counts_as_unset() {
        env::set_var("DRAFT_TEST_PATH_BLANK", "  ");
        env::set_var("DRAFT_TEST_PATH_SET", "data/teams.json");
        assert_eq!(path_var("DRAFT_TEST_PATH_BLANK"), None);
        assert_eq!(path_var("DRAFT_TEST_PATH_MISSING"), None);
        assert_eq!(path_var("DRAFT_TEST_PATH_SET"), Some(PathBuf::from("data/teams.json")));
    }
}
