use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::evaluation::engine::EvaluationSettings;

/// Application configuration loaded from environment variables.
/// Every variable has a default; a value that does not parse fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub skills_file: PathBuf,
    pub learning_paths_file: PathBuf,
    pub similarity_model: String,
    pub evaluation: EvaluationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            rust_log: "info".to_string(),
            skills_file: PathBuf::from("data/skills.json"),
            learning_paths_file: PathBuf::from("data/learning_paths.json"),
            similarity_model: "tfidf".to_string(),
            evaluation: EvaluationSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            skills_file: std::env::var("SKILLS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.skills_file),
            learning_paths_file: std::env::var("LEARNING_PATHS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.learning_paths_file),
            similarity_model: std::env::var("SIMILARITY_MODEL")
                .unwrap_or(defaults.similarity_model),
            evaluation: EvaluationSettings {
                max_steps_per_skill: parse_env(
                    "MAX_STEPS_PER_SKILL",
                    defaults.evaluation.max_steps_per_skill,
                )?,
                strong_fit_threshold: parse_env(
                    "STRONG_FIT_THRESHOLD",
                    defaults.evaluation.strong_fit_threshold,
                )?,
                moderate_fit_threshold: parse_env(
                    "MODERATE_FIT_THRESHOLD",
                    defaults.evaluation.moderate_fit_threshold,
                )?,
            },
        };

        config
            .evaluation
            .validate()
            .context("Invalid fit evaluation settings")?;
        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
