// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::billing::{PricePlan, PricePlanError};

/// Default daily calorie goal used for the remaining-calories figure.
pub const DEFAULT_CALORIE_GOAL: u32 = 2000;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Hercules API (no trailing slash)
    pub api_url: String,
    /// Where the session (token + user) is persisted between runs
    pub session_path: PathBuf,
    /// Fixed daily calorie goal
    pub calorie_goal: u32,
    /// Price of one full month, in whole currency units
    pub monthly_price: u32,
    /// Price of a half month, in whole currency units
    pub half_month_price: u32,
    /// Per-request timeout
    pub http_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            session_path: env::temp_dir().join("hercules-test-session.json"),
            calorie_goal: DEFAULT_CALORIE_GOAL,
            monthly_price: 399,
            half_month_price: 199,
            http_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let config = Self {
            api_url: env::var("HERCULES_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            session_path: match env::var("HERCULES_SESSION_PATH") {
                Ok(path) => PathBuf::from(path),
                Err(_) => default_session_path()?,
            },
            calorie_goal: parse_var("HERCULES_CALORIE_GOAL", defaults.calorie_goal)?,
            monthly_price: parse_var("HERCULES_MONTHLY_PRICE", defaults.monthly_price)?,
            half_month_price: parse_var("HERCULES_HALF_MONTH_PRICE", defaults.half_month_price)?,
            http_timeout: Duration::from_secs(parse_var("HERCULES_HTTP_TIMEOUT_SECS", 15u64)?),
        };

        if config.api_url.is_empty() {
            return Err(ConfigError::Invalid {
                key: "HERCULES_API_URL",
                reason: "must not be empty".to_string(),
            });
        }

        // Validates H < P
        config.price_plan()?;
        Ok(config)
    }

    /// Local workout log, stored next to the session file.
    pub fn workout_log_path(&self) -> PathBuf {
        self.session_path.with_file_name("workouts.json")
    }

    /// Price tiers used by the first-payment calculation.
    pub fn price_plan(&self) -> Result<PricePlan, ConfigError> {
        PricePlan::new(self.monthly_price, self.half_month_price).map_err(|e| {
            let key = match e {
                PricePlanError::TooHigh(_) => "HERCULES_MONTHLY_PRICE",
                PricePlanError::HalfNotBelowMonthly { .. } => "HERCULES_HALF_MONTH_PRICE",
            };
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
    }
}

/// `<config dir>/hercules/session.json`
fn default_session_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("hercules").join("session.json"))
        .ok_or(ConfigError::Missing("HERCULES_SESSION_PATH"))
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("could not parse '{}'", raw),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
