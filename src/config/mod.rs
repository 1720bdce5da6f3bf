// src/config/mod.rs
// All runtime settings come from the environment (with a .env file for
// local development); defaults cover a local setup.

use once_cell::sync::Lazy;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScribeConfig {
    // ── Generation service
    pub generation_base_url: String,
    pub generation_api_key: String,
    pub model: String,
    /// Bound on a single generation call, in seconds.
    pub generation_timeout: u64,

    // ── Workflow
    /// Explicit chapter target; 0 means "use the outline heuristic".
    pub target_chapters: usize,

    // ── Database
    pub database_url: String,

    // ── Server
    pub host: String,
    pub port: u16,
    /// Server-side bound on a whole request, in seconds.
    pub request_timeout: u64,
    pub cors_origin: String,

    // ── Auth
    /// Comma-separated list of valid session codes.
    pub access_codes: String,

    // ── Logging
    pub log_level: String,
}

fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                default
            }
        },
        Err(_) => default,
    }
}

impl ScribeConfig {
    pub fn from_env() -> Self {
        // Not an error when absent; plain env vars still apply.
        let _ = dotenvy::dotenv();

        Self {
            generation_base_url: env_var_or(
                "SCRIBE_GENERATION_BASE_URL",
                "https://api.openai.com/v1".to_string(),
            ),
            generation_api_key: env_var_or("SCRIBE_GENERATION_API_KEY", String::new()),
            model: env_var_or("SCRIBE_MODEL", "gpt-4o-mini".to_string()),
            generation_timeout: env_var_or("SCRIBE_GENERATION_TIMEOUT", 120),
            target_chapters: env_var_or("SCRIBE_TARGET_CHAPTERS", 0),
            database_url: env_var_or("DATABASE_URL", "sqlite:./scribe.db?mode=rwc".to_string()),
            host: env_var_or("SCRIBE_HOST", "0.0.0.0".to_string()),
            port: env_var_or("SCRIBE_PORT", 3002),
            request_timeout: env_var_or("SCRIBE_REQUEST_TIMEOUT", 180),
            cors_origin: env_var_or("SCRIBE_CORS_ORIGIN", "http://localhost:3000".to_string()),
            access_codes: env_var_or("SCRIBE_ACCESS_CODES", String::new()),
            log_level: env_var_or("SCRIBE_LOG_LEVEL", "info".to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn generation_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.generation_timeout)
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Valid session codes, whitespace-trimmed, empties dropped.
    pub fn access_code_list(&self) -> Vec<String> {
        self.access_codes
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `None` when the heuristic should decide.
    pub fn target_chapters_override(&self) -> Option<usize> {
        if self.target_chapters > 0 {
            Some(self.target_chapters)
        } else {
            None
        }
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<ScribeConfig> = Lazy::new(ScribeConfig::from_env);
