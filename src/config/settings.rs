//! Process settings read once from the environment at startup.

use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/admin";
pub const DEFAULT_MODELS_PATH: &str = "models.json";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AdminSettings {
    /// Model names hidden from the admin (`ADMIN_EXCLUDE_MODELS`, comma-separated).
    pub exclude_models: Vec<String>,
    pub database_url: String,
    pub models_path: PathBuf,
    pub bind: String,
    pub body_limit: usize,
}

impl Default for AdminSettings {
    fn default() -> Self {
        AdminSettings {
            exclude_models: Vec::new(),
            database_url: DEFAULT_DATABASE_URL.into(),
            models_path: PathBuf::from(DEFAULT_MODELS_PATH),
            bind: DEFAULT_BIND.into(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl AdminSettings {
    /// Read settings from the environment. Call `dotenvy::dotenv()` first to honour a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AdminSettings::default();
        let body_limit = match lookup("ADMIN_BODY_LIMIT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("ADMIN_BODY_LIMIT '{}' is not a number, using {}", raw, DEFAULT_BODY_LIMIT);
                DEFAULT_BODY_LIMIT
            }),
            None => defaults.body_limit,
        };
        AdminSettings {
            exclude_models: lookup("ADMIN_EXCLUDE_MODELS")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            models_path: lookup("ADMIN_MODELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_path),
            bind: lookup("ADMIN_BIND").unwrap_or(defaults.bind),
            body_limit,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_environment_uses_defaults() {
        let s = AdminSettings::from_lookup(|_| None);
        assert!(s.exclude_models.is_empty());
        assert_eq!(s.bind, DEFAULT_BIND);
        assert_eq!(s.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn reads_exclusion_list() {
        let env: HashMap<&str, &str> = [
            ("ADMIN_EXCLUDE_MODELS", "AuditLog, Session,,"),
            ("ADMIN_BODY_LIMIT", "2048"),
        ]
        .into_iter()
        .collect();
        let s = AdminSettings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(s.exclude_models, ["AuditLog", "Session"]);
        assert_eq!(s.body_limit, 2048);
    }
}
