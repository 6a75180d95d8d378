use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Numeric bounds applied to the length-based mode before a prompt is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPolicy {
    pub min_length: u32,
    pub max_length: u32,
    pub min_count: u32,
    pub max_count: u32,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 30,
            min_count: 1,
            max_count: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub api_base: String,
    pub policy: InputPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.0-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            policy: InputPolicy::default(),
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
        let dir = exe.parent().unwrap_or(Path::new("."));
        dir.join("config.json")
    }

    /// Loads `config.json` next to the executable, then applies env overrides.
    pub fn load() -> Self {
        let mut cfg = Self::load_from(&Self::path());
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str::<Config>(&s).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Non-empty values returned by `lookup` replace the file settings.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = non_empty("GEMINI_API_KEY") {
            self.gemini_api_key = v;
        }
        if let Some(v) = non_empty("GEMINI_MODEL") {
            self.gemini_model = v;
        }
        if let Some(v) = non_empty("GEMINI_API_BASE") {
            self.api_base = v;
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }

    /// Full `generateContent` URL. Contains the API key, so never log it.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base.trim_end_matches('/'),
            self.gemini_model,
            self.gemini_api_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn default_endpoint_targets_flash_model() {
        let cfg = Config {
            gemini_api_key: "k3y".into(),
            ..Config::default()
        };
        assert_eq!(
            cfg.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=k3y"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let cfg = Config {
            api_base: "http://127.0.0.1:9000/".into(),
            gemini_model: "m".into(),
            ..Config::default()
        };
        assert_eq!(cfg.endpoint(), "http://127.0.0.1:9000/models/m:generateContent?key=");
    }

    #[test]
    fn env_overrides_skip_empty_values() {
        let env: HashMap<&str, &str> = [("GEMINI_API_KEY", "abc"), ("GEMINI_MODEL", "")].into();
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.gemini_api_key, "abc");
        assert_eq!(cfg.gemini_model, "gemini-2.0-flash");
        assert!(cfg.has_api_key());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("credgen-cfg-{}.json", std::process::id()));
        fs::write(&path, r#"{ "gemini_model": "gemini-pro", "policy": { "max_count": 50 } }"#).unwrap();
        let cfg = Config::load_from(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(cfg.gemini_model, "gemini-pro");
        assert_eq!(cfg.policy.max_count, 50);
        assert_eq!(cfg.policy.min_length, 6);
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn missing_or_malformed_file_falls_back_to_default() {
        let missing = std::env::temp_dir().join("credgen-does-not-exist.json");
        assert_eq!(Config::load_from(&missing).policy, InputPolicy::default());

        let path = std::env::temp_dir().join(format!("credgen-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        let cfg = Config::load_from(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(cfg.gemini_model, "gemini-2.0-flash");
    }
}
