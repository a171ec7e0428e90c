use crate::error::{PulseError, Result};
use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Recognized option keys
// ---------------------------------------------------------------------------

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
pub const ENV_STORE_CREDENTIAL: &str = "SUPABASE_SERVICE_ROLE";
pub const ENV_MODEL: &str = "PULSE_MODEL";

// ---------------------------------------------------------------------------
// AnalyzerConfig
// ---------------------------------------------------------------------------

/// Typed configuration for one analyzer invocation.
///
/// Values come from a flat KEY=VALUE file first, with the process
/// environment as the fallback for keys the file does not define. Loading
/// never mutates the process environment. A missing required option fails
/// fast with the offending key's name.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub anthropic_api_key: String,
    pub supabase_url: String,
    pub supabase_service_role: String,
    /// Model identifier override; the model client picks its default when absent.
    pub model: Option<String>,
}

impl AnalyzerConfig {
    /// Load configuration from `env_file` (skipped if absent) with the
    /// process environment as fallback.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let file_pairs = match env_file {
            Some(path) if path.exists() => parse_env_pairs(&std::fs::read_to_string(path)?),
            _ => HashMap::new(),
        };
        Self::from_sources(&file_pairs, |key| std::env::var(key).ok())
    }

    /// Resolve options from explicit sources. Exposed so tests can inject
    /// both layers without touching the real process environment.
    pub fn from_sources(
        file_pairs: &HashMap<String, String>,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let lookup = |key: &str| -> Option<String> {
            file_pairs
                .get(key)
                .cloned()
                .or_else(|| env_lookup(key))
                .filter(|v| !v.trim().is_empty())
        };
        let required =
            |key: &'static str| lookup(key).ok_or(PulseError::MissingConfig(key));

        Ok(Self {
            anthropic_api_key: required(ENV_API_KEY)?,
            supabase_url: required(ENV_STORE_URL)?,
            supabase_service_role: required(ENV_STORE_CREDENTIAL)?,
            model: lookup(ENV_MODEL),
        })
    }
}

// ---------------------------------------------------------------------------
// KEY=VALUE parsing
// ---------------------------------------------------------------------------

/// Parse flat KEY=VALUE content. Comment and blank lines are skipped; the
/// first `=` splits key from value; later duplicates win.
fn parse_env_pairs(content: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            pairs.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    pairs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let pairs = parse_env_pairs("# header\n\nFOO=bar\nBAZ=qux\n");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["FOO"], "bar");
        assert_eq!(pairs["BAZ"], "qux");
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let pairs = parse_env_pairs("URL=https://example.com/?a=1\n");
        assert_eq!(pairs["URL"], "https://example.com/?a=1");
    }

    #[test]
    fn parse_ignores_lines_without_equals() {
        let pairs = parse_env_pairs("not a pair\nKEY=v\n");
        assert_eq!(pairs.len(), 1);
    }

    fn full_file() -> HashMap<String, String> {
        parse_env_pairs(
            "ANTHROPIC_API_KEY=sk-ant-x\nSUPABASE_URL=https://p.supabase.co\nSUPABASE_SERVICE_ROLE=role-key\n",
        )
    }

    #[test]
    fn from_sources_reads_file_values() {
        let cfg = AnalyzerConfig::from_sources(&full_file(), no_env).unwrap();
        assert_eq!(cfg.anthropic_api_key, "sk-ant-x");
        assert_eq!(cfg.supabase_url, "https://p.supabase.co");
        assert_eq!(cfg.supabase_service_role, "role-key");
        assert!(cfg.model.is_none());
    }

    #[test]
    fn file_wins_over_environment() {
        let cfg = AnalyzerConfig::from_sources(&full_file(), |key| {
            (key == ENV_API_KEY).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(cfg.anthropic_api_key, "sk-ant-x");
    }

    #[test]
    fn environment_fills_missing_file_keys() {
        let mut file = full_file();
        file.remove(ENV_STORE_CREDENTIAL);
        let cfg = AnalyzerConfig::from_sources(&file, |key| {
            (key == ENV_STORE_CREDENTIAL).then(|| "env-role".to_string())
        })
        .unwrap();
        assert_eq!(cfg.supabase_service_role, "env-role");
    }

    #[test]
    fn missing_required_key_names_the_key() {
        let mut file = full_file();
        file.remove(ENV_STORE_URL);
        let err = AnalyzerConfig::from_sources(&file, no_env).unwrap_err();
        match err {
            PulseError::MissingConfig(key) => assert_eq!(key, ENV_STORE_URL),
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut file = full_file();
        file.insert(ENV_API_KEY.to_string(), "   ".to_string());
        let err = AnalyzerConfig::from_sources(&file, no_env).unwrap_err();
        assert!(matches!(err, PulseError::MissingConfig(ENV_API_KEY)));
    }

    #[test]
    fn optional_model_is_picked_up() {
        let mut file = full_file();
        file.insert(ENV_MODEL.to_string(), "claude-opus-4-6".to_string());
        let cfg = AnalyzerConfig::from_sources(&file, no_env).unwrap();
        assert_eq!(cfg.model.as_deref(), Some("claude-opus-4-6"));
    }

    #[test]
    fn load_reads_env_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "ANTHROPIC_API_KEY=disk-key\nSUPABASE_URL=https://d.supabase.co\nSUPABASE_SERVICE_ROLE=disk-role\n",
        )
        .unwrap();
        let cfg = AnalyzerConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.anthropic_api_key, "disk-key");
    }
}
