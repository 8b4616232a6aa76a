//! Configuration discovery and effective settings resolution.
//!
//! Promptlint reads `promptlint.toml|yaml|yml` from the start directory (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `dir`: `.`
//! - `extension`: `txt`
//! - `output`: `human`
//! - `fix`: false
//! - `llm.enabled`: true
//! - `llm.model` / `llm.max_tokens`: transport defaults
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::llm;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Semantic-analysis configuration section under `[llm]`.
pub struct LlmCfg {
    pub enabled: Option<bool>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `promptlint.toml|yaml`.
pub struct PromptlintConfig {
    pub dir: Option<String>,
    pub extension: Option<String>,
    pub output: Option<String>,
    pub fix: Option<bool>,
    #[serde(default)]
    pub llm: Option<LlmCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub dir: String,
    pub extension: String,
    pub output: String,
    pub fix: bool,
    pub semantic: bool,
    pub model: String,
    pub max_tokens: u32,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when a `promptlint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("promptlint.toml").exists()
            || cur.join("promptlint.yaml").exists()
            || cur.join("promptlint.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `PromptlintConfig` from `promptlint.toml` or `promptlint.yaml|yml`
/// if present.
pub fn load_config(root: &Path) -> Option<PromptlintConfig> {
    let toml_path = root.join("promptlint.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: PromptlintConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["promptlint.yaml", "promptlint.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: PromptlintConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// Discovery starts at the scanned directory (or `.`) and walks upward, so
/// tests can pass an explicit directory and avoid global CWD races.
pub fn resolve_effective(
    cli_dir: Option<&str>,
    cli_extension: Option<&str>,
    cli_output: Option<&str>,
    cli_fix: Option<bool>,
    cli_no_semantic: Option<bool>,
) -> Effective {
    let start = PathBuf::from(cli_dir.unwrap_or("."));
    let root = detect_root(&start);
    let cfg = load_config(&root).unwrap_or_default();

    let dir = cli_dir
        .map(|s| s.to_string())
        .or(cfg.dir)
        .unwrap_or_else(|| ".".to_string());

    let extension = cli_extension
        .map(|s| s.to_string())
        .or(cfg.extension)
        .unwrap_or_else(|| "txt".to_string());

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let fix = cli_fix.or(cfg.fix).unwrap_or(false);

    let semantic = match cli_no_semantic {
        Some(true) => false,
        _ => cfg
            .llm
            .as_ref()
            .and_then(|l| l.enabled)
            .unwrap_or(true),
    };

    let model = cfg
        .llm
        .as_ref()
        .and_then(|l| l.model.clone())
        .unwrap_or_else(|| llm::DEFAULT_MODEL.to_string());

    let max_tokens = cfg
        .llm
        .as_ref()
        .and_then(|l| l.max_tokens)
        .unwrap_or(llm::DEFAULT_MAX_TOKENS);

    Effective {
        root,
        dir,
        extension,
        output,
        fix,
        semantic,
        model,
        max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("promptlint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
dir = "prompts"
extension = "md"
output = "json"
fix = true
[llm]
enabled = false
model = "claude-haiku-4-5"
    "#
        )
        .unwrap();

        let cfg = load_config(root).unwrap();
        assert_eq!(cfg.dir.as_deref(), Some("prompts"));
        assert_eq!(cfg.extension.as_deref(), Some("md"));
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.fix, Some(true));
        let llm_cfg = cfg.llm.unwrap();
        assert_eq!(llm_cfg.enabled, Some(false));
        assert_eq!(llm_cfg.model.as_deref(), Some("claude-haiku-4-5"));

        assert_eq!(detect_root(&root.join("prompts")), root);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("promptlint.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
dir: prompts
output: human
            "#
        )
        .unwrap();

        let cfg = load_config(root).unwrap();
        assert_eq!(cfg.dir.as_deref(), Some("prompts"));
        assert_eq!(cfg.output.as_deref(), Some("human"));
        // Unspecified sections stay None and resolve to defaults later.
        assert!(cfg.extension.is_none());
        assert!(cfg.llm.is_none());
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("promptlint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
extension = "md"
output = "human"
fix = false
    "#
        )
        .unwrap();

        let eff = resolve_effective(
            root.to_str(),
            Some("text"),
            Some("json"),
            Some(true),
            Some(true),
        );
        assert_eq!(eff.root, root);
        assert_eq!(eff.extension, "text");
        assert_eq!(eff.output, "json");
        assert!(eff.fix);
        assert!(!eff.semantic);
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let dir = tempdir().unwrap();
        let eff = resolve_effective(dir.path().to_str(), None, None, None, None);
        assert_eq!(eff.extension, "txt");
        assert_eq!(eff.output, "human");
        assert!(!eff.fix);
        assert!(eff.semantic);
        assert_eq!(eff.model, llm::DEFAULT_MODEL);
        assert_eq!(eff.max_tokens, llm::DEFAULT_MAX_TOKENS);
    }
}
