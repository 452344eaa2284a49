use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Directory holding the workspace config and the default store.
pub const WORKSPACE_DIR: &str = ".bizdesk";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub support: SupportConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file; relative paths resolve against `.bizdesk/`.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    /// Move an open ticket to in-progress when an agent replies.
    #[serde(default = "default_true")]
    pub auto_progress_on_reply: bool,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            auto_progress_on_reply: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_true")]
    pub auto_select_first_channel: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            auto_select_first_channel: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Walk up from `start` to the nearest directory containing `.bizdesk/`.
#[must_use]
pub fn find_workspace_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(WORKSPACE_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load `<workspace_dir>/config.toml`, or defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(workspace_dir: &Path) -> Result<ProjectConfig> {
    let path = workspace_dir.join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/bizdesk/config.toml`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("bizdesk/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Absolute database path for a workspace.
#[must_use]
pub fn store_path(workspace_dir: &Path, config: &ProjectConfig) -> PathBuf {
    if config.store.path.is_absolute() {
        config.store.path.clone()
    } else {
        workspace_dir.join(&config.store.path)
    }
}

/// Project and user config plus the resolved output mode.
///
/// # Errors
///
/// Returns an error if either config file is malformed.
pub fn resolve_config(workspace_dir: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(workspace_dir)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "plain" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

/// Output mode precedence: `--json`, then `FORMAT`, then user config, then
/// TTY detection.
#[must_use]
pub fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> String {
    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

/// Body of the config file written by `bz init`.
pub const DEFAULT_PROJECT_CONFIG: &str = "[store]\n\
    path = \"bizdesk.sqlite3\"\n\
    \n\
    [support]\n\
    auto_progress_on_reply = true\n\
    \n\
    [chat]\n\
    auto_select_first_channel = true\n";

const fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from("bizdesk.sqlite3")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg.store.path, PathBuf::from("bizdesk.sqlite3"));
        assert!(cfg.support.auto_progress_on_reply);
        assert!(cfg.chat.auto_select_first_channel);
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let cfg: ProjectConfig = toml::from_str(DEFAULT_PROJECT_CONFIG).expect("parse");
        assert_eq!(cfg.store.path, default_store_path());
        assert!(cfg.support.auto_progress_on_reply);
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            root.path().join("config.toml"),
            "[support]\nauto_progress_on_reply = false\n",
        )
        .expect("write config");
        let cfg = load_project_config(root.path()).expect("load");
        assert!(!cfg.support.auto_progress_on_reply);
        assert!(cfg.chat.auto_select_first_channel);
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::write(root.path().join("config.toml"), "[store\npath = 1").expect("write");
        let err = load_project_config(root.path()).expect_err("parse failure");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn store_path_resolves_relative_to_workspace() {
        let cfg = ProjectConfig::default();
        assert_eq!(
            store_path(Path::new("/w/.bizdesk"), &cfg),
            PathBuf::from("/w/.bizdesk/bizdesk.sqlite3")
        );

        let mut absolute = ProjectConfig::default();
        absolute.store.path = PathBuf::from("/var/lib/bizdesk.db");
        assert_eq!(
            store_path(Path::new("/w/.bizdesk"), &absolute),
            PathBuf::from("/var/lib/bizdesk.db")
        );
    }

    #[test]
    fn find_workspace_dir_walks_up() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(WORKSPACE_DIR)).expect("mkdir");
        let nested = root.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir nested");
        assert_eq!(
            find_workspace_dir(&nested),
            Some(root.path().join(WORKSPACE_DIR))
        );
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output(true, Some("pretty"), Some("text")), "json");
    }

    #[test]
    fn env_beats_user_config_and_aliases_normalize() {
        assert_eq!(resolve_output(false, Some("json"), Some("human")), "pretty");
        assert_eq!(resolve_output(false, Some("plain"), Some("bogus")), "text");
    }

    #[test]
    fn user_config_parses_identity() {
        let cfg: UserConfig =
            toml::from_str("account = \"u-42\"\nemail = \"dana@example.com\"\noutput = \"json\"\n")
                .expect("parse");
        assert_eq!(cfg.account.as_deref(), Some("u-42"));
        assert_eq!(cfg.email.as_deref(), Some("dana@example.com"));
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
