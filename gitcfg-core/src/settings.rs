//! Host settings for gitcfg
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GITCFG_*)
//! 3. Config file (~/.config/gitcfg/config.toml)
//! 4. Default values
//!
//! They supply the defaults the adapter input may leave unset, and are
//! resolved once at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ResolveDefaults, DEFAULT_ENTRY_FILE, DEFAULT_REFERENCE};
use crate::{Error, Result};

/// Defaults applied to adapter input
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsSettings {
    /// Root for clones without a `clone_path` (system temp dir when unset)
    pub temp_root: Option<PathBuf>,

    /// Reference to check out when `ref` is unset
    pub reference: String,

    /// Entry file to load when `caddyfile` is unset
    pub entry_file: String,

    /// Namespace default clone paths by the remote's host and path
    pub namespace: bool,
}

impl Default for DefaultsSettings {
    fn default() -> Self {
        Self {
            temp_root: None,
            reference: DEFAULT_REFERENCE.to_string(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            namespace: true,
        }
    }
}

/// Settings for the downstream loader and the synchronization call
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadSettings {
    /// External interpreter invoked on the entry file (passthrough when unset)
    pub command: Option<String>,

    /// Deadline for one synchronization
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

/// Root settings structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Adapter input defaults
    pub defaults: DefaultsSettings,

    /// Loader and deadline settings
    pub load: LoadSettings,
}

impl Settings {
    /// Load settings from the default config file location
    ///
    /// Returns default settings if the file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/gitcfg/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gitcfg").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - GITCFG_TEMP_ROOT: Root for default clone paths
    /// - GITCFG_DEFAULT_REF: Reference used when none is given
    /// - GITCFG_ENTRY_FILE: Entry file used when none is given
    /// - GITCFG_NAMESPACE: `false` or `0` disables clone path namespacing
    /// - GITCFG_LOADER: External interpreter command
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(root) = var("GITCFG_TEMP_ROOT") {
            self.defaults.temp_root = Some(PathBuf::from(root));
        }

        if let Some(reference) = var("GITCFG_DEFAULT_REF") {
            self.defaults.reference = reference;
        }

        if let Some(entry) = var("GITCFG_ENTRY_FILE") {
            self.defaults.entry_file = entry;
        }

        if let Some(namespace) = var("GITCFG_NAMESPACE") {
            self.defaults.namespace = match namespace.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::Config(format!(
                        "GITCFG_NAMESPACE must be true or false, got '{}'",
                        other
                    )))
                }
            };
        }

        if let Some(command) = var("GITCFG_LOADER") {
            self.load.command = Some(command);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        temp_root: Option<PathBuf>,
        loader: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        if let Some(root) = temp_root {
            self.defaults.temp_root = Some(root);
        }

        if let Some(command) = loader {
            self.load.command = Some(command);
        }

        if let Some(t) = timeout {
            self.load.timeout = Some(t);
        }

        self
    }

    /// Load settings with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        temp_root: Option<PathBuf>,
        loader: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(temp_root, loader, timeout))
    }

    /// Build the defaults handed to the resolver
    pub fn resolve_defaults(&self) -> ResolveDefaults {
        let temp_root = self
            .defaults
            .temp_root
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        ResolveDefaults {
            temp_root,
            reference: self.defaults.reference.clone(),
            entry_file: self.defaults.entry_file.clone(),
            namespace: self.defaults.namespace,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.defaults.reference, "master");
        assert_eq!(settings.defaults.entry_file, "Caddyfile");
        assert!(settings.defaults.namespace);
        assert!(settings.load.command.is_none());
        assert!(settings.load.timeout.is_none());

        let defaults = settings.resolve_defaults();
        assert_eq!(defaults.temp_root, std::env::temp_dir());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[defaults]
temp_root = "/var/cache/gitcfg"
reference = "main"
namespace = false

[load]
command = "caddy"
timeout = "45s"
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(
            settings.defaults.temp_root,
            Some(PathBuf::from("/var/cache/gitcfg"))
        );
        assert_eq!(settings.defaults.reference, "main");
        // entry_file should use default
        assert_eq!(settings.defaults.entry_file, "Caddyfile");
        assert!(!settings.defaults.namespace);
        assert_eq!(settings.load.command.as_deref(), Some("caddy"));
        assert_eq!(settings.load.timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GITCFG_TEMP_ROOT", "/srv/clones"),
            ("GITCFG_DEFAULT_REF", "stable"),
            ("GITCFG_NAMESPACE", "off"),
        ]
        .into_iter()
        .collect();

        let settings = Settings::default()
            .with_overrides_from(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.defaults.temp_root, Some(PathBuf::from("/srv/clones")));
        assert_eq!(settings.defaults.reference, "stable");
        assert!(!settings.defaults.namespace);
    }

    #[test]
    fn test_bad_namespace_env() {
        let result =
            Settings::default().with_overrides_from(|name| {
                (name == "GITCFG_NAMESPACE").then(|| "maybe".to_string())
            });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let settings = Settings::default().with_cli_overrides(
            Some(PathBuf::from("/custom")),
            Some("caddy".to_string()),
            Some(Duration::from_secs(5)),
        );

        assert_eq!(settings.defaults.temp_root, Some(PathBuf::from("/custom")));
        assert_eq!(settings.load.command.as_deref(), Some("caddy"));
        assert_eq!(settings.load.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            settings.resolve_defaults().temp_root,
            PathBuf::from("/custom")
        );
    }
}
