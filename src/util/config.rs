//! Configuration file support.
//!
//! The config carries the policy data of a migration: which folders and
//! executables to leave behind, library names and link tokens, the
//! template keyword, and post-generation header edits. Every field
//! defaults to the policy of the legacy tree this tool was written for,
//! so no file is needed for a standard run.
//!
//! Lookup order:
//! 1. `--config <file>` (must exist and parse)
//! 2. User config: `<config dir>/amforge/config.toml`
//! 3. Defaults

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub relocate: RelocateConfig,
    pub library: LibraryConfig,
    pub apps: AppsConfig,
    pub extra: ExtraConfig,
    pub template: TemplateConfig,
    pub package: PackageConfig,
}

/// What the tree walk leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocateConfig {
    /// Directory names skipped with everything beneath them
    /// (the GUI toolkit module and the documentation system).
    pub skip_dirs: Vec<String>,

    /// Executables that are never relocated.
    pub skip_apps: Vec<String>,

    /// Literal token marking headers that need meta-object compilation.
    pub moc_marker: String,
}

impl Default for RelocateConfig {
    fn default() -> Self {
        RelocateConfig {
            skip_dirs: vec!["qisis".into(), "docsys".into()],
            skip_apps: ["cnethist", "hist", "phohillier", "spkwriter", "cam2map"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            moc_marker: "Q_OBJECT".into(),
        }
    }
}

/// Library naming and linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Core library is built as `lib<core_name>.la`.
    pub core_name: String,

    /// Link dependency token of the Core library.
    pub core_libadd: String,

    /// Link dependency of each plugin library; empty for none.
    pub plugin_libadd: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            core_name: "isis3".into(),
            core_libadd: "@PKG_ISISALLDEPS_LIBS@".into(),
            plugin_libadd: String::new(),
        }
    }
}

impl LibraryConfig {
    pub fn core_archive(&self) -> String {
        format!("lib{}.la", self.core_name)
    }
}

/// Executable linkage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    /// Extra link entries per app, added after the Core library.
    pub ldadd: BTreeMap<String, Vec<String>>,
}

/// Files installed from the `extra` directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraConfig {
    /// Data files copied from the legacy root.
    pub data_files: Vec<String>,
}

impl Default for ExtraConfig {
    fn default() -> Self {
        ExtraConfig {
            data_files: vec!["IsisPreferences".into(), "version".into()],
        }
    }
}

/// Configure template contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// First token of a control line in `configure.ac.in`.
    pub keyword: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        TemplateConfig {
            keyword: "AMFORGE_INSERT_HERE".into(),
        }
    }
}

/// Edits applied after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub substitutions: Vec<Substitution>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        let bundle = PathBuf::from("include/BundleAdjust.h");
        PackageConfig {
            substitutions: vec![
                Substitution {
                    file: bundle.clone(),
                    pattern: "CHOLMOD/".into(),
                    replace: String::new(),
                },
                Substitution {
                    file: bundle,
                    pattern: "UFconfig".into(),
                    replace: "SuiteSparse_config".into(),
                },
            ],
        }
    }
}

/// A regex replacement applied to one output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    /// Path relative to the output root.
    pub file: PathBuf,
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Resolve the configuration for a run.
pub fn load_config(explicit: Option<&Path>, user: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    Ok(user.map(Config::load_or_default).unwrap_or_default())
}

/// Get the user config path (`<config dir>/amforge/config.toml`).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "amforge")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_legacy_policy() {
        let config = Config::default();
        assert_eq!(config.relocate.skip_dirs, vec!["qisis", "docsys"]);
        assert!(config.relocate.skip_apps.contains(&"cam2map".to_string()));
        assert_eq!(config.relocate.moc_marker, "Q_OBJECT");
        assert_eq!(config.library.core_archive(), "libisis3.la");
        assert!(config.library.plugin_libadd.is_empty());
        assert_eq!(config.package.substitutions.len(), 2);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[library]
core_name = "legacy"

[apps.ldadd]
qview = ["-lQtGui"]

[[package.substitutions]]
file = "include/A.h"
pattern = "old"
replace = "new"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.library.core_archive(), "liblegacy.la");
        assert_eq!(config.library.core_libadd, "@PKG_ISISALLDEPS_LIBS@");
        assert_eq!(config.apps.ldadd["qview"], vec!["-lQtGui"]);
        assert_eq!(config.package.substitutions.len(), 1);
        assert_eq!(config.relocate, RelocateConfig::default());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let user = tmp.path().join("user.toml");
        std::fs::write(&user, "[template]\nkeyword = \"USER_KEY\"\n").unwrap();
        let explicit = tmp.path().join("explicit.toml");
        std::fs::write(&explicit, "[template]\nkeyword = \"CLI_KEY\"\n").unwrap();

        let config = load_config(Some(&explicit), Some(&user)).unwrap();
        assert_eq!(config.template.keyword, "CLI_KEY");

        let config = load_config(None, Some(&user)).unwrap();
        assert_eq!(config.template.keyword, "USER_KEY");

        let config = load_config(None, None).unwrap();
        assert_eq!(config, Config::default());

        assert!(load_config(Some(&tmp.path().join("missing.toml")), None).is_err());
    }

    #[test]
    fn test_broken_user_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let user = tmp.path().join("user.toml");
        std::fs::write(&user, "[template\n").unwrap();

        assert_eq!(Config::load_or_default(&user), Config::default());
    }
}
