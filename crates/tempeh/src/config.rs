//! Configuration loading and management.

use crate::cli::Args;
use camino::Utf8PathBuf;
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "tempeh.json";

/// Template file extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = ".tmph.html";

const DEFAULT_IGNORE: &[&str] = &["**/node_modules/**", "**/dist/**", "**/.git/**"];

/// Contents of `tempeh.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// File name suffixes treated as templates.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Extra ignore patterns.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ConfigFile {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to parse {}", path.display()))
    }

    /// Find `tempeh.json` in a directory or its parents.
    pub fn find(dir: &Path) -> Option<Utf8PathBuf> {
        let mut current = dir;
        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Utf8PathBuf::from_path_buf(candidate).ok();
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }
}

/// Resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace: PathBuf,
    /// Path to the configuration file, if one was used.
    pub config_path: Option<PathBuf>,
    /// File name suffixes to process.
    pub extensions: Vec<String>,
    /// Ignore patterns.
    pub ignore_patterns: Vec<String>,
    ignore: GlobSet,
}

impl Config {
    /// Load configuration from CLI arguments and workspace.
    pub fn load(workspace: &Path, args: &Args) -> Result<Self> {
        let config_path = args.config.clone().or_else(|| {
            ConfigFile::find(workspace).map(|p| p.into_std_path_buf())
        });

        let file = match &config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let extensions = if file.extensions.is_empty() {
            vec![DEFAULT_EXTENSION.to_string()]
        } else {
            file.extensions
        };

        let mut ignore_patterns: Vec<String> =
            DEFAULT_IGNORE.iter().map(|p| p.to_string()).collect();
        ignore_patterns.extend(file.ignore);
        ignore_patterns.extend(args.ignore.iter().cloned());

        let mut builder = GlobSetBuilder::new();
        for pattern in &ignore_patterns {
            let glob = Glob::new(pattern)
                .into_diagnostic()
                .wrap_err_with(|| format!("Invalid ignore pattern {pattern:?}"))?;
            builder.add(glob);
        }
        let ignore = builder.build().into_diagnostic()?;

        Ok(Self {
            workspace: workspace.to_path_buf(),
            config_path,
            extensions,
            ignore_patterns,
            ignore,
        })
    }

    /// Check if a file has a template extension.
    pub fn is_template(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Check if a path matches an ignore pattern.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.workspace).unwrap_or(path);
        self.ignore.is_match(relative) || self.ignore.is_match(path)
    }

    /// Check if a file should be processed.
    pub fn should_process(&self, path: &Path) -> bool {
        self.is_template(path) && !self.is_ignored(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), &Args::parse_from(["tempeh"])).unwrap();

        assert_eq!(config.config_path, None);
        assert_eq!(config.extensions, vec![".tmph.html".to_string()]);
        assert!(config.should_process(&dir.path().join("pages/index.tmph.html")));
        assert!(!config.should_process(&dir.path().join("pages/index.html")));
        assert!(!config.should_process(&dir.path().join("node_modules/pkg/a.tmph.html")));
        assert!(!config.should_process(&dir.path().join("dist/a.tmph.html")));
    }

    #[test]
    fn test_config_file_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "extensions": [".html"], "ignore": ["**/drafts/**"] }"#,
        )
        .unwrap();
        let nested = dir.path().join("site");
        std::fs::create_dir(&nested).unwrap();

        let args = Args::parse_from(["tempeh", "--ignore", "**/*.partial.html"]);
        let config = Config::load(&nested, &args).unwrap();

        assert_eq!(
            config.config_path,
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
        assert_eq!(config.extensions, vec![".html".to_string()]);
        assert!(config.should_process(&nested.join("index.html")));
        assert!(!config.should_process(&nested.join("drafts/post.html")));
        assert!(!config.should_process(&nested.join("nav.partial.html")));
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(["tempeh", "--ignore", "a[b"]);
        assert!(Config::load(dir.path(), &args).is_err());
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, "{ not json").unwrap();

        let args = Args::parse_from(["tempeh", "--config", path.to_str().unwrap()]);
        assert!(Config::load(dir.path(), &args).is_err());
    }
}
