//! Configuration module for putsync.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use itertools::Itertools;
use serde::Deserialize;

use media_tools::print_error;

use crate::PutSyncArgs;

/// Default rclone remote name.
const DEFAULT_REMOTE: &str = "putio";

/// Default local media library root.
const DEFAULT_MEDIA_ROOT: &str = "/volume1/media";

/// Root items that are never offered.
const DEFAULT_BLOCKLIST: &[&str] = &["chill.institute"];

/// Default listing depth for the remote snapshot.
const DEFAULT_MAX_DEPTH: usize = 5;

/// User configuration from the config file.
#[derive(Debug, Default, Deserialize)]
pub struct PutSyncConfig {
    /// rclone remote name.
    #[serde(default)]
    remote: Option<String>,
    /// Local media library root.
    #[serde(default)]
    media_root: Option<PathBuf>,
    /// Root names to skip.
    #[serde(default)]
    blocklist: Vec<String>,
    /// Remote listing depth.
    #[serde(default)]
    max_depth: Option<usize>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    verbose: bool,
    /// Write a run log file. Enabled unless set to false.
    #[serde(default)]
    log: Option<bool>,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    putsync: PutSyncConfig,
}

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) remote: String,
    pub(crate) media_root: PathBuf,
    pub(crate) blocklist: Vec<String>,
    pub(crate) max_depth: usize,
    pub(crate) dryrun: bool,
    pub(crate) verbose: bool,
    pub(crate) log: bool,
}

impl PutSyncConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    pub fn get_user_config() -> Self {
        media_tools::config::CONFIG_PATH
            .as_deref()
            .filter(|path| path.exists())
            .and_then(|path| {
                fs::read_to_string(path)
                    .map_err(|error| {
                        print_error!("Error reading config file {}: {error}", path.display());
                    })
                    .ok()
            })
            .and_then(|config_string| {
                Self::from_toml_str(&config_string)
                    .map_err(|error| {
                        print_error!("Error parsing config file: {error}");
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.putsync)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: PutSyncArgs, user_config: PutSyncConfig) -> Self {
        let blocklist: Vec<String> = DEFAULT_BLOCKLIST
            .iter()
            .map(ToString::to_string)
            .chain(user_config.blocklist)
            .chain(args.block)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unique()
            .collect();

        let remote = args
            .remote
            .or(user_config.remote)
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string());

        let media_root = args
            .media_root
            .or(user_config.media_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT));

        Self {
            remote,
            media_root,
            blocklist,
            max_depth: args.depth.or(user_config.max_depth).unwrap_or(DEFAULT_MAX_DEPTH),
            dryrun: args.print || user_config.dryrun,
            verbose: args.verbose || user_config.verbose,
            log: !args.no_log && user_config.log.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod putsync_config_tests {
    use super::*;

    fn empty_args() -> PutSyncArgs {
        PutSyncArgs {
            remote: None,
            media_root: None,
            block: Vec::new(),
            depth: None,
            print: false,
            no_log: false,
            completion: None,
            verbose: false,
        }
    }

    #[test]
    fn from_toml_str_parses_empty_config() {
        let config = PutSyncConfig::from_toml_str("").expect("should parse empty config");
        assert!(config.remote.is_none());
        assert!(config.media_root.is_none());
        assert!(config.blocklist.is_empty());
        assert!(config.max_depth.is_none());
        assert!(!config.dryrun);
        assert!(!config.verbose);
        assert!(config.log.is_none());
    }

    #[test]
    fn from_toml_str_parses_putsync_section() {
        let toml = r#"
[putsync]
remote = "seedbox"
media_root = "/mnt/media"
blocklist = ["incoming", "trash"]
max_depth = 3
dryrun = true
verbose = true
log = false
"#;
        let config = PutSyncConfig::from_toml_str(toml).expect("should parse config");
        assert_eq!(config.remote.as_deref(), Some("seedbox"));
        assert_eq!(config.media_root, Some(PathBuf::from("/mnt/media")));
        assert_eq!(config.blocklist, vec!["incoming", "trash"]);
        assert_eq!(config.max_depth, Some(3));
        assert!(config.dryrun);
        assert!(config.verbose);
        assert_eq!(config.log, Some(false));
    }

    #[test]
    fn from_toml_str_ignores_other_sections() {
        let toml = r"
[other_section]
some_value = true

[putsync]
verbose = true
";
        let config = PutSyncConfig::from_toml_str(toml).expect("should parse config");
        assert!(config.verbose);
        assert!(!config.dryrun);
    }

    #[test]
    fn from_toml_str_invalid_toml_returns_error() {
        assert!(PutSyncConfig::from_toml_str("this is not valid toml {{{").is_err());
    }

    #[test]
    fn defaults_without_args_or_config() {
        let config = Config::from_args(empty_args(), PutSyncConfig::default());
        assert_eq!(config.remote, "putio");
        assert_eq!(config.media_root, PathBuf::from("/volume1/media"));
        assert_eq!(config.blocklist, vec!["chill.institute"]);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.dryrun);
        assert!(config.log);
    }

    #[test]
    fn args_take_priority_over_user_config() {
        let user_config = PutSyncConfig::from_toml_str(
            r#"
[putsync]
remote = "seedbox"
media_root = "/mnt/media"
max_depth = 3
"#,
        )
        .expect("should parse config");
        let args = PutSyncArgs {
            remote: Some("other".to_string()),
            depth: Some(7),
            print: true,
            ..empty_args()
        };
        let config = Config::from_args(args, user_config);
        assert_eq!(config.remote, "other");
        assert_eq!(config.media_root, PathBuf::from("/mnt/media"));
        assert_eq!(config.max_depth, 7);
        assert!(config.dryrun);
    }

    #[test]
    fn blocklists_are_merged_without_duplicates() {
        let user_config = PutSyncConfig::from_toml_str(
            r#"
[putsync]
blocklist = ["chill.institute", "incoming"]
"#,
        )
        .expect("should parse config");
        let args = PutSyncArgs {
            block: vec!["incoming".to_string(), "  ".to_string(), "trash".to_string()],
            ..empty_args()
        };
        let config = Config::from_args(args, user_config);
        assert_eq!(config.blocklist, vec!["chill.institute", "incoming", "trash"]);
    }

    #[test]
    fn log_can_be_disabled() {
        let args = PutSyncArgs {
            no_log: true,
            ..empty_args()
        };
        assert!(!Config::from_args(args, PutSyncConfig::default()).log);

        let user_config = PutSyncConfig::from_toml_str("[putsync]\nlog = false").expect("should parse config");
        assert!(!Config::from_args(empty_args(), user_config).log);
    }
}
