#![deny(warnings)]

//! Load auction policies from a directory of YAML files.
//!
//! Layout (every file optional):
//! - `policy.yaml`: partial overrides applied to the built-in base policy
//! - `easy.yaml`, `normal.yaml`, `hard.yaml`: per-difficulty overlays, layered
//!   on top of the built-in overlays
//!
//! Files are plain value trees in the policy's camelCase shape; they are
//! merged and validated by [`auction_core::merge_policy`].

use auction_core::{Difficulty, PolicyError, PolicyStore};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming the policy directory.
pub const POLICY_DIR_ENV: &str = "AUCTION_POLICY_DIR";
pub const BASE_FILE: &str = "policy.yaml";

#[derive(Debug, Error)]
pub enum PolicyLoadError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Explicit directory first, then `AUCTION_POLICY_DIR`.
pub fn resolve_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(POLICY_DIR_ENV).map(PathBuf::from))
}

/// Store from the resolved directory, or the built-in store when none is set.
pub fn load(explicit: Option<&Path>) -> Result<PolicyStore, PolicyLoadError> {
    match resolve_dir(explicit) {
        Some(dir) => load_dir(&dir),
        None => {
            debug!("no policy directory configured, using built-in policy");
            Ok(PolicyStore::default())
        }
    }
}

/// Layer every policy file found in `dir` onto the built-in store.
///
/// Each merged difficulty is checked eagerly so a bad overlay fails at load
/// time rather than on the first round that uses it.
pub fn load_dir(dir: &Path) -> Result<PolicyStore, PolicyLoadError> {
    let mut store = PolicyStore::default();
    if let Some(base) = read_tree(&dir.join(BASE_FILE))? {
        store = store.with_base_overrides(&base)?;
    }
    for difficulty in Difficulty::ALL {
        let path = dir.join(format!("{}.yaml", difficulty.as_str()));
        if let Some(overlay) = read_tree(&path)? {
            store = store.with_overlay(difficulty, overlay);
        }
        store.for_difficulty(difficulty)?;
    }
    info!(dir = %dir.display(), version = %store.base().version, "policy loaded");
    Ok(store)
}

/// `None` for a missing or empty file.
fn read_tree(path: &Path) -> Result<Option<Value>, PolicyLoadError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PolicyLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let tree: Value = serde_yaml::from_str(&text).map_err(|source| PolicyLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if tree.is_null() {
        return Ok(None);
    }
    info!(path = %path.display(), "policy file read");
    Ok(Some(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn assets() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/policy")
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("policykit-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_shipped_assets() {
        let store = load_dir(&assets()).unwrap();
        assert_eq!(store.base().version, "2024.1-training");
        assert_eq!(store.base().cost.legal_fees, Decimal::new(1_800_000, 0));

        let easy = store.for_difficulty(Difficulty::Easy).unwrap();
        assert_eq!(easy.competitor.count, 2);
        assert_eq!(easy.competitor.window_low, Decimal::new(88, 2));
        // from the built-in easy overlay
        assert_eq!(easy.competitor.window_high, Decimal::new(97, 2));

        let hard = store.for_difficulty(Difficulty::Hard).unwrap();
        assert_eq!(hard.competitor.count, 6);
        assert_eq!(hard.valuation.clamp_max, Decimal::new(106, 2));
        assert_eq!(hard.competitor.overpay_tolerance, Decimal::new(11, 1));
        assert_eq!(hard.valuation.initial_min_bid_rate, Decimal::new(7, 1));
        assert_eq!(hard.rights.eviction_base_cost, Decimal::new(3_500_000, 0));

        let normal = store.for_difficulty(Difficulty::Normal).unwrap();
        assert_eq!(normal.competitor.count, 4);
        assert_eq!(normal.competitor.window_high, Decimal::new(103, 2));
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = scratch("empty");
        let store = load_dir(&dir).unwrap();
        assert_eq!(
            store.for_difficulty(Difficulty::Hard).unwrap(),
            PolicyStore::default().for_difficulty(Difficulty::Hard).unwrap()
        );
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = scratch("malformed");
        fs::write(dir.join("hard.yaml"), "competitor: [unclosed").unwrap();
        assert!(matches!(load_dir(&dir), Err(PolicyLoadError::Parse { .. })));
    }

    #[test]
    fn invalid_overlay_fails_at_load() {
        let dir = scratch("invalid");
        fs::write(dir.join("easy.yaml"), "competitor:\n  count: 40\n").unwrap();
        assert!(matches!(load_dir(&dir), Err(PolicyLoadError::Policy(_))));
    }

    #[test]
    fn overpay_tolerance_below_window_fails_at_load() {
        let dir = scratch("tolerance");
        fs::write(dir.join("hard.yaml"), "competitor:\n  overpayTolerance: \"1.05\"\n").unwrap();
        match load_dir(&dir) {
            Err(PolicyLoadError::Policy(PolicyError::Invalid(msg))) => {
                assert!(msg.contains("overpayTolerance"))
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn shipped_assets_keep_rivals_inside_the_tolerance() {
        let store = load_dir(&assets()).unwrap();
        for difficulty in Difficulty::ALL {
            let policy = store.for_difficulty(difficulty).unwrap();
            assert_eq!(policy.competitor.overpay_tolerance, Decimal::new(11, 1));
            assert!(policy.competitor.window_high <= policy.competitor.overpay_tolerance);
        }
    }

    #[test]
    fn explicit_dir_wins_over_environment() {
        let dir = assets();
        assert_eq!(resolve_dir(Some(&dir)), Some(dir.clone()));
        let store = load(Some(&dir)).unwrap();
        assert_eq!(store.base().version, "2024.1-training");
    }
}
