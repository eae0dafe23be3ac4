//! Loads `Workload` declarations from a directory of YAML files.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::models::error::ConfigError;
use crate::models::{Workload, WorkloadFile, WORKLOAD_CONFIG_VERSION};

/// Maximum size of a single workload file. Generous for a handful of YAML
/// fields, but bounds memory use against an accidentally (or maliciously)
/// huge file landing in the config directory.
const MAX_WORKLOAD_FILE_BYTES: u64 = 64 * 1024;

/// Recursively loads every `*.yml`/`*.yaml` file under `dir` into a
/// normalized `Workload`. Files are read in directory-walk order, which is
/// the order they'll be registered with the engine (and therefore the
/// order ambiguous-pattern rejection is evaluated in).
pub fn load_workloads(dir: &Path) -> Result<Vec<Workload>, ConfigError> {
    let mut workloads = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| ConfigError::Io {
            dir: dir.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let is_yaml = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        );
        if !is_yaml {
            continue;
        }

        workloads.push(load_one(entry.path())?);
    }

    Ok(workloads)
}

fn load_one(path: &Path) -> Result<Workload, ConfigError> {
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::Io {
        dir: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_WORKLOAD_FILE_BYTES {
        return Err(ConfigError::Malformed {
            path: path.display().to_string(),
            reason: format!(
                "file is {} bytes, exceeds the {MAX_WORKLOAD_FILE_BYTES} byte limit",
                metadata.len()
            ),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| ConfigError::Io {
        dir: path.display().to_string(),
        source: e,
    })?;

    let file: WorkloadFile = serde_yaml::from_slice(&bytes).map_err(|e| ConfigError::Malformed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if file.version != WORKLOAD_CONFIG_VERSION {
        return Err(ConfigError::Invalid {
            path: path.display().to_string(),
        });
    }

    let checksum = hex::encode(Sha256::digest(&bytes));
    let default_name = file_stem(path);
    let source_filename = path.display().to_string();

    Ok(Workload::from_file(file, &default_name, source_filename, checksum))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolves the configured workload directory: `COD_CONFIG_DIR` if set,
/// otherwise `./config`.
pub fn config_dir_from_env() -> PathBuf {
    std::env::var("COD_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./config"))
}
