//! Compiled contract artifacts.
//!
//! Reads Foundry (`out/Foo.sol/Foo.json`, bytecode as `{ "object": "0x.." }`)
//! and Hardhat (bytecode as a plain string) layouts. Files without a
//! top-level `abi` are skipped.

use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::blockchain::types::{KettleError, KettleResult};

/// One compiled contract.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// File stem, normally the contract name.
    pub name: String,
    pub path: PathBuf,
    pub abi: JsonAbi,
    /// Creation bytecode, when present and fully linked.
    pub bytecode: Option<Bytes>,
}

fn artifact_error(path: &Path, reason: impl ToString) -> KettleError {
    KettleError::Artifact {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Parse an artifact from JSON text. Returns `None` when there is no `abi`.
pub fn parse_artifact(path: &Path, content: &str) -> KettleResult<Option<Artifact>> {
    let mut json: Value = serde_json::from_str(content).map_err(|e| artifact_error(path, e))?;

    let Some(abi) = json.get_mut("abi").map(Value::take) else {
        return Ok(None);
    };
    let abi: JsonAbi = serde_json::from_value(abi).map_err(|e| artifact_error(path, e))?;

    let bytecode = match json.get("bytecode") {
        Some(Value::String(code)) => Some(code.as_str()),
        Some(Value::Object(obj)) => obj.get("object").and_then(Value::as_str),
        _ => None,
    }
    .and_then(|code| match code.parse::<Bytes>() {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => None,
        Err(e) => {
            // Unlinked library placeholders are not hex
            tracing::debug!(path = %path.display(), error = %e, "Ignoring unusable bytecode");
            None
        }
    });

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Some(Artifact {
        name,
        path: path.to_path_buf(),
        abi,
        bytecode,
    }))
}

/// Load one artifact file.
pub fn load_artifact(path: &Path) -> KettleResult<Option<Artifact>> {
    let content = fs::read_to_string(path).map_err(|e| artifact_error(path, e))?;
    parse_artifact(path, &content)
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> KettleResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| artifact_error(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| artifact_error(dir, e))?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}

/// Load every artifact under `dir`, recursively, sorted by path.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_dir(dir: &Path) -> KettleResult<Vec<Artifact>> {
    let mut files = Vec::new();
    collect_json_files(dir, &mut files)?;
    files.sort();

    let mut artifacts = Vec::new();
    for path in files {
        match load_artifact(&path) {
            Ok(Some(artifact)) => artifacts.push(artifact),
            Ok(None) => tracing::trace!(path = %path.display(), "Not an artifact"),
            Err(e) => tracing::warn!(error = %e, "Skipping artifact"),
        }
    }

    tracing::debug!(dir = %dir.display(), count = artifacts.len(), "Loaded artifacts");
    Ok(artifacts)
}
