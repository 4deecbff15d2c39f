//! Artifact file loading
//!
//! Both artifacts are JSON documents carrying a `format_version` field.
//! Loading distinguishes a path that does not resolve (`ArtifactNotFound`)
//! from a file that exists but cannot be decoded or validated
//! (`ArtifactCorrupt`).

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Artifact layout version this build understands
pub const FORMAT_VERSION: u32 = 1;

/// Read and deserialize an artifact file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(Error::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::ArtifactNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::corrupt(path, e.to_string()),
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());

    serde_json::from_str(&content).map_err(|e| Error::corrupt(path, e.to_string()))
}

/// Reject artifacts written for another layout version
pub(crate) fn check_version(path: &Path, version: u32) -> Result<()> {
    if version != FORMAT_VERSION {
        return Err(Error::corrupt(
            path,
            format!(
                "unsupported format_version {} (expected {})",
                version, FORMAT_VERSION
            ),
        ));
    }
    Ok(())
}

/// Reject NaN and infinite parameters
pub(crate) fn check_finite<'a>(
    path: &Path,
    field: &str,
    values: impl IntoIterator<Item = &'a f64>,
) -> Result<()> {
    if values.into_iter().any(|v| !v.is_finite()) {
        return Err(Error::corrupt(path, format!("{} contains non-finite values", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Probe {
        format_version: u32,
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            read_json::<Probe>(&path),
            Err(Error::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_json::<Probe>(dir.path()),
            Err(Error::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95 not json").unwrap();
        assert!(matches!(
            read_json::<Probe>(file.path()),
            Err(Error::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn test_version_check() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"format_version": 7}"#).unwrap();
        let probe: Probe = read_json(file.path()).unwrap();
        assert!(check_version(file.path(), probe.format_version).is_err());
        assert!(check_version(file.path(), FORMAT_VERSION).is_ok());
    }

    #[test]
    fn test_non_finite_rejected() {
        let values = [1.0, f64::NAN];
        assert!(check_finite(Path::new("m.json"), "coef", &values).is_err());
        assert!(check_finite(Path::new("m.json"), "coef", &[0.5, -2.0]).is_ok());
    }
}
