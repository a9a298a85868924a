pub mod duration;
pub mod extract;
pub mod normalizer;
pub mod patterns;

use std::path::{Path, PathBuf};

use crate::encoding::decode_document_bytes;
use crate::error::{Result, SparkStatsError};
use crate::models::BattleFile;

/// A file that could not be loaded. It is excluded from every aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLoadError {
    pub name: String,
    pub message: String,
}

/// Outcome of loading a batch of files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub files: Vec<BattleFile>,
    pub errors: Vec<FileLoadError>,
}

/// Display name for a loaded file: its file name, or the full path if it has none.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse document bytes. Decoding never fails; JSON syntax errors do.
pub fn parse_battle_bytes(name: &str, bytes: &[u8]) -> Result<BattleFile> {
    let text = decode_document_bytes(bytes);
    let content = serde_json::from_str(&text).map_err(|e| {
        log::debug!("JSON parse failure in {}: {}", name, e);
        SparkStatsError::InvalidJson {
            file: name.to_string(),
        }
    })?;
    Ok(BattleFile::new(name, content))
}

/// Read and parse one battle-result file.
pub fn load_battle_file(path: &Path) -> Result<BattleFile> {
    let bytes = std::fs::read(path)?;
    parse_battle_bytes(&file_label(path), &bytes)
}

/// Load every path, collecting failures instead of stopping at the first.
pub fn load_battle_files(paths: &[PathBuf]) -> LoadReport {
    let mut report = LoadReport::default();

    for path in paths {
        match load_battle_file(path) {
            Ok(file) => report.files.push(file),
            Err(SparkStatsError::InvalidJson { file }) => {
                log::warn!("Invalid JSON file: {}", path.display());
                report.errors.push(FileLoadError {
                    name: file,
                    message: "Invalid JSON file".to_string(),
                });
            }
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                report.errors.push(FileLoadError {
                    name: file_label(path),
                    message: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Loaded {} battle file(s), {} failed",
        report.files.len(),
        report.errors.len()
    );
    report
}

/// Find `.json` files in a directory, sorted by path.
pub fn collect_json_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SparkStatsError::Data(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut found = Vec::new();
    collect_into(dir, recursive, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect_into(dir: &Path, recursive: bool, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Error reading entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if recursive {
                collect_into(&path, recursive, found)?;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            found.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_report_separates_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, br#"{"characterRecord": {}}"#).unwrap();
        fs::write(&bad, b"{ not json").unwrap();

        let report = load_battle_files(&[good, bad]);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].name, "good.json");
        assert_eq!(
            report.errors,
            vec![FileLoadError {
                name: "bad.json".to_string(),
                message: "Invalid JSON file".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_file_reported_as_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = load_battle_files(&[dir.path().join("missing.json")]);
        assert!(report.files.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].name, "missing.json");
        assert_ne!(report.errors[0].message, "Invalid JSON file");
    }

    #[test]
    fn test_collect_json_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), b"{}").unwrap();
        fs::write(dir.path().join("a.JSON"), b"{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join(".hidden.json"), b"{}").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.json"), b"{}").unwrap();

        let flat = collect_json_files(dir.path(), false).unwrap();
        let names: Vec<String> = flat.iter().map(|p| file_label(p)).collect();
        assert_eq!(names, vec!["a.JSON", "b.json"]);

        let deep = collect_json_files(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_collect_json_files_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.json");
        fs::write(&file, b"{}").unwrap();
        assert!(collect_json_files(&file, false).is_err());
    }

    #[test]
    fn test_parse_battle_bytes_with_bom() {
        let file = parse_battle_bytes("bom.json", b"\xEF\xBB\xBF{\"teams\": []}").unwrap();
        assert!(file.content["teams"].is_array());
    }
}
