//! ZIP bundle unpacking

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::IngestError;

/// Extract every member of `zip_path` under `out_dir` (created if needed).
/// Returns the extracted paths in archive order. Members whose names would
/// land outside `out_dir` are skipped.
pub fn extract_zip(zip_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    fs::create_dir_all(out_dir)?;
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| IngestError::Archive(e.to_string()))?;

    let mut extracted = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| IngestError::Archive(e.to_string()))?;
        let relative = match entry.enclosed_name() {
            Some(name) => name.to_path_buf(),
            None => {
                tracing::warn!("Skipping archive member with unsafe path: {}", entry.name());
                continue;
            }
        };
        let target = out_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            std::io::copy(&mut entry, &mut out)?;
        }
        extracted.push(target);
    }

    tracing::debug!("Extracted {} members from {}", extracted.len(), zip_path.display());
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(path: &Path, members: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_members_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("bundle.zip");
        build_zip(&zip_path, &[("bom.csv", "Y1,16MHz\n"), ("docs/notes.txt", "hello")]);

        let out = dir.path().join("out");
        let paths = extract_zip(&zip_path, &out).unwrap();
        assert_eq!(paths, vec![out.join("bom.csv"), out.join("docs/notes.txt")]);
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "hello");
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, b"plain text").unwrap();
        let err = extract_zip(&bogus, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, IngestError::Archive(_)));
    }
}
