//! Validated reads and atomic writes for store and sitemap files.

use crate::error::StoreError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Read a text file, rejecting NUL bytes and invalid UTF-8.
pub fn read_text(path: impl AsRef<Path>) -> Result<String, StoreError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| StoreError::Io(format!("{}: {e}", path.display())))?;
    if bytes.contains(&0) {
        return Err(StoreError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    String::from_utf8(bytes).map_err(|_| {
        StoreError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        ))
    })
}

/// Replace `path` with `text` via a synced temporary sibling and rename, so
/// readers never observe a partially written file.
pub fn write_text_atomically(path: impl AsRef<Path>, text: &str) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io(format!("{parent:?}: {e}")))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), StoreError> {
        let file = File::create(&tmp_path)
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(text.as_bytes())
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))?;
        let file = writer
            .into_inner()
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))?;
        file.sync_all()
            .map_err(|e| StoreError::Io(format!("{}: {e}", tmp_path.display())))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io(format!(
            "{} -> {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent)
            .map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
        dir.sync_all()
            .map_err(|e| StoreError::Io(format!("{}: {e}", parent.display())))?;
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "seosync-store-{prefix}-{}-{unique}.ts",
            std::process::id()
        ))
    }

    #[test]
    fn read_text_rejects_nul_payload() {
        let path = temp_path("nul");
        fs::write(&path, b"export const seoConfig = {};\0").expect("fixture should write");

        match read_text(&path) {
            Err(StoreError::Corrupt(message)) => assert!(message.contains("contains NUL")),
            other => panic!("expected corrupt store error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_text_rejects_non_utf8_payload() {
        let path = temp_path("non-utf8");
        fs::write(&path, [0xff, 0xfe, 0xfd]).expect("fixture should write");

        match read_text(&path) {
            Err(StoreError::Corrupt(message)) => assert!(message.contains("non-UTF-8")),
            other => panic!("expected corrupt store error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_text_reports_missing_file() {
        let path = temp_path("missing");
        match read_text(&path) {
            Err(StoreError::Io(message)) => assert!(message.contains(&path.display().to_string())),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn write_text_atomically_replaces_file() {
        let path = temp_path("atomic-write");
        write_text_atomically(&path, "first").expect("first write should succeed");
        write_text_atomically(&path, "second").expect("second write should succeed");

        assert_eq!(read_text(&path).expect("read back"), "second");

        let parent = path.parent().expect("temp path has parent");
        let file_name = path
            .file_name()
            .expect("temp path has file name")
            .to_string_lossy()
            .to_string();
        let leftovers = fs::read_dir(parent)
            .expect("temp dir should list")
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(&format!("{file_name}.tmp."))
            })
            .count();
        assert_eq!(leftovers, 0);

        let _ = fs::remove_file(path);
    }
}
