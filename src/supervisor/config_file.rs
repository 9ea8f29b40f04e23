//! Generated configuration file writes.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Replace `path` with `contents`.
///
/// The text goes to a sibling temp file which is synced and then renamed
/// over `path`, so a reader sees either the old or the new file, never a
/// partial one.
pub async fn write_config(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_and_sync(&tmp, contents).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    fs::rename(&tmp, path).await
}

async fn write_and_sync(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("config"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haproxy.cfg");

        write_config(&path, "first").await.unwrap();
        write_config(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etc/haproxy/haproxy.cfg");

        write_config(&path, "global\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "global\n");
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/etc/haproxy/haproxy.cfg")),
            PathBuf::from("/etc/haproxy/haproxy.cfg.tmp")
        );
    }
}
