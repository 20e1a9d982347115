use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Flat on-disk store for uploaded images.
///
/// Each image lives at `{dir}/{filename}`; the filename is generated on save
/// and is the only handle clients get back (inside the image URL).
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Image storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Write `data` under a fresh name that keeps the client's extension.
    /// Returns the generated filename.
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> Result<String> {
        let ext = original_name.map(extension).unwrap_or_default();
        let suffix = Uuid::new_v4().simple().to_string();
        let filename = format!("{}-{}{}", Utc::now().timestamp_millis(), &suffix[..8], ext);

        fs::write(self.file_path(&filename), data).await?;
        info!("Stored image {} ({} bytes)", filename, data.len());
        Ok(filename)
    }

    /// Remove the image a URL or path points at. Only the final path segment
    /// is used, so references cannot escape the storage directory.
    /// Returns `false` if there was nothing to delete.
    pub async fn delete(&self, reference: &str) -> Result<bool> {
        let Some(filename) = stored_name(reference) else {
            return Ok(false);
        };

        match fs::remove_file(self.file_path(filename)).await {
            Ok(()) => {
                info!("Deleted image {}", filename);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Final path segment of an image URL, without query or fragment.
pub fn stored_name(reference: &str) -> Option<&str> {
    let path = reference.split(['?', '#']).next().unwrap_or_default();
    let name = path.rsplit(['/', '\\']).next().unwrap_or_default();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Lowercased `.ext` of a client filename, or empty if it has none worth keeping.
fn extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_name_takes_last_segment() {
        assert_eq!(stored_name("http://localhost:8000/uploads/a.png"), Some("a.png"));
        assert_eq!(stored_name("http://x/uploads/a.png?v=2#top"), Some("a.png"));
        assert_eq!(stored_name("../../etc/passwd"), Some("passwd"));
        assert_eq!(stored_name("..\\secret.txt"), Some("secret.txt"));
        assert_eq!(stored_name("plain.jpg"), Some("plain.jpg"));
        assert_eq!(stored_name("http://x/uploads/"), None);
        assert_eq!(stored_name(".."), None);
        assert_eq!(stored_name(""), None);
    }

    #[test]
    fn extension_is_sanitised() {
        assert_eq!(extension("beach.PNG"), ".png");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("noext"), "");
        assert_eq!(extension("weird.p$g"), "");
    }

    #[tokio::test]
    async fn save_then_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("uploads")).await.unwrap();

        let name = store.save(Some("sunset.jpg"), b"jpeg bytes").await.unwrap();
        assert!(name.ends_with(".jpg"));
        assert_eq!(std::fs::read(store.file_path(&name)).unwrap(), b"jpeg bytes");

        let url = format!("http://localhost:8000/uploads/{}", name);
        assert!(store.delete(&url).await.unwrap());
        assert!(!store.file_path(&name).exists());

        // Second delete finds nothing
        assert!(!store.delete(&url).await.unwrap());
    }

    #[tokio::test]
    async fn saved_names_are_unique() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().to_path_buf()).await.unwrap();

        let a = store.save(None, b"a").await.unwrap();
        let b = store.save(None, b"b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn delete_cannot_escape_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("outside.txt"), b"keep").unwrap();
        let store = ImageStore::new(tmp.path().join("uploads")).await.unwrap();

        assert!(!store.delete("../outside.txt").await.unwrap());
        assert!(tmp.path().join("outside.txt").exists());
    }
}
