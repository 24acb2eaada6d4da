//! File-backed image storage.
//!
//! Stands in for the hosted blob store.  Layout mirrors the upload paths the
//! client has always used:
//!
//! - `toy_images/{owner_id}_{timestamp}`
//! - `chat_images/{room_id}/{timestamp}_{file_name}`
//! - `profile_images/{user_id}`  (one per user, overwritten on upload)
//!
//! Callers hand in already-compressed bytes; image processing is the UI
//! side's concern.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info};

use kirala_shared::{RoomId, UserId};

use crate::error::{Result, StoreError};

/// URL scheme recorded on documents pointing back into this store.
const URL_SCHEME: &str = "kirala://";

/// A stored image, as referenced from toy, message and profile documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// `kirala://`-schemed URL recorded on the owning document.
    pub url: String,
    /// Path relative to the storage root.
    pub relative_path: String,
    /// BLAKE3 hash of the content, hex-encoded.
    pub content_hash: String,
    /// Size in bytes.
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    base_path: PathBuf,
    max_size: usize,
}

impl MediaStore {
    /// Open (or create) the storage root.
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self> {
        fs::create_dir_all(&base_path).await?;

        info!(path = %base_path.display(), "media store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Store a listing photo under `toy_images/{owner}_{millis}`.
    pub async fn store_toy_image(
        &self,
        owner: &UserId,
        taken_at: DateTime<Utc>,
        data: &[u8],
    ) -> Result<StoredImage> {
        let name = format!(
            "{}_{}",
            sanitize_component(owner.as_str()),
            taken_at.timestamp_millis()
        );
        self.write_blob(&format!("toy_images/{name}"), data).await
    }

    /// Store a chat attachment under `chat_images/{room}/{millis}_{name}`.
    pub async fn store_chat_image(
        &self,
        room: &RoomId,
        sent_at: DateTime<Utc>,
        file_name: &str,
        data: &[u8],
    ) -> Result<StoredImage> {
        let relative = format!(
            "chat_images/{}/{}_{}",
            sanitize_component(room.as_str()),
            sent_at.timestamp_millis(),
            sanitize_component(file_name)
        );
        self.write_blob(&relative, data).await
    }

    /// Store (or overwrite) the user's profile photo.
    pub async fn store_profile_image(&self, user: &UserId, data: &[u8]) -> Result<StoredImage> {
        let relative = format!("profile_images/{}", sanitize_component(user.as_str()));
        self.write_blob(&relative, data).await
    }

    /// Read a blob back by its relative path (or `kirala://` URL).
    pub async fn load(&self, reference: &str) -> Result<Vec<u8>> {
        let relative = reference.strip_prefix(URL_SCHEME).unwrap_or(reference);
        let path = self.resolve(relative)?;

        if !path.exists() {
            return Err(StoreError::NotFound);
        }

        let data = fs::read(&path).await?;
        debug!(path = relative, size = data.len(), "blob loaded");
        Ok(data)
    }

    async fn write_blob(&self, relative: &str, data: &[u8]) -> Result<StoredImage> {
        if data.is_empty() {
            return Err(StoreError::InvalidBlobPath);
        }
        if data.len() > self.max_size {
            return Err(StoreError::BlobTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&path, data).await?;

        let content_hash = blake3::hash(data).to_hex().to_string();

        debug!(path = relative, size = data.len(), "blob stored");

        Ok(StoredImage {
            url: format!("{URL_SCHEME}{relative}"),
            relative_path: relative.to_string(),
            content_hash,
            size: data.len(),
        })
    }

    /// Resolve a relative path inside the storage root, rejecting anything
    /// that would escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let candidate = Path::new(relative);
        let mut resolved = self.base_path.clone();

        for component in candidate.components() {
            match component {
                Component::Normal(c) => resolved.push(c),
                Component::CurDir => {}
                _ => return Err(StoreError::InvalidBlobPath),
            }
        }

        if !resolved.starts_with(&self.base_path) {
            return Err(StoreError::InvalidBlobPath);
        }
        Ok(resolved)
    }
}

/// Strip path separators and oddball bytes from a single path component.
fn sanitize_component(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store(max: usize) -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("blobs"), max).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn toy_image_round_trip() {
        let (_dir, store) = open_store(1024).await;
        let owner = UserId::from("uid-owner");
        let at = Utc::now();

        let stored = store.store_toy_image(&owner, at, b"jpegdata").await.unwrap();
        assert!(stored.url.starts_with("kirala://toy_images/uid-owner_"));
        assert_eq!(stored.size, 8);

        let bytes = store.load(&stored.url).await.unwrap();
        assert_eq!(bytes, b"jpegdata");
    }

    #[tokio::test]
    async fn profile_image_overwrites() {
        let (_dir, store) = open_store(1024).await;
        let user = UserId::from("uid-1");

        let first = store.store_profile_image(&user, b"old").await.unwrap();
        let second = store.store_profile_image(&user, b"new").await.unwrap();
        assert_eq!(first.relative_path, second.relative_path);

        assert_eq!(store.load(&second.url).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let (_dir, store) = open_store(4).await;
        let err = store
            .store_profile_image(&UserId::from("uid-1"), b"too big")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BlobTooLarge { size: 7, max: 4 }));
    }

    #[tokio::test]
    async fn traversal_is_blocked() {
        let (_dir, store) = open_store(1024).await;
        assert!(store.load("../../etc/passwd").await.is_err());

        // Hostile file names are flattened into safe components.
        let room = RoomId::between(&UserId::from("a"), &UserId::from("b"));
        let stored = store
            .store_chat_image(&room, Utc::now(), "../evil.sh", b"x")
            .await
            .unwrap();
        assert!(!stored.relative_path.contains("../"));
        assert_eq!(store.load(&stored.url).await.unwrap(), b"x");
    }
}
