//! On-disk store for rendered imagery
//! Uses the object_store crate over the local filesystem
//!
//! Every imagery request gets its own folder `{index}/field-imagery-{uuid}/`
//! below the artifact root, so concurrent requests never share a path. The
//! folder receives the rendered image plus the request descriptor that
//! produced it. Old folders are removed by [`retention`].

pub mod retention;

use bytes::Bytes;
use object_store::{ObjectStore, local::LocalFileSystem, path::Path as StoragePath};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::evalscript::Index;
use crate::provider::ProcessRequest;

/// File name of the rendered image inside an artifact folder
pub const RESPONSE_FILENAME: &str = "response.png";

/// File name of the serialized request inside an artifact folder
pub const REQUEST_FILENAME: &str = "request.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact root unavailable: {0}")]
    Root(#[from] std::io::Error),

    #[error("Provider reported no output files for {0}")]
    NoOutput(String),

    #[error("Expected artifact not found: {0}")]
    Missing(String),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Folder allocated to a single imagery request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFolder {
    pub id: Uuid,
    key: String,
}

impl ArtifactFolder {
    /// Folder key relative to the artifact root, with trailing slash
    pub fn key(&self) -> &str {
        &self.key
    }

    fn object(&self, filename: &str) -> String {
        format!("{}{}", self.key, filename)
    }
}

impl fmt::Display for ArtifactFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Artifact store rooted at a local directory
#[derive(Clone)]
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    root: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the root directory when missing
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        let store = LocalFileSystem::new_with_prefix(&root)?.with_automatic_cleanup(true);

        Ok(Self {
            store: Arc::new(store),
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Reserve a fresh folder for one imagery request
    pub fn allocate(&self, index: &Index) -> ArtifactFolder {
        let id = Uuid::new_v4();
        ArtifactFolder {
            id,
            key: format!("{}/field-imagery-{}/", index.name(), id),
        }
    }

    /// Write one file into a folder and return its object key
    pub async fn save(&self, folder: &ArtifactFolder, filename: &str, data: Bytes) -> Result<String> {
        let key = folder.object(filename);
        let size = data.len();

        self.store.put(&StoragePath::from(key.as_str()), data.into()).await?;

        tracing::info!(key = %key, size, "Artifact written");
        Ok(key)
    }

    /// Persist a process response next to its request descriptor
    ///
    /// Returns the names of the output files written, image first.
    pub async fn write_response(
        &self,
        folder: &ArtifactFolder,
        request: &ProcessRequest,
        image: Bytes,
    ) -> Result<Vec<String>> {
        let descriptor = serde_json::to_vec_pretty(request)?;
        self.save(folder, REQUEST_FILENAME, Bytes::from(descriptor)).await?;
        self.save(folder, RESPONSE_FILENAME, image).await?;

        Ok(vec![RESPONSE_FILENAME.to_string()])
    }

    /// Resolve the first reported output file to its object key
    ///
    /// The key is relative to the artifact root, which is also how the file
    /// is addressed below the static URL prefix.
    pub async fn locate(&self, folder: &ArtifactFolder, filenames: &[String]) -> Result<String> {
        let filename = filenames
            .first()
            .ok_or_else(|| ArtifactError::NoOutput(folder.key().to_string()))?;
        let key = folder.object(filename);

        match self.store.head(&StoragePath::from(key.as_str())).await {
            Ok(_) => Ok(key),
            Err(object_store::Error::NotFound { .. }) => Err(ArtifactError::Missing(key)),
            Err(e) => Err(e.into()),
        }
    }

    /// Read an artifact back by its object key
    pub async fn read(&self, key: &str) -> Result<Bytes> {
        let result = self.store.get(&StoragePath::from(key)).await?;
        Ok(result.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_bbox;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sample_request() -> ProcessRequest {
        ProcessRequest::imagery()
            .bbox(parse_bbox("[0,0,1,1]").unwrap())
            .date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap())
            .evalscript(Index::Ndvi.evalscript())
            .call()
    }

    #[test]
    fn test_allocate_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(temp_dir.path()).unwrap();

        let folder = store.allocate(&Index::Smi);
        assert_eq!(folder.key(), format!("smi/field-imagery-{}/", folder.id));
    }

    #[test]
    fn test_allocate_is_unique() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(temp_dir.path()).unwrap();

        let keys: HashSet<String> = (0..1000)
            .map(|_| store.allocate(&Index::Ndvi).key().to_string())
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_open_creates_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("static");

        let store = ArtifactStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[tokio::test]
    async fn test_write_and_locate() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(temp_dir.path()).unwrap();
        let folder = store.allocate(&Index::Ndvi);

        let filenames = store
            .write_response(&folder, &sample_request(), Bytes::from_static(PNG_SIGNATURE))
            .await
            .unwrap();
        assert_eq!(filenames, vec![RESPONSE_FILENAME.to_string()]);

        let key = store.locate(&folder, &filenames).await.unwrap();
        assert_eq!(key, format!("{}{}", folder.key(), RESPONSE_FILENAME));
        assert_eq!(std::fs::read(temp_dir.path().join(&key)).unwrap(), PNG_SIGNATURE);

        let descriptor = store
            .read(&format!("{}{}", folder.key(), REQUEST_FILENAME))
            .await
            .unwrap();
        let descriptor: serde_json::Value = serde_json::from_slice(&descriptor).unwrap();
        assert_eq!(descriptor["input"]["data"][0]["type"], "sentinel-2-l2a");
    }

    #[tokio::test]
    async fn test_locate_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(temp_dir.path()).unwrap();
        let folder = store.allocate(&Index::Ndvi);

        let err = store
            .locate(&folder, &[RESPONSE_FILENAME.to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Missing(_)));
    }

    #[tokio::test]
    async fn test_locate_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(temp_dir.path()).unwrap();
        let folder = store.allocate(&Index::Ndvi);

        let err = store.locate(&folder, &[]).await.unwrap_err();
        assert!(matches!(err, ArtifactError::NoOutput(_)));
    }
}
