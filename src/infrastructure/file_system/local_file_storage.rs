use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::file_storage::{FileStorage, FileStorageError, StoredFile};

pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub async fn ensure_directory_exists(&self) -> Result<(), FileStorageError> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    fn new_file_path(&self, extension: Option<&str>) -> PathBuf {
        let file_id = Uuid::new_v4();
        let file_name = match extension {
            Some(ext) => format!("{}.{}", file_id.simple(), ext),
            None => file_id.simple().to_string(),
        };
        self.base_path.join(file_name)
    }

    async fn write_new(
        &self,
        data: &[u8],
        extension: Option<&str>,
    ) -> Result<StoredFile, FileStorageError> {
        self.ensure_directory_exists().await?;

        let file_path = self.new_file_path(extension);

        if let Err(e) = fs::write(&file_path, data).await {
            let _ = fs::remove_file(&file_path).await;
            return Err(e.into());
        }

        Ok(StoredFile {
            path: file_path,
            size: data.len() as u64,
        })
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store_file(&self, data: &[u8]) -> Result<StoredFile, FileStorageError> {
        self.write_new(data, None).await
    }

    async fn store_text(&self, text: &str) -> Result<StoredFile, FileStorageError> {
        self.write_new(text.as_bytes(), Some("txt")).await
    }

    async fn delete_file(&self, path: &Path) -> Result<bool, FileStorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
