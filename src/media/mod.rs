//! Upload des images de profil vers un hébergeur externe.
//!
//! Les fichiers reçus sont d'abord écrits dans un répertoire temporaire local
//! sous forme de [`TempUpload`]. Le fichier est supprimé dès que la valeur est
//! détruite, donc sur tous les chemins de sortie (validation refusée, upload
//! réussi ou échoué).

pub mod cloudinary;

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use tempfile::TempPath;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Temporary file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Media host request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Media host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Fichier uploadé en attente, supprimé du disque au drop.
#[derive(Debug)]
pub struct TempUpload {
    path: TempPath,
    file_name: String,
    content_type: Option<String>,
}

impl TempUpload {
    /// Écrit `bytes` dans un nouveau fichier temporaire de `dir`.
    pub fn write(
        dir: &Path,
        file_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> Result<Self, MediaError> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self {
            path: file.into_temp_path(),
            file_name: file_name.to_string(),
            content_type,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

/// Hébergeur de médias injecté au démarrage.
///
/// `upload` prend possession du fichier temporaire: il est supprimé quelle que
/// soit l'issue de l'appel.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: TempUpload) -> Result<UploadedMedia, MediaError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_upload_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();

        let upload = TempUpload::write(
            dir.path(),
            "avatar.png",
            Some("image/png".to_string()),
            b"png-bytes",
        )
        .expect("write temp upload");
        let path = upload.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
        assert_eq!(upload.content_type(), Some("image/png"));

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn temp_upload_fails_when_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = TempUpload::write(&missing, "avatar.png", None, b"bytes");

        assert!(matches!(result, Err(MediaError::Io(_))));
    }
}
