//! Upload collaborator: stores rendered assets and reports where they went.

use crate::dimensions;
use chartpress_core::UploadedAsset;
use chartpress_render::MimeType;
use std::fs;
use std::path::{Path, PathBuf};

/// Failure to store one rendered asset. Never fatal to a publish run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to create asset directory `{}`: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write asset `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to upload `{file_name}`: not a plain file name")]
    InvalidName { file_name: String },

    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Stores one rendered asset.
///
/// `Ok(None)` means the asset was intentionally not stored. Either that or an error leaves the
/// chart's diagram block in place.
pub trait Uploader: Send + Sync {
    fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: MimeType,
    ) -> Result<Option<UploadedAsset>, UploadError>;
}

impl<U: Uploader + ?Sized> Uploader for &U {
    fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: MimeType,
    ) -> Result<Option<UploadedAsset>, UploadError> {
        (**self).upload(file_name, bytes, mime_type)
    }
}

impl<U: Uploader + ?Sized> Uploader for Box<U> {
    fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: MimeType,
    ) -> Result<Option<UploadedAsset>, UploadError> {
        (**self).upload(file_name, bytes, mime_type)
    }
}

/// Writes assets into a local directory, one file per asset under its own file name.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    dir: PathBuf,
    collection_id: String,
}

impl DirectoryUploader {
    pub fn new(dir: impl Into<PathBuf>, collection_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            collection_id: collection_id.into(),
        }
    }
}

impl Uploader for DirectoryUploader {
    fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: MimeType,
    ) -> Result<Option<UploadedAsset>, UploadError> {
        if !is_plain_file_name(file_name) {
            return Err(UploadError::InvalidName {
                file_name: file_name.to_string(),
            });
        }
        fs::create_dir_all(&self.dir).map_err(|source| UploadError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).map_err(|source| UploadError::Write {
            path: path.clone(),
            source,
        })?;

        let (width, height) = match dimensions::probe(bytes, mime_type) {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        let asset = UploadedAsset {
            collection_id: self.collection_id.clone(),
            asset_id: uuid::Uuid::new_v4().to_string(),
            width,
            height,
        };
        tracing::debug!(
            path = %path.display(),
            asset_id = %asset.asset_id,
            mime = %mime_type,
            "stored asset"
        );
        Ok(Some(asset))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartpress_render::placeholder::TRANSPARENT_PIXEL_PNG;

    #[test]
    fn writes_file_and_reports_dimensions() {
        let tmp = tempfile::tempdir().unwrap();
        let uploader = DirectoryUploader::new(tmp.path().join("assets"), "docs");
        let asset = uploader
            .upload("chart.png", TRANSPARENT_PIXEL_PNG, MimeType::Png)
            .unwrap()
            .unwrap();

        assert_eq!(asset.collection_id, "docs");
        assert!(uuid::Uuid::parse_str(&asset.asset_id).is_ok());
        assert_eq!((asset.width, asset.height), (Some(1), Some(1)));
        assert_eq!(
            fs::read(tmp.path().join("assets").join("chart.png")).unwrap(),
            TRANSPARENT_PIXEL_PNG
        );
    }

    #[test]
    fn unknown_size_is_left_out() {
        let tmp = tempfile::tempdir().unwrap();
        let uploader = DirectoryUploader::new(tmp.path(), "docs");
        let asset = uploader
            .upload("chart.svg", b"<svg/>", MimeType::Svg)
            .unwrap()
            .unwrap();
        assert_eq!((asset.width, asset.height), (None, None));
    }

    #[test]
    fn path_like_names_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let uploader = DirectoryUploader::new(tmp.path(), "docs");
        for name in ["../escape.svg", "a/b.svg", "", ".."] {
            assert!(matches!(
                uploader.upload(name, b"<svg/>", MimeType::Svg),
                Err(UploadError::InvalidName { .. })
            ));
        }
    }
}
