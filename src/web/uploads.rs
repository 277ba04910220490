use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use axum::extract::Multipart;
use tokio::{fs::File, io::AsyncWriteExt};
use uuid::Uuid;

use super::models::MediaType;

/// Result type used by the upload helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Message attached to rejections of files outside the extension table.
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "unsupported file type";

/// Error returned when validating or persisting an uploaded file. The
/// message is suitable for showing to the submitter.
#[derive(Debug)]
pub struct UploadError {
    message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UploadError {}

/// An uploaded file persisted under the upload directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub original_name: String,
    pub stored_name: String,
    pub stored_path: PathBuf,
    pub media_type: MediaType,
    pub file_size: u64,
}

/// Parsed submission form: plain text fields plus the stored file, if one
/// was attached. Field presence is the caller's concern.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    fields: HashMap<String, String>,
    pub upload: Option<StoredUpload>,
}

impl SubmissionForm {
    /// Trimmed value of a text field, or the empty string when absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }
}

/// Reads the multipart submission form, persisting the attached file under
/// `dest_dir` with a collision-resistant name. On any parse error the
/// already-stored file is removed, so a rejected request leaves nothing
/// behind on disk.
pub async fn read_submission_form(
    multipart: Multipart,
    dest_dir: &Path,
    file_field: &str,
) -> UploadResult<SubmissionForm> {
    ensure_directory(dest_dir).await?;

    let mut form = SubmissionForm::default();
    match collect_form(multipart, dest_dir, file_field, &mut form).await {
        Ok(()) => Ok(form),
        Err(err) => {
            discard_stored_file(&form.upload).await;
            Err(err)
        }
    }
}

/// Removes a stored upload from disk, logging rather than failing when the
/// file is already gone.
pub async fn discard_stored_file(upload: &Option<StoredUpload>) {
    if let Some(upload) = upload {
        if let Err(err) = tokio::fs::remove_file(&upload.stored_path).await {
            tracing::warn!(?err, file = %upload.stored_path.display(), "failed to remove rejected upload");
        }
    }
}

async fn collect_form(
    mut multipart: Multipart,
    dest_dir: &Path,
    file_field: &str,
    form: &mut SubmissionForm,
) -> UploadResult<()> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::new(format!("could not read the submitted form: {err}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field.file_name().is_none() {
            let value = field.text().await.map_err(|err| {
                UploadError::new(format!("could not read field `{field_name}`: {err}"))
            })?;
            form.fields.entry(field_name).or_insert(value);
            continue;
        }

        if field_name != file_field {
            return Err(UploadError::new(format!(
                "unexpected file field `{field_name}`"
            )));
        }

        if form.upload.is_some() {
            return Err(UploadError::new("please attach a single file"));
        }

        let original_name = field.file_name().unwrap_or("upload.bin").to_string();

        // Browsers submit an empty file part when no file was picked.
        if original_name.is_empty() {
            continue;
        }

        let extension = file_extension(&original_name);
        let Some(media_type) = MediaType::from_extension(&extension) else {
            return Err(UploadError::new(UNSUPPORTED_TYPE_MESSAGE));
        };

        let stored_name = stored_file_name(&original_name);
        let stored_path = dest_dir.join(&stored_name);
        let mut file = File::create(&stored_path)
            .await
            .map_err(|err| UploadError::new(format!("could not save the file: {err}")))?;

        let mut total_bytes: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| UploadError::new(format!("could not read the uploaded file: {err}")))?
        {
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|err| UploadError::new(format!("could not write the file: {err}")))?;
        }
        file.flush()
            .await
            .map_err(|err| UploadError::new(format!("could not write the file: {err}")))?;

        form.upload = Some(StoredUpload {
            original_name,
            stored_name,
            stored_path,
            media_type,
            file_size: total_bytes,
        });
    }

    Ok(())
}

pub async fn ensure_directory(path: &Path) -> UploadResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| UploadError::new(format!("could not create the upload directory: {err}")))
}

/// Lowercased extension of a filename, empty when there is none.
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

// A random prefix keeps concurrent submissions of the same filename from
// colliding in the shared upload directory.
fn stored_file_name(original: &str) -> String {
    let mut sanitized = sanitize_filename::sanitize(original);
    if sanitized.is_empty() {
        sanitized = "upload.bin".to_string();
    }
    format!("{}_{}", Uuid::new_v4().simple(), sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_extension_lowercases() {
        assert_eq!(file_extension("photo.PNG"), "png");
        assert_eq!(file_extension("track.Mp3"), "mp3");
    }

    #[test]
    fn file_extension_handles_missing_extension() {
        assert_eq!(file_extension("notes"), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn stored_names_keep_the_sanitized_original_as_suffix() {
        let name = stored_file_name("photo.png");
        assert!(name.ends_with("_photo.png"), "got {name}");
    }

    #[test]
    fn stored_names_do_not_collide() {
        let first = stored_file_name("photo.png");
        let second = stored_file_name("photo.png");
        assert_ne!(first, second);
    }

    #[test]
    fn stored_names_strip_path_separators() {
        let name = stored_file_name("../../etc/passwd");
        assert!(!name.contains('/'), "got {name}");
        assert!(!name.contains('\\'), "got {name}");
    }

    #[tokio::test]
    async fn ensure_directory_creates_nested_paths() {
        let root = tempfile::tempdir().expect("tempdir");
        let nested = root.path().join("a/b/c");
        ensure_directory(&nested).await.expect("create dirs");
        assert!(nested.is_dir());
    }
}
