use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Classification of a stored upload, derived from the file extension at
/// submission time. `File` only occurs for rows written outside the
/// submission form; the form itself rejects unknown extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Text,
    File,
}

impl MediaType {
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.to_ascii_lowercase();
        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Some(MediaType::Image),
            "mp4" | "webm" | "mov" => Some(MediaType::Video),
            "mp3" | "wav" | "ogg" => Some(MediaType::Audio),
            "txt" | "md" => Some(MediaType::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
            MediaType::Text => "text",
            MediaType::File => "file",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            "audio" => MediaType::Audio,
            "text" => MediaType::Text,
            _ => MediaType::File,
        }
    }
}

/// Moderation state of a project. Only approved projects are shown in the
/// gallery; new submissions always start out pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Pending,
    Approved,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::Approved => "approved",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "approved" => ProjectStatus::Approved,
            _ => ProjectStatus::Pending,
        }
    }
}

/// One approved project joined to its upload, as listed in the gallery.
/// The upload columns are nullable because the join is a left join; a
/// project whose upload insert was lost still renders, without a file.
#[derive(Clone, FromRow)]
pub struct GalleryEntryRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub theme: Option<String>,
    pub created_at: DateTime<Utc>,
    pub file_name: Option<String>,
    pub media_type: Option<String>,
}

#[derive(Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_table_covers_all_categories() {
        assert_eq!(MediaType::from_extension("png"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("webp"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("mp4"), Some(MediaType::Video));
        assert_eq!(MediaType::from_extension("mov"), Some(MediaType::Video));
        assert_eq!(MediaType::from_extension("mp3"), Some(MediaType::Audio));
        assert_eq!(MediaType::from_extension("ogg"), Some(MediaType::Audio));
        assert_eq!(MediaType::from_extension("txt"), Some(MediaType::Text));
        assert_eq!(MediaType::from_extension("md"), Some(MediaType::Text));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(MediaType::from_extension("PNG"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("Mp4"), Some(MediaType::Video));
    }

    #[test]
    fn unknown_extensions_are_not_classified() {
        assert_eq!(MediaType::from_extension("exe"), None);
        assert_eq!(MediaType::from_extension("pdf"), None);
        assert_eq!(MediaType::from_extension(""), None);
    }

    #[test]
    fn media_type_round_trips_through_str() {
        for media_type in [
            MediaType::Image,
            MediaType::Video,
            MediaType::Audio,
            MediaType::Text,
            MediaType::File,
        ] {
            assert_eq!(MediaType::from_str(media_type.as_str()), media_type);
        }
        assert_eq!(MediaType::from_str("something-else"), MediaType::File);
    }

    #[test]
    fn project_status_parses_known_values() {
        assert_eq!(ProjectStatus::from_str("approved"), ProjectStatus::Approved);
        assert_eq!(ProjectStatus::from_str("pending"), ProjectStatus::Pending);
        assert_eq!(ProjectStatus::from_str("garbage"), ProjectStatus::Pending);
    }
}
