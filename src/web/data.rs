use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{EventRow, GalleryEntryRow, MediaType, ProjectStatus};

pub async fn email_exists(pool: &PgPool, email: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    country: &str,
    date_of_birth: NaiveDate,
    password_hash: &str,
) -> sqlx::Result<Uuid> {
    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, country, date_of_birth, password_hash)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(country)
    .bind(date_of_birth)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(user_id)
}

/// Creates the project row (always pending) and its upload row in one
/// transaction, so a failed upload insert never leaves an orphaned project.
pub async fn insert_project_with_upload(
    pool: &PgPool,
    author_id: Uuid,
    title: &str,
    description: &str,
    theme: Option<&str>,
    file_name: &str,
    media_type: MediaType,
) -> sqlx::Result<Uuid> {
    let project_id = Uuid::new_v4();
    let mut transaction = pool.begin().await?;

    sqlx::query(
        "INSERT INTO projects (id, author_id, title, description, theme, status)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(project_id)
    .bind(author_id)
    .bind(title)
    .bind(description)
    .bind(theme)
    .bind(ProjectStatus::Pending.as_str())
    .execute(&mut *transaction)
    .await?;

    sqlx::query("INSERT INTO uploads (id, project_id, file_name, media_type) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(file_name)
        .bind(media_type.as_str())
        .execute(&mut *transaction)
        .await?;

    transaction.commit().await?;

    Ok(project_id)
}

/// Approved projects joined to their upload, newest first. A theme filter
/// matches exactly but case-insensitively.
pub async fn fetch_approved_projects(
    pool: &PgPool,
    theme: Option<&str>,
) -> sqlx::Result<Vec<GalleryEntryRow>> {
    match theme {
        Some(theme) => {
            sqlx::query_as::<_, GalleryEntryRow>(
                "SELECT p.id, p.title, p.description, p.theme, p.created_at, u.file_name, u.media_type
                 FROM projects p LEFT JOIN uploads u ON u.project_id = p.id
                 WHERE p.status = $1 AND LOWER(p.theme) = LOWER($2)
                 ORDER BY p.created_at DESC",
            )
            .bind(ProjectStatus::Approved.as_str())
            .bind(theme)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, GalleryEntryRow>(
                "SELECT p.id, p.title, p.description, p.theme, p.created_at, u.file_name, u.media_type
                 FROM projects p LEFT JOIN uploads u ON u.project_id = p.id
                 WHERE p.status = $1
                 ORDER BY p.created_at DESC",
            )
            .bind(ProjectStatus::Approved.as_str())
            .fetch_all(pool)
            .await
        }
    }
}

/// Distinct non-empty themes across the whole approved set. Computed
/// independently of any active filter so the menu never collapses to the
/// selected theme.
pub async fn fetch_gallery_themes(pool: &PgPool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT DISTINCT theme FROM projects
         WHERE status = $1 AND theme IS NOT NULL AND theme <> ''
         ORDER BY theme",
    )
    .bind(ProjectStatus::Approved.as_str())
    .fetch_all(pool)
    .await
}

pub async fn insert_message(
    pool: &PgPool,
    name: &str,
    email: &str,
    body: &str,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO messages (id, name, email, body) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(body)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn fetch_events(pool: &PgPool) -> sqlx::Result<Vec<EventRow>> {
    sqlx::query_as::<_, EventRow>(
        "SELECT id, title, description, starts_at, location, link FROM events
         ORDER BY starts_at DESC NULLS LAST, created_at DESC",
    )
    .fetch_all(pool)
    .await
}
