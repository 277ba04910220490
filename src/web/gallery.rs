use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::web::{
    AppState, auth, data, escape_html,
    models::{GalleryEntryRow, MediaType},
    templates::{PageLayout, flash_success, render_page},
};

#[derive(Default, Deserialize)]
pub struct GalleryQuery {
    pub theme: Option<String>,
    pub status: Option<String>,
}

pub async fn gallery_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<GalleryQuery>,
) -> Response {
    let user = match auth::require_user_redirect(&state, &jar).await {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    let theme_filter = params
        .theme
        .as_deref()
        .map(str::trim)
        .filter(|theme| !theme.is_empty());

    let entries = match data::fetch_approved_projects(state.pool_ref(), theme_filter).await {
        Ok(entries) => entries,
        Err(err) => {
            error!(?err, "failed to load gallery entries");
            return unavailable_page(&user);
        }
    };

    // Menu themes come from the unfiltered approved set, so applying a
    // filter never shrinks the menu to the active theme alone.
    let themes = match data::fetch_gallery_themes(state.pool_ref()).await {
        Ok(themes) => themes,
        Err(err) => {
            error!(?err, "failed to load gallery themes");
            return unavailable_page(&user);
        }
    };

    let flash = match params.status.as_deref() {
        Some("submitted") => {
            flash_success("Thank you! Your submission was received and is awaiting review.")
        }
        _ => String::new(),
    };

    let menu = render_theme_menu(&themes, theme_filter);
    let listing = if entries.is_empty() {
        r#"<section class="panel"><p class="note">Nothing here yet. Approved submissions will appear in this gallery.</p></section>"#.to_string()
    } else {
        let cards = entries.iter().map(render_gallery_entry).collect::<String>();
        format!(r#"<div class="cards">{cards}</div>"#, cards = cards)
    };

    let body = format!("{menu}{listing}", menu = menu, listing = listing);

    Html(render_page(PageLayout {
        meta_title: "Gallery",
        heading: "Gallery",
        user: Some(&user),
        flash_html: flash,
        body_html: body,
    }))
    .into_response()
}

fn unavailable_page(user: &auth::AuthUser) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_page(PageLayout {
            meta_title: "Gallery",
            heading: "Gallery",
            user: Some(user),
            flash_html: String::new(),
            body_html: r#"<section class="panel"><p class="note">The gallery is unavailable right now. Please try again later.</p></section>"#.to_string(),
        })),
    )
        .into_response()
}

fn render_theme_menu(themes: &[String], active: Option<&str>) -> String {
    if themes.is_empty() {
        return String::new();
    }

    let all_class = if active.is_none() { " class=\"active\"" } else { "" };
    let mut links = format!(
        r#"<a href="/gallery"{all_class}><span class="tag">All themes</span></a>"#,
        all_class = all_class,
    );

    for theme in themes {
        let is_active = active.is_some_and(|value| value.eq_ignore_ascii_case(theme));
        let class = if is_active { " class=\"active\"" } else { "" };
        links.push_str(&format!(
            r#"<a href="/gallery?theme={query}"{class}><span class="tag">{label}</span></a>"#,
            query = urlencode(theme),
            class = class,
            label = escape_html(theme),
        ));
    }

    format!(r#"<div class="theme-menu">{links}</div>"#, links = links)
}

fn render_gallery_entry(entry: &GalleryEntryRow) -> String {
    let theme_tag = entry
        .theme
        .as_deref()
        .filter(|theme| !theme.is_empty())
        .map(|theme| format!(r#"<span class="tag">{}</span>"#, escape_html(theme)))
        .unwrap_or_default();
    let media_label = entry
        .media_type
        .as_deref()
        .map(|value| MediaType::from_str(value).as_str())
        .unwrap_or("file");
    let attachment = entry
        .file_name
        .as_deref()
        .map(|file_name| {
            format!(
                r#"<p class="meta">{media_label}: {file_name}</p>"#,
                media_label = media_label,
                file_name = escape_html(file_name),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="card" id="entry-{id}"><h3>{title}</h3>{theme_tag}<p>{description}</p>{attachment}<p class="meta">Added {added}</p></div>"#,
        id = entry.id,
        title = escape_html(&entry.title),
        theme_tag = theme_tag,
        description = escape_html(&entry.description),
        attachment = attachment,
        added = entry.created_at.format("%-d %B %Y"),
    )
}

// Minimal percent-encoding for the theme query parameter; themes are short
// free-text tags, not arbitrary binary.
fn urlencode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entry(title: &str, theme: Option<&str>) -> GalleryEntryRow {
        GalleryEntryRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "a piece".to_string(),
            theme: theme.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).single().unwrap(),
            file_name: Some("abc_photo.png".to_string()),
            media_type: Some("image".to_string()),
        }
    }

    #[test]
    fn theme_menu_keeps_every_theme_when_filtered() {
        let themes = vec!["fire".to_string(), "water".to_string()];
        let menu = render_theme_menu(&themes, Some("water"));
        assert!(menu.contains("fire"));
        assert!(menu.contains("water"));
        assert!(menu.contains("All themes"));
    }

    #[test]
    fn theme_menu_marks_the_active_theme_case_insensitively() {
        let themes = vec!["Water".to_string()];
        let menu = render_theme_menu(&themes, Some("water"));
        assert!(menu.contains(r#"?theme=Water" class="active""#));
    }

    #[test]
    fn theme_menu_is_empty_without_themes() {
        assert_eq!(render_theme_menu(&[], None), "");
    }

    #[test]
    fn theme_links_are_query_encoded() {
        let themes = vec!["sea & sky".to_string()];
        let menu = render_theme_menu(&themes, None);
        assert!(menu.contains("?theme=sea%20%26%20sky"));
    }

    #[test]
    fn entry_card_shows_media_type_and_escapes_text() {
        let card = render_gallery_entry(&entry("<Tides>", Some("water")));
        assert!(card.contains("&lt;Tides&gt;"));
        assert!(card.contains("image: abc_photo.png"));
        assert!(card.contains("2 January 2026"));
    }

    #[test]
    fn entry_card_omits_attachment_when_upload_is_missing() {
        let mut row = entry("Tides", None);
        row.file_name = None;
        row.media_type = None;
        let card = render_gallery_entry(&row);
        assert!(!card.contains("image:"));
    }
}
