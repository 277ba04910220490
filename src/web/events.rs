use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::web::{
    AppState, auth, data, escape_html,
    models::EventRow,
    templates::{PageLayout, render_page},
};

pub async fn events_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let user = auth::current_user(&state, &jar).await;

    let events = data::fetch_events(state.pool_ref()).await.map_err(|err| {
        error!(?err, "failed to load events");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(render_page(PageLayout {
                meta_title: "Events",
                heading: "Events",
                user: user.as_ref(),
                flash_html: String::new(),
                body_html: r#"<section class="panel"><p class="note">The events listing is unavailable right now. Please try again later.</p></section>"#.to_string(),
            })),
        )
    })?;

    let body = if events.is_empty() {
        r#"<section class="panel"><h2>Events</h2><p class="note">No events are scheduled right now. Check back soon.</p></section>"#.to_string()
    } else {
        let cards = events.iter().map(render_event_card).collect::<String>();
        format!(
            r#"<section><h2>Upcoming and recent events</h2><div class="cards">{cards}</div></section>"#,
            cards = cards,
        )
    };

    Ok(Html(render_page(PageLayout {
        meta_title: "Events",
        heading: "Events",
        user: user.as_ref(),
        flash_html: String::new(),
        body_html: body,
    })))
}

fn render_event_card(event: &EventRow) -> String {
    let when = event
        .starts_at
        .map(|starts_at| starts_at.format("%-d %B %Y").to_string())
        .unwrap_or_else(|| "Date to be announced".to_string());
    let location = event
        .location
        .as_deref()
        .map(|location| format!(" · {}", escape_html(location)))
        .unwrap_or_default();
    let description = event
        .description
        .as_deref()
        .map(|description| format!("<p>{}</p>", escape_html(description)))
        .unwrap_or_default();
    let link = event
        .link
        .as_deref()
        .map(|link| {
            format!(
                r#"<p><a href="{href}">More information</a></p>"#,
                href = escape_html(link),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="card" id="event-{id}"><h3>{title}</h3><p class="meta">{when}{location}</p>{description}{link}</div>"#,
        id = event.id,
        title = escape_html(&event.title),
        when = when,
        location = location,
        description = description,
        link = link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn event(title: &str) -> EventRow {
        EventRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            starts_at: None,
            location: None,
            link: None,
        }
    }

    #[test]
    fn card_without_date_announces_one_later() {
        let card = render_event_card(&event("Open studio"));
        assert!(card.contains("Open studio"));
        assert!(card.contains("Date to be announced"));
    }

    #[test]
    fn card_escapes_user_visible_text() {
        let mut ev = event("<b>Workshop</b>");
        ev.location = Some("Main & Second".to_string());
        ev.starts_at = Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).single();
        let card = render_event_card(&ev);
        assert!(card.contains("&lt;b&gt;Workshop&lt;/b&gt;"));
        assert!(card.contains("Main &amp; Second"));
        assert!(card.contains("14 March 2026"));
    }
}
