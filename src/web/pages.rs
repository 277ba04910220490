use axum::{
    extract::{Query, State},
    response::Html,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::web::{
    AppState, auth, escape_html,
    templates::{PageLayout, flash_success, render_page},
};

#[derive(Default, Deserialize)]
pub struct LandingQuery {
    pub status: Option<String>,
}

pub async fn landing_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LandingQuery>,
) -> Html<String> {
    let user = auth::current_user(&state, &jar).await;
    let flash = compose_landing_flash(&params);

    let body = r#"<section class="panel">
    <h2>Share what you make</h2>
    <p class="note">Youth Gallery is a community space for creators aged 14 to 30.
    Upload images, video, audio or writing, tag it with a theme, and once a
    curator approves it your work appears in the public gallery.</p>
    <p class="note">Browse the <a href="/gallery">gallery</a>, check upcoming
    <a href="/events">events</a>, or <a href="/submit">submit a piece</a> of your own.</p>
</section>"#;

    Html(render_page(PageLayout {
        meta_title: "Home",
        heading: "Youth Gallery",
        user: user.as_ref(),
        flash_html: flash,
        body_html: body.to_string(),
    }))
}

pub async fn about_page(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let user = auth::current_user(&state, &jar).await;

    let body = r#"<section class="panel">
    <h2>About</h2>
    <p class="note">Youth Gallery collects creative work from young people around
    the world. Every submission is reviewed before it is published, and the
    gallery can be browsed by theme.</p>
    <p class="note">Questions or ideas? Use the <a href="/contact">contact form</a>
    and we will get back to you.</p>
</section>"#;

    Html(render_page(PageLayout {
        meta_title: "About",
        heading: "About",
        user: user.as_ref(),
        flash_html: String::new(),
        body_html: body.to_string(),
    }))
}

pub async fn partners_page(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let user = auth::current_user(&state, &jar).await;

    // Fixed listing; partner management is out of scope.
    let partners = [
        ("Earth Partner", "#"),
        ("Youth Climate Network", "#"),
        ("Green Schools", "#"),
    ];

    let cards = partners
        .iter()
        .map(|(name, url)| {
            format!(
                r#"<div class="card"><h3><a href="{url}">{name}</a></h3></div>"#,
                name = escape_html(name),
                url = url,
            )
        })
        .collect::<String>();

    let body = format!(
        r#"<section>
    <h2>Partners</h2>
    <div class="cards">{cards}</div>
</section>"#,
        cards = cards,
    );

    Html(render_page(PageLayout {
        meta_title: "Partners",
        heading: "Partners",
        user: user.as_ref(),
        flash_html: String::new(),
        body_html: body,
    }))
}

fn compose_landing_flash(params: &LandingQuery) -> String {
    match params.status.as_deref() {
        Some("welcome") => flash_success("Welcome! Your account is ready."),
        Some("logged_out") => flash_success("You have been signed out."),
        _ => String::new(),
    }
}
