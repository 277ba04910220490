use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::web::{
    AppState, auth, data,
    templates::{PageLayout, flash_error, flash_success, render_page},
};

#[derive(Default, Deserialize)]
pub struct ContactQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub async fn contact_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<ContactQuery>,
) -> Html<String> {
    let user = auth::current_user(&state, &jar).await;
    let flash = compose_contact_flash(&params);

    let body = r#"<section class="panel">
    <h2>Get in touch</h2>
    <form method="post" action="/contact">
        <label for="name">Name</label>
        <input id="name" name="name" required>
        <label for="email">Email</label>
        <input id="email" name="email" type="email" required>
        <label for="message">Message</label>
        <textarea id="message" name="message" required></textarea>
        <button type="submit">Send</button>
    </form>
</section>"#;

    Html(render_page(PageLayout {
        meta_title: "Contact",
        heading: "Contact",
        user: user.as_ref(),
        flash_html: flash,
        body_html: body.to_string(),
    }))
}

pub async fn process_contact(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Redirect {
    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Redirect::to("/contact?error=missing");
    }

    if let Err(err) = data::insert_message(state.pool_ref(), name, email, message).await {
        error!(?err, "failed to store contact message");
        return Redirect::to("/contact?error=server");
    }

    Redirect::to("/contact?status=sent")
}

fn compose_contact_flash(params: &ContactQuery) -> String {
    if let Some("sent") = params.status.as_deref() {
        return flash_success("Thanks! We will get back to you soon.");
    }

    match params.error.as_deref() {
        Some("missing") => flash_error("Please fill in all fields."),
        Some(_) => flash_error("Something went wrong. Please try again."),
        None => String::new(),
    }
}
