use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use cookie::time::Duration as CookieDuration;
use rand_core::OsRng;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::web::{
    AppState, data,
    templates::{PageLayout, flash_error, render_page},
};

pub const SESSION_COOKIE: &str = "session_token";
pub const SESSION_TTL_HOURS: i64 = 72;

const MIN_SIGNUP_AGE: i32 = 14;
const MAX_SIGNUP_AGE: i32 = 30;

#[derive(Clone, sqlx::FromRow)]
pub struct DbUserAuth {
    pub id: Uuid,
    pub password_hash: String,
}

/// The signed-in user as resolved from a live session token.
#[derive(Clone, sqlx::FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
}

#[derive(Default, Deserialize)]
pub struct AuthPageQuery {
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub country: String,
    pub date_of_birth: String,
    pub password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<AuthPageQuery>,
) -> Result<Html<String>, Redirect> {
    if current_user(&state, &jar).await.is_some() {
        return Err(Redirect::to("/"));
    }

    let flash = compose_auth_flash(params.error.as_deref());
    let body = r#"<section class="panel">
    <h2>Log in</h2>
    <form method="post" action="/login">
        <label for="email">Email</label>
        <input id="email" name="email" type="email" required>
        <label for="password">Password</label>
        <input id="password" name="password" type="password" required>
        <button type="submit">Log in</button>
    </form>
    <p class="note">New here? <a href="/signup">Create an account</a> to share your work.</p>
</section>"#;

    Ok(Html(render_page(PageLayout {
        meta_title: "Log in",
        heading: "Log in",
        user: None,
        flash_html: flash,
        body_html: body.to_string(),
    })))
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), Redirect> {
    let email = form.email.trim();

    let user = match fetch_auth_by_email(state.pool_ref(), email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(Redirect::to("/login?error=credentials")),
        Err(err) => {
            error!(?err, "failed to fetch user during login");
            return Err(Redirect::to("/login?error=server"));
        }
    };

    if !verify_password(&form.password, &user.password_hash) {
        return Err(Redirect::to("/login?error=credentials"));
    }

    let (token, _expires_at) = match create_session(state.pool_ref(), user.id).await {
        Ok(session) => session,
        Err(err) => {
            error!(?err, "failed to create session");
            return Err(Redirect::to("/login?error=server"));
        }
    };

    let jar = jar.add(session_cookie(token));
    Ok((jar, Redirect::to("/")))
}

pub async fn signup_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<AuthPageQuery>,
) -> Result<Html<String>, Redirect> {
    if current_user(&state, &jar).await.is_some() {
        return Err(Redirect::to("/"));
    }

    let flash = compose_auth_flash(params.error.as_deref());
    let body = r#"<section class="panel">
    <h2>Create an account</h2>
    <p class="note">The community is open to participants aged 14 to 30.</p>
    <form method="post" action="/signup">
        <label for="name">Name</label>
        <input id="name" name="name" required>
        <label for="email">Email</label>
        <input id="email" name="email" type="email" required>
        <label for="country">Country</label>
        <input id="country" name="country" required>
        <label for="date_of_birth">Date of birth</label>
        <input id="date_of_birth" name="date_of_birth" type="date" required>
        <label for="password">Password</label>
        <input id="password" name="password" type="password" required>
        <button type="submit">Sign up</button>
    </form>
    <p class="note">Already have an account? <a href="/login">Log in</a>.</p>
</section>"#;

    Ok(Html(render_page(PageLayout {
        meta_title: "Sign up",
        heading: "Sign up",
        user: None,
        flash_html: flash,
        body_html: body.to_string(),
    })))
}

pub async fn process_signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<(CookieJar, Redirect), Redirect> {
    let name = form.name.trim();
    let email = form.email.trim();
    let country = form.country.trim();
    let date_of_birth = form.date_of_birth.trim();

    if name.is_empty()
        || email.is_empty()
        || country.is_empty()
        || date_of_birth.is_empty()
        || form.password.is_empty()
    {
        return Err(Redirect::to("/signup?error=missing"));
    }

    let Ok(born) = NaiveDate::parse_from_str(date_of_birth, "%Y-%m-%d") else {
        return Err(Redirect::to("/signup?error=dob"));
    };

    let age = derived_age(born, Utc::now().date_naive());
    if !signup_age_permitted(age) {
        return Err(Redirect::to("/signup?error=age"));
    }

    match data::email_exists(state.pool_ref(), email).await {
        Ok(true) => return Err(Redirect::to("/signup?error=email_taken")),
        Ok(false) => {}
        Err(err) => {
            error!(?err, "failed to check email during signup");
            return Err(Redirect::to("/signup?error=server"));
        }
    }

    let password_hash = match hash_password(&form.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!(?err, "failed to hash password during signup");
            return Err(Redirect::to("/signup?error=server"));
        }
    };

    let user_id =
        match data::insert_user(state.pool_ref(), name, email, country, born, &password_hash).await
        {
            Ok(user_id) => user_id,
            Err(err) => {
                error!(?err, "failed to insert user during signup");
                return Err(Redirect::to("/signup?error=server"));
            }
        };

    let (token, _expires_at) = match create_session(state.pool_ref(), user_id).await {
        Ok(session) => session,
        Err(err) => {
            error!(?err, "failed to create session after signup");
            return Err(Redirect::to("/login?error=server"));
        }
    };

    let jar = jar.add(session_cookie(token));
    Ok((jar, Redirect::to("/?status=welcome")))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let mut jar = jar;

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(token) = Uuid::parse_str(cookie.value()) {
            if let Err(err) = sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(token)
                .execute(state.pool_ref())
                .await
            {
                error!(?err, "failed to remove session during logout");
            }
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));
    jar = jar.remove(removal);

    (jar, Redirect::to("/?status=logged_out"))
}

/// Resolves the session cookie to its user. Absent, malformed, unknown and
/// expired tokens all resolve to `None`.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Option<AuthUser> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let token = Uuid::parse_str(cookie.value()).ok()?;

    match fetch_user_by_session(state.pool_ref(), token).await {
        Ok(user) => user,
        Err(err) => {
            error!(?err, "failed to resolve session");
            None
        }
    }
}

pub async fn require_user_redirect(state: &AppState, jar: &CookieJar) -> Result<AuthUser, Redirect> {
    current_user(state, jar)
        .await
        .ok_or_else(|| Redirect::to("/login?error=auth"))
}

/// Issues a fresh session row for the user and returns the opaque token
/// with its computed expiry. A user may hold several live sessions.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
) -> sqlx::Result<(Uuid, DateTime<Utc>)> {
    let token = Uuid::new_v4();
    let expires_at = Utc::now() + ChronoDuration::hours(SESSION_TTL_HOURS);

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok((token, expires_at))
}

pub async fn fetch_user_by_session(pool: &PgPool, token: Uuid) -> sqlx::Result<Option<AuthUser>> {
    sqlx::query_as::<_, AuthUser>(
        "SELECT users.id, users.name FROM sessions
         JOIN users ON users.id = sessions.user_id
         WHERE sessions.token = $1 AND sessions.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_auth_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<DbUserAuth>> {
    sqlx::query_as::<_, DbUserAuth>("SELECT id, password_hash FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Age as plain year arithmetic, matching the signup rule: the difference
/// of calendar years, ignoring month and day.
pub fn derived_age(born: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - born.year()
}

pub fn signup_age_permitted(age: i32) -> bool {
    (MIN_SIGNUP_AGE..=MAX_SIGNUP_AGE).contains(&age)
}

fn session_cookie(token: Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::hours(SESSION_TTL_HOURS));
    cookie
}

fn compose_auth_flash(error: Option<&str>) -> String {
    let Some(error) = error else {
        return String::new();
    };

    let message = match error {
        "auth" => "Please log in to continue.",
        "credentials" => "Invalid email or password.",
        "missing" => "Please complete all required fields.",
        "dob" => "Please enter a valid date of birth.",
        "age" => "Participants must be between 14 and 30 years old.",
        "email_taken" => "An account with that email already exists.",
        _ => "Something went wrong. Please try again.",
    };

    flash_error(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn derived_age_uses_year_arithmetic() {
        let today = date(2024, 6, 1);
        assert_eq!(derived_age(date(2010, 12, 31), today), 14);
        assert_eq!(derived_age(date(1994, 1, 1), today), 30);
        assert_eq!(derived_age(date(2024, 1, 1), today), 0);
    }

    #[test]
    fn signup_age_bounds_are_inclusive() {
        assert!(!signup_age_permitted(13));
        assert!(signup_age_permitted(14));
        assert!(signup_age_permitted(22));
        assert!(signup_age_permitted(30));
        assert!(!signup_age_permitted(31));
    }

    #[test]
    fn password_hash_verifies_round_trip() {
        let hash = hash_password("correct horse battery staple").expect("hashing succeeds");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("secret").expect("hashing succeeds");
        let second = hash_password("secret").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_malformed_stored_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie(Uuid::new_v4());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(72)));
    }
}
