use chrono::{Datelike, Utc};

use crate::web::AuthUser;

const BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; min-height: 100vh; display: flex; flex-direction: column; }
        header { background: #ffffff; padding: 1.5rem; border-bottom: 1px solid #e2e8f0; }
        .header-bar { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; max-width: 960px; margin: 0 auto; }
        .header-bar h1 { margin: 0; font-size: 1.5rem; }
        nav { display: flex; flex-wrap: wrap; gap: 1rem; align-items: center; }
        nav a { color: #1d4ed8; text-decoration: none; font-weight: 600; }
        nav a:hover { text-decoration: underline; }
        nav span { color: #475569; }
        main { flex: 1; padding: 2rem 1.5rem; max-width: 960px; margin: 0 auto; width: 100%; box-sizing: border-box; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        .panel h2 { margin-top: 0; }
        label { display: block; margin-top: 1rem; font-weight: 600; color: #0f172a; }
        input, select, textarea { width: 100%; padding: 0.75rem; margin-top: 0.4rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; box-sizing: border-box; font-size: 1rem; }
        input:focus, textarea:focus { outline: none; border-color: #2563eb; box-shadow: 0 0 0 3px rgba(37, 99, 235, 0.12); }
        textarea { min-height: 7rem; resize: vertical; }
        button { margin-top: 1.5rem; padding: 0.85rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; font-size: 1rem; cursor: pointer; transition: background 0.15s ease; }
        button:hover { background: #1d4ed8; }
        .note { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .cards { display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); }
        .card { background: #ffffff; padding: 1.5rem; border-radius: 12px; border: 1px solid #e2e8f0; box-shadow: 0 12px 30px rgba(15, 23, 42, 0.06); }
        .card h3 { margin-top: 0; }
        .card p { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .meta { color: #64748b; font-size: 0.85rem; }
        .tag { display: inline-block; padding: 0.25rem 0.75rem; border-radius: 999px; background: #e0f2fe; color: #1d4ed8; font-size: 0.85rem; font-weight: 600; margin-right: 0.5rem; }
        .theme-menu { display: flex; flex-wrap: wrap; gap: 0.5rem; margin-bottom: 1.5rem; }
        .theme-menu a { text-decoration: none; }
        .theme-menu a.active .tag { background: #1d4ed8; color: #ffffff; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; padding-bottom: 1.5rem; }
        @media (max-width: 768px) {
            .header-bar { flex-direction: column; align-items: flex-start; }
            main { padding: 1.5rem 1rem; }
        }
"#;

pub struct PageLayout<'a> {
    pub meta_title: &'a str,
    pub heading: &'a str,
    pub user: Option<&'a AuthUser>,
    pub flash_html: String,
    pub body_html: String,
}

pub fn render_page(layout: PageLayout<'_>) -> String {
    let PageLayout {
        meta_title,
        heading,
        user,
        flash_html,
        body_html,
    } = layout;

    let account_links = match user {
        Some(user) => format!(
            r#"<span>Signed in as <strong>{name}</strong></span> <a href="/logout">Log out</a>"#,
            name = escape_html(&user.name),
        ),
        None => r#"<a href="/login">Log in</a> <a href="/signup">Sign up</a>"#.to_string(),
    };
    let footer = render_footer();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{meta_title} | Youth Gallery</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <div class="header-bar">
            <h1>{heading}</h1>
            <nav>
                <a href="/">Home</a>
                <a href="/gallery">Gallery</a>
                <a href="/submit">Submit</a>
                <a href="/events">Events</a>
                <a href="/about">About</a>
                <a href="/partners">Partners</a>
                <a href="/contact">Contact</a>
                {account_links}
            </nav>
        </div>
    </header>
    <main>
        {flash_html}
        {body_html}
        {footer}
    </main>
</body>
</html>"#,
        meta_title = escape_html(meta_title),
        heading = escape_html(heading),
        styles = BASE_STYLES,
        account_links = account_links,
        flash_html = flash_html,
        body_html = body_html,
        footer = footer,
    )
}

pub fn flash_success(message: &str) -> String {
    format!(
        r#"<div class="flash success">{}</div>"#,
        escape_html(message)
    )
}

pub fn flash_error(message: &str) -> String {
    format!(r#"<div class="flash error">{}</div>"#, escape_html(message))
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} Youth Gallery · a community space for young creators</footer>"#,
        year = current_year
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("hi & 'bye'")</script>"#),
            "&lt;script&gt;alert(&quot;hi &amp; &#39;bye&#39;&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn escape_html_leaves_plain_text_alone() {
        assert_eq!(escape_html("water and light"), "water and light");
    }

    #[test]
    fn flash_messages_are_escaped() {
        let flash = flash_error("<b>oops</b>");
        assert!(flash.contains("&lt;b&gt;oops&lt;/b&gt;"));
        assert!(flash.starts_with(r#"<div class="flash error">"#));
    }
}
