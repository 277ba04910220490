use axum::{
    extract::{Multipart, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info};

use crate::web::{
    AppState, auth, data,
    templates::{PageLayout, flash_error, render_page},
    uploads::{self, SubmissionForm},
};

const FILE_FIELD: &str = "file";

#[derive(Default, Deserialize)]
pub struct SubmitQuery {
    pub error: Option<String>,
}

/// Why a submission was turned away without persisting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    MissingField,
    MissingFile,
    InvalidAge,
}

impl SubmitRejection {
    fn as_query(&self) -> &'static str {
        match self {
            SubmitRejection::MissingField | SubmitRejection::MissingFile => "missing",
            SubmitRejection::InvalidAge => "age",
        }
    }
}

/// The validated text fields of a submission.
#[derive(Debug, PartialEq, Eq)]
pub struct SubmissionDetails<'a> {
    pub name: &'a str,
    pub age: i64,
    pub country: &'a str,
    pub category: &'a str,
    pub theme: Option<&'a str>,
    pub description: &'a str,
}

pub async fn submit_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<SubmitQuery>,
) -> Result<Html<String>, Redirect> {
    let user = auth::require_user_redirect(&state, &jar).await?;

    let flash = compose_submit_flash(params.error.as_deref());
    let body = r#"<section class="panel">
    <h2>Submit your work</h2>
    <p class="note">Attach one file: an image (png, jpg, jpeg, gif, webp), a video
    (mp4, webm, mov), audio (mp3, wav, ogg) or text (txt, md). A curator reviews
    every submission before it appears in the gallery.</p>
    <form method="post" action="/submit" enctype="multipart/form-data">
        <label for="name">Name</label>
        <input id="name" name="name" required>
        <label for="age">Age</label>
        <input id="age" name="age" type="number" required>
        <label for="country">Country</label>
        <input id="country" name="country" required>
        <label for="category">Category</label>
        <input id="category" name="category" required>
        <label for="theme">Theme (optional)</label>
        <input id="theme" name="theme" placeholder="e.g. water">
        <label for="description">Description</label>
        <textarea id="description" name="description" required></textarea>
        <label for="file">File</label>
        <input id="file" name="file" type="file" required>
        <button type="submit">Submit</button>
    </form>
</section>"#;

    Ok(Html(render_page(PageLayout {
        meta_title: "Submit",
        heading: "Submit",
        user: Some(&user),
        flash_html: flash,
        body_html: body.to_string(),
    })))
}

pub async fn process_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Redirect, Redirect> {
    let user = auth::require_user_redirect(&state, &jar).await?;

    let form = match uploads::read_submission_form(multipart, state.upload_root(), FILE_FIELD).await
    {
        Ok(form) => form,
        Err(err) if err.message() == uploads::UNSUPPORTED_TYPE_MESSAGE => {
            return Err(Redirect::to("/submit?error=file_type"));
        }
        Err(err) => {
            error!(%err, "failed to read submission form");
            return Err(Redirect::to("/submit?error=upload"));
        }
    };

    let details = match validate_submission(&form) {
        Ok(details) => details,
        Err(rejection) => {
            uploads::discard_stored_file(&form.upload).await;
            return Err(Redirect::to(&format!(
                "/submit?error={}",
                rejection.as_query()
            )));
        }
    };

    // validate_submission guarantees the upload is present.
    let upload = form.upload.as_ref().expect("upload validated");

    let insert = data::insert_project_with_upload(
        state.pool_ref(),
        user.id,
        details.category,
        details.description,
        details.theme,
        &upload.stored_name,
        upload.media_type,
    )
    .await;

    match insert {
        Ok(project_id) => {
            info!(
                %project_id,
                author = %user.id,
                entrant = details.name,
                age = details.age,
                country = details.country,
                file = %upload.original_name,
                bytes = upload.file_size,
                "submission received"
            );
            Ok(Redirect::to("/gallery?status=submitted"))
        }
        Err(err) => {
            error!(?err, "failed to persist submission");
            uploads::discard_stored_file(&form.upload).await;
            Err(Redirect::to("/submit?error=server"))
        }
    }
}

/// Checks the submission's required fields. Nothing is persisted when this
/// returns an error; the caller discards the stored file.
pub fn validate_submission(form: &SubmissionForm) -> Result<SubmissionDetails<'_>, SubmitRejection> {
    let name = form.field("name");
    let age = form.field("age");
    let country = form.field("country");
    let category = form.field("category");
    let description = form.field("description");

    if name.is_empty()
        || age.is_empty()
        || country.is_empty()
        || category.is_empty()
        || description.is_empty()
    {
        return Err(SubmitRejection::MissingField);
    }

    let age: i64 = age.parse().map_err(|_| SubmitRejection::InvalidAge)?;

    if form.upload.is_none() {
        return Err(SubmitRejection::MissingFile);
    }

    let theme = Some(form.field("theme")).filter(|theme| !theme.is_empty());

    Ok(SubmissionDetails {
        name,
        age,
        country,
        category,
        theme,
        description,
    })
}

fn compose_submit_flash(error: Option<&str>) -> String {
    let Some(error) = error else {
        return String::new();
    };

    let message = match error {
        "missing" => "Please complete all required fields and attach a file.",
        "age" => "Age must be a number.",
        "file_type" => "Unsupported file type.",
        "upload" => "We could not process your upload. Please try again.",
        _ => "Something went wrong. Please try again.",
    };

    flash_error(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::models::MediaType;
    use crate::web::uploads::StoredUpload;
    use std::path::PathBuf;

    fn stored_upload() -> StoredUpload {
        StoredUpload {
            original_name: "photo.PNG".to_string(),
            stored_name: "deadbeef_photo.PNG".to_string(),
            stored_path: PathBuf::from("storage/uploads/deadbeef_photo.PNG"),
            media_type: MediaType::Image,
            file_size: 1024,
        }
    }

    fn complete_form() -> SubmissionForm {
        let mut form = SubmissionForm::default()
            .with_field("name", "Ada")
            .with_field("age", "19")
            .with_field("country", "NZ")
            .with_field("category", "Art")
            .with_field("theme", "water")
            .with_field("description", "ripples on the harbour");
        form.upload = Some(stored_upload());
        form
    }

    #[test]
    fn complete_submission_passes_validation() {
        let form = complete_form();
        let details = validate_submission(&form).expect("valid submission");
        assert_eq!(details.name, "Ada");
        assert_eq!(details.age, 19);
        assert_eq!(details.category, "Art");
        assert_eq!(details.theme, Some("water"));
    }

    #[test]
    fn each_required_field_is_enforced() {
        for field in ["name", "age", "country", "category", "description"] {
            let mut form = SubmissionForm::default();
            for other in ["name", "age", "country", "category", "description"] {
                if other != field {
                    form = form.with_field(other, "value");
                }
            }
            form = form.with_field("age", if field == "age" { "" } else { "19" });
            form.upload = Some(stored_upload());

            assert_eq!(
                validate_submission(&form),
                Err(SubmitRejection::MissingField),
                "field {field} should be required"
            );
        }
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        let mut form = SubmissionForm::default()
            .with_field("name", "   ")
            .with_field("age", "19")
            .with_field("country", "NZ")
            .with_field("category", "Art")
            .with_field("description", "desc");
        form.upload = Some(stored_upload());
        assert_eq!(
            validate_submission(&form),
            Err(SubmitRejection::MissingField)
        );
    }

    #[test]
    fn non_numeric_age_is_rejected() {
        let mut form = SubmissionForm::default()
            .with_field("name", "Ada")
            .with_field("age", "nineteen")
            .with_field("country", "NZ")
            .with_field("category", "Art")
            .with_field("description", "desc");
        form.upload = Some(stored_upload());
        assert_eq!(validate_submission(&form), Err(SubmitRejection::InvalidAge));
    }

    #[test]
    fn missing_file_is_rejected() {
        let mut form = complete_form();
        form.upload = None;
        assert_eq!(validate_submission(&form), Err(SubmitRejection::MissingFile));
    }

    #[test]
    fn blank_theme_becomes_none() {
        let mut form = SubmissionForm::default()
            .with_field("name", "Ada")
            .with_field("age", "19")
            .with_field("country", "NZ")
            .with_field("category", "Art")
            .with_field("theme", "  ")
            .with_field("description", "desc");
        form.upload = Some(stored_upload());
        let details = validate_submission(&form).expect("valid submission");
        assert_eq!(details.theme, None);
    }

    #[test]
    fn rejection_maps_to_form_error_codes() {
        assert_eq!(SubmitRejection::MissingField.as_query(), "missing");
        assert_eq!(SubmitRejection::MissingFile.as_query(), "missing");
        assert_eq!(SubmitRejection::InvalidAge.as_query(), "age");
    }
}
