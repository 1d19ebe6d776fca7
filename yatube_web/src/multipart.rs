use axum::extract::Multipart;
use yatube_core::forms::{PostForm, Upload};

use crate::error::AppError;

/// Reads the post authoring form. Unknown parts are skipped.
pub async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, AppError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "text" => form.text = field.text().await?,
            "group" => form.group = Some(field.text().await?),
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();

                form.image = Some(Upload {
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}
