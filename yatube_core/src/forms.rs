//! Typed forms submitted by the web surface.
//!
//! Each form validates into a clean value or a [`FormErrors`] map that the
//! handler hands back to the template together with the submitted values.

use std::collections::BTreeMap;

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::entity::prelude::GroupModel;
use crate::ids::GroupId;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const INVALID_LOGIN: &str = "Please enter a correct username and password. Note that both fields may be case-sensitive.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD: &str = "__all__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD, message);
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.field(NON_FIELD)
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

fn validated(form: &impl Validate) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(errors) => errors.into(),
    }
}

/// A file part of a multipart submission.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// A file input left blank still arrives as a nameless, empty part.
    pub fn is_absent(&self) -> bool {
        self.filename.is_empty() && self.bytes.is_empty()
    }
}

/// An upload that decoded as an image.
#[derive(Debug, Clone)]
pub struct CleanImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl CleanImage {
    /// File extension for the detected format, without the dot.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

fn clean_image(upload: &Upload) -> Result<ImageFormat, &'static str> {
    if upload.bytes.is_empty() {
        return Err(EMPTY_FILE);
    }

    let format = image::guess_format(&upload.bytes).map_err(|_| INVALID_IMAGE)?;
    image::load_from_memory_with_format(&upload.bytes, format).map_err(|_| INVALID_IMAGE)?;
    Ok(format)
}

#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    /// Id of the chosen group; empty means none.
    pub group: Option<String>,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<CleanImage>,
}

impl PostForm {
    /// Form pre-filled from an existing post, for the edit page.
    pub fn for_edit(text: &str, group_id: Option<GroupId>) -> Self {
        PostForm {
            text: text.to_string(),
            group: group_id.map(|id| id.to_string()),
            image: None,
        }
    }

    pub fn selected_group(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }

    /// Validates against the groups that may be chosen. On success the upload
    /// moves into the clean value.
    pub fn clean(&mut self, groups: &[GroupModel]) -> Result<CleanPost, FormErrors> {
        self.text = self.text.trim().to_string();
        let mut errors = validated(&*self);

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let chosen = raw
                    .parse::<GroupId>()
                    .ok()
                    .filter(|id| groups.iter().any(|group| group.id == *id));
                if chosen.is_none() {
                    errors.add("group", INVALID_CHOICE);
                }
                chosen
            }
        };

        let format = match self.image.as_ref().filter(|upload| !upload.is_absent()) {
            None => None,
            Some(upload) => match clean_image(upload) {
                Ok(format) => Some(format),
                Err(message) => {
                    errors.add("image", message);
                    None
                }
            },
        };

        errors.into_result()?;

        let image = match (format, self.image.take()) {
            (Some(format), Some(upload)) => Some(CleanImage {
                bytes: upload.bytes,
                format,
            }),
            _ => None,
        };

        Ok(CleanPost {
            text: self.text.clone(),
            group_id,
            image,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(mut self) -> Result<String, FormErrors> {
        self.text = self.text.trim().to_string();
        validated(&self).into_result()?;
        Ok(self.text)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    /// Where to go after logging in; only local paths are honoured.
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn clean(&mut self) -> Result<(), FormErrors> {
        self.username = self.username.trim().to_string();
        validated(&*self).into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(
        max = 150,
        message = "Ensure this value has at most 150 characters."
    ))]
    pub username: String,
    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

impl SignupForm {
    /// Checks the submitted fields; whether the username is free is up to the
    /// user directory.
    pub fn clean(&mut self) -> Result<(), FormErrors> {
        self.username = self.username.trim().to_string();
        let mut errors = validated(&*self);

        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        } else if !is_valid_username(&self.username) {
            errors.add("username", INVALID_USERNAME);
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        errors.into_result()
    }
}
