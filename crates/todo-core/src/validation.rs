//! Boundary field validation.
//!
//! Raw request payloads are checked here, before any storage access, and
//! violations are reported as the machine-readable message codes the API
//! exposes (`title_too_short`, `invalid_email_format`, ...). A single
//! request can fail several checks at once; all codes are collected.

use std::sync::LazyLock;

use regex::Regex;

use crate::todo::{TodoCreate, TodoPatch};
use crate::user::{RegisterRequest, UserPatch};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 30;
const TITLE_MIN: usize = 2;
const TITLE_MAX: usize = 30;
const DESCRIPTION_MIN: usize = 2;
const DESCRIPTION_MAX: usize = 255;
const PASSWORD_MIN: usize = 8;

/// One or more field-level violations, as wire message codes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", .messages.join(", "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// Collects violation codes across a payload's fields.
#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn push(&mut self, code: &str) {
        self.0.push(code.to_owned());
    }

    fn length(&mut self, value: &str, min: usize, max: usize, short: &str, long: &str) {
        let len = value.chars().count();
        if len < min {
            self.push(short);
        } else if len > max {
            self.push(long);
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { messages: self.0 })
        }
    }
}

pub fn validate_todo_create(data: &TodoCreate) -> Result<(), ValidationError> {
    let mut v = Violations::default();
    v.length(&data.title, TITLE_MIN, TITLE_MAX, "title_too_short", "title_too_long");
    v.length(
        &data.description,
        DESCRIPTION_MIN,
        DESCRIPTION_MAX,
        "description_too_short",
        "description_too_long",
    );
    v.finish()
}

pub fn validate_todo_patch(data: &TodoPatch) -> Result<(), ValidationError> {
    let mut v = Violations::default();
    if let Some(title) = &data.title {
        v.length(title, TITLE_MIN, TITLE_MAX, "title_too_short", "title_too_long");
    }
    if let Some(description) = &data.description {
        v.length(
            description,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
            "description_too_short",
            "description_too_long",
        );
    }
    v.finish()
}

pub fn validate_registration(data: &RegisterRequest) -> Result<(), ValidationError> {
    let mut v = Violations::default();
    if data.first_name.is_empty() {
        v.push("firstname_required");
    } else {
        v.length(
            &data.first_name,
            NAME_MIN,
            NAME_MAX,
            "firstname_too_short",
            "firstname_too_long",
        );
    }
    if data.last_name.is_empty() {
        v.push("lastname_required");
    } else {
        v.length(
            &data.last_name,
            NAME_MIN,
            NAME_MAX,
            "lastname_too_short",
            "lastname_too_long",
        );
    }
    if data.email.is_empty() {
        v.push("email_required");
    } else if !EMAIL_RE.is_match(&data.email) {
        v.push("invalid_email_format");
    }
    if data.password.is_empty() {
        v.push("password_required");
    } else if data.password.chars().count() < PASSWORD_MIN {
        v.push("password_too_short");
    }
    v.finish()
}

pub fn validate_user_patch(data: &UserPatch) -> Result<(), ValidationError> {
    let mut v = Violations::default();
    if let Some(first_name) = &data.first_name {
        v.length(
            first_name,
            NAME_MIN,
            NAME_MAX,
            "firstname_too_short",
            "firstname_too_long",
        );
    }
    if let Some(last_name) = &data.last_name {
        v.length(
            last_name,
            NAME_MIN,
            NAME_MAX,
            "lastname_too_short",
            "lastname_too_long",
        );
    }
    if let Some(email) = &data.email {
        if !EMAIL_RE.is_match(email) {
            v.push("invalid_email_format");
        }
    }
    if let Some(password) = &data.password {
        if password.chars().count() < PASSWORD_MIN {
            v.push("password_too_short");
        }
    }
    v.finish()
}
