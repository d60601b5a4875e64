// ABOUTME: Pipeline from Canvas enrollments to a delivered Things URL
// ABOUTME: Fetch or load, convert, validate, encode, then write or print

use crate::{
    api::{self, ApiClient},
    canvas::{decode_enrollments, CourseCode, Enrollment},
    convert::{convert, ConvertOptions},
    storage::write_atomic,
    url::ShortcutUrl,
    Result,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub convert: ConvertOptions,
    pub reveal: bool,
    pub destination: Destination,
}

pub fn build_url(
    enrollments: &[Enrollment],
    options: &ConvertOptions,
    reveal: bool,
) -> Result<ShortcutUrl> {
    let mut input = convert(enrollments, options)?;
    if reveal {
        input.reveal = Some(true);
    }

    let document = input.validate()?;
    info!(records = document.data().len(), "built Things document");

    Ok(document.to_url()?)
}

pub fn deliver(url: &ShortcutUrl, destination: &Destination) -> Result<()> {
    let href = url.href();
    match destination {
        Destination::Stdout => println!("{}", href),
        Destination::File(path) => {
            write_atomic(path, href.as_bytes())?;
            info!(path = %path.display(), bytes = href.len(), "wrote Things URL");
        }
    }
    Ok(())
}

pub fn run_sync(client: &ApiClient, user_id: u64, options: &SyncOptions) -> Result<ShortcutUrl> {
    info!(user_id, endpoint = client.endpoint(), "fetching enrollments");
    let enrollments = client.enrollments(user_id)?;

    let url = build_url(&enrollments, &options.convert, options.reveal)?;
    deliver(&url, &options.destination)?;
    Ok(url)
}

pub fn run_convert_file(path: &Path, options: &SyncOptions) -> Result<ShortcutUrl> {
    let content = fs::read_to_string(path)?;
    let body: Value = serde_json::from_str(&content)?;

    let is_envelope = body.get("data").is_some() || body.get("errors").is_some();
    let data = if is_envelope {
        api::unwrap_response(body)?
    } else {
        body
    };

    let enrollments = decode_enrollments(&data)?;
    info!(count = enrollments.len(), path = %path.display(), "loaded enrollments");

    let url = build_url(&enrollments, &options.convert, options.reveal)?;
    deliver(&url, &options.destination)?;
    Ok(url)
}

pub fn list_courses(client: &ApiClient, user_id: u64) -> Result<Vec<Enrollment>> {
    let enrollments = client.course_list(user_id)?;
    info!(count = enrollments.len(), "listed enrollments");
    Ok(enrollments)
}

pub fn course_line(enrollment: &Enrollment) -> String {
    match &enrollment.course {
        Some(course) => {
            let term = course
                .course_code
                .as_ref()
                .and_then(CourseCode::term)
                .unwrap_or_else(|| "-".into());
            format!("{}\t{}\t{}\t{}", enrollment.id, course.id, term, course.name)
        }
        None => format!("{}\t-\t-\t(no course)", enrollment.id),
    }
}
