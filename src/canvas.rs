// ABOUTME: Typed Canvas enrollment/course/module graph decoded from GraphQL JSON
// ABOUTME: Total validation with coercions, collecting every issue with its path

use crate::issue::{Issues, Path};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Decodes a value from untyped JSON, recording problems instead of stopping.
///
/// Returns `None` when the value could not be produced; in that case at least
/// one issue has been pushed for `path` or one of its children.
pub trait Decode: Sized {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self>;
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: &Path, issues: &mut Issues, expected: &str, value: &Value) {
    issues.push(
        path,
        format!("expected {}, received {}", expected, describe(value)),
    );
}

struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: Path,
}

impl<'a> Fields<'a> {
    fn open(value: &'a Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        match value.as_object() {
            Some(map) => Some(Fields {
                map,
                path: path.clone(),
            }),
            None => {
                mismatch(path, issues, "object", value);
                None
            }
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required<T: Decode>(&self, key: &str, issues: &mut Issues) -> Option<T> {
        let path = self.path.key(key);
        match self.present(key) {
            Some(value) => T::decode(value, &path, issues),
            None => {
                issues.push(&path, "required");
                None
            }
        }
    }

    fn optional<T: Decode>(&self, key: &str, issues: &mut Issues) -> Option<T> {
        let value = self.present(key)?;
        T::decode(value, &self.path.key(key), issues)
    }
}

impl Decode for String {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                mismatch(path, issues, "string", other);
                None
            }
        }
    }
}

impl Decode for bool {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                mismatch(path, issues, "boolean", other);
                None
            }
        }
    }
}

impl Decode for u64 {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            mismatch(path, issues, "non-negative integer or numeric string", value);
        }
        parsed
    }
}

impl Decode for f64 {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|v: &f64| v.is_finite());
        if parsed.is_none() {
            mismatch(path, issues, "finite number or numeric string", value);
        }
        parsed
    }
}

impl Decode for DateTime<Utc> {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let parsed = match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        };
        if parsed.is_none() {
            mismatch(path, issues, "ISO 8601 datetime", value);
        }
        parsed
    }
}

/// `null` entries are kept as `None` rather than rejected.
impl<T: Decode> Decode for Option<T> {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::decode(value, path, issues).map(Some)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let Some(entries) = value.as_array() else {
            mismatch(path, issues, "array", value);
            return None;
        };

        let mut out = Vec::with_capacity(entries.len());
        let mut failed = false;
        for (i, entry) in entries.iter().enumerate() {
            match T::decode(entry, &path.index(i), issues) {
                Some(v) => out.push(v),
                None => failed = true,
            }
        }
        (!failed).then_some(out)
    }
}

macro_rules! decode_via_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Decode for $ty {
                fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
                    match <$ty>::deserialize(value) {
                        Ok(v) => Some(v),
                        Err(e) => {
                            issues.push(path, e.to_string());
                            None
                        }
                    }
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    Invited,
    CreationPending,
    Active,
    Deleted,
    Rejected,
    Completed,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    Unpublished,
    Published,
    Deleted,
    Duplicating,
    FailedToDuplicate,
    Importing,
    FailToImport,
    Migrating,
    FailedToMigrate,
}

decode_via_serde!(EnrollmentState, AssignmentState);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredName {
    pub subject: String,
    pub class: String,
    pub section: String,
    pub title: String,
}

/// A course name, split into its parts when it follows `ABCD123: Title (001)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseName {
    Structured(StructuredName),
    Raw(String),
}

fn course_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w{4})(\d{3}): (.+?) \((\d{3})\)").expect("course name pattern is valid")
    })
}

impl CourseName {
    pub fn parse(raw: &str) -> Self {
        match course_name_pattern().captures(raw) {
            Some(caps) => CourseName::Structured(StructuredName {
                subject: caps[1].to_string(),
                class: caps[2].to_string(),
                title: caps[3].to_string(),
                section: caps[4].to_string(),
            }),
            None => CourseName::Raw(raw.to_string()),
        }
    }
}

impl fmt::Display for CourseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseName::Structured(n) => {
                write!(f, "{} {}-{}: {}", n.subject, n.class, n.section, n.title)
            }
            CourseName::Raw(raw) => f.write_str(raw),
        }
    }
}

/// A course code, split into course and term when it follows `ABCD123_001_202420`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseCode {
    Structured(StructuredCode),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCode {
    pub subject: String,
    pub class: u16,
    pub section: u16,
    pub year: u16,
    pub term: u8,
}

fn course_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w{4})(\d{3})_(\d{3})_(\d{4})(\d{2})").expect("course code pattern is valid")
    })
}

impl CourseCode {
    pub fn parse(raw: &str) -> Self {
        let structured = course_code_pattern().captures(raw).and_then(|caps| {
            Some(StructuredCode {
                subject: caps[1].to_string(),
                class: caps[2].parse().ok()?,
                section: caps[3].parse().ok()?,
                year: caps[4].parse().ok()?,
                term: caps[5].parse().ok()?,
            })
        });
        match structured {
            Some(code) => CourseCode::Structured(code),
            None => CourseCode::Raw(raw.to_string()),
        }
    }

    /// `2024/20` for structured codes.
    pub fn term(&self) -> Option<String> {
        match self {
            CourseCode::Structured(c) => Some(format!("{}/{:02}", c.year, c.term)),
            CourseCode::Raw(_) => None,
        }
    }
}

impl Decode for CourseCode {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        String::decode(value, path, issues).map(|raw| CourseCode::parse(&raw))
    }
}

impl Decode for CourseName {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        String::decode(value, path, issues).map(|raw| CourseName::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: u64,
    pub state: Option<EnrollmentState>,
    pub html_url: Option<String>,
    pub course: Option<Course>,
}

impl Decode for Enrollment {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        let id = f.required("id", issues);
        let state = f.optional("state", issues);
        let html_url = f.optional("htmlUrl", issues);
        let course = f.optional("course", issues);
        Some(Enrollment {
            id: id?,
            state,
            html_url,
            course,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: u64,
    pub name: CourseName,
    pub course_code: Option<CourseCode>,
    pub modules_connection: Option<ModulesConnection>,
    pub syllabus_body: Option<String>,
}

impl Decode for Course {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        let id = f.required("id", issues);
        let name = f.required("name", issues);
        let course_code = f.optional("courseCode", issues);
        let modules_connection = f.optional("modulesConnection", issues);
        let syllabus_body = f.optional("syllabusBody", issues);
        Some(Course {
            id: id?,
            name: name?,
            course_code,
            modules_connection,
            syllabus_body,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModulesConnection {
    pub modules: Option<Vec<Option<Module>>>,
}

impl Decode for ModulesConnection {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(ModulesConnection {
            modules: f.optional("modules", issues),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub items: Option<Vec<ModuleItem>>,
}

impl Decode for Module {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(Module {
            id: f.optional("id", issues),
            name: f.optional("name", issues),
            items: f.optional("items", issues),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleItem {
    pub id: Option<u64>,
    pub url: Option<String>,
    pub name: Option<String>,
    pub content: Option<Content>,
}

impl Decode for ModuleItem {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(ModuleItem {
            id: f.optional("id", issues),
            url: f.optional("url", issues),
            name: f.optional("name", issues),
            content: f.optional("content", issues),
        })
    }
}

/// Discriminant of [`Content`], as spelled by the GraphQL `__typename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentKind {
    Assignment,
    Discussion,
    ExternalTool,
    ExternalUrl,
    File,
    ModuleExternalTool,
    Page,
    Quiz,
    SubHeader,
}

impl ContentKind {
    pub const ALL: [ContentKind; 9] = [
        ContentKind::Assignment,
        ContentKind::Discussion,
        ContentKind::ExternalTool,
        ContentKind::ExternalUrl,
        ContentKind::File,
        ContentKind::ModuleExternalTool,
        ContentKind::Page,
        ContentKind::Quiz,
        ContentKind::SubHeader,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Assignment => "Assignment",
            ContentKind::Discussion => "Discussion",
            ContentKind::ExternalTool => "ExternalTool",
            ContentKind::ExternalUrl => "ExternalUrl",
            ContentKind::File => "File",
            ContentKind::ModuleExternalTool => "ModuleExternalTool",
            ContentKind::Page => "Page",
            ContentKind::Quiz => "Quiz",
            ContentKind::SubHeader => "SubHeader",
        }
    }

    fn expected() -> String {
        ContentKind::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so `--skip quiz` and `--skip Quiz` both work.
impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown content type `{}`, expected one of {}",
                    s,
                    ContentKind::expected()
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Assignment(Assignment),
    Discussion(Discussion),
    ExternalTool(ExternalTool),
    ExternalUrl(ExternalUrl),
    File(File),
    ModuleExternalTool(ModuleExternalTool),
    Page(Page),
    Quiz(Quiz),
    SubHeader(SubHeader),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Assignment(_) => ContentKind::Assignment,
            Content::Discussion(_) => ContentKind::Discussion,
            Content::ExternalTool(_) => ContentKind::ExternalTool,
            Content::ExternalUrl(_) => ContentKind::ExternalUrl,
            Content::File(_) => ContentKind::File,
            Content::ModuleExternalTool(_) => ContentKind::ModuleExternalTool,
            Content::Page(_) => ContentKind::Page,
            Content::Quiz(_) => ContentKind::Quiz,
            Content::SubHeader(_) => ContentKind::SubHeader,
        }
    }
}

impl Decode for Content {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        let tag: String = f.required("type", issues)?;
        let kind = match tag.parse::<ContentKind>() {
            // The tag is matched exactly; case folding is for CLI input only.
            Ok(kind) if kind.as_str() == tag => kind,
            _ => {
                issues.push(
                    &path.key("type"),
                    format!(
                        "invalid discriminator `{}`, expected one of {}",
                        tag,
                        ContentKind::expected()
                    ),
                );
                return None;
            }
        };

        match kind {
            ContentKind::Assignment => Assignment::from_fields(&f, issues).map(Content::Assignment),
            ContentKind::Discussion => Discussion::from_fields(&f, issues).map(Content::Discussion),
            ContentKind::ExternalTool => {
                ExternalTool::from_fields(&f, issues).map(Content::ExternalTool)
            }
            ContentKind::ExternalUrl => ExternalUrl::from_fields(&f, issues).map(Content::ExternalUrl),
            ContentKind::File => File::from_fields(&f, issues).map(Content::File),
            ContentKind::ModuleExternalTool => {
                ModuleExternalTool::from_fields(&f, issues).map(Content::ModuleExternalTool)
            }
            ContentKind::Page => Page::from_fields(&f, issues).map(Content::Page),
            ContentKind::Quiz => Quiz::from_fields(&f, issues).map(Content::Quiz),
            ContentKind::SubHeader => SubHeader::from_fields(&f, issues).map(Content::SubHeader),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub points_possible: Option<f64>,
    pub rubric: Option<Rubric>,
    pub created_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub state: AssignmentState,
    pub submissions: Option<SubmissionConnection>,
}

impl Assignment {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let name = f.optional("name", issues);
        let description = f.optional("description", issues);
        let url = f.optional("url", issues);
        let points_possible = f.optional("pointsPossible", issues);
        let rubric = f.optional("rubric", issues);
        let created_at = f.optional("createdAt", issues);
        let due_at = f.optional("dueAt", issues);
        let updated_at = f.optional("updatedAt", issues);
        let state = f.required("state", issues);
        let submissions = f.optional("submissions", issues);
        Some(Assignment {
            id: id?,
            name,
            description,
            url,
            points_possible,
            rubric,
            created_at,
            due_at,
            updated_at,
            state: state?,
            submissions,
        })
    }

    pub fn submission_count(&self) -> usize {
        self.submissions
            .as_ref()
            .and_then(|s| s.grades.as_ref())
            .map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionConnection {
    pub grades: Option<Vec<Submission>>,
}

impl Decode for SubmissionConnection {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(SubmissionConnection {
            grades: f.optional("grades", issues),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: u64,
}

impl Decode for Submission {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(Submission {
            id: f.required("id", issues)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rubric {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub points_possible: Option<f64>,
    pub criteria: Vec<Criterion>,
}

impl Decode for Rubric {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        let id = f.optional("id", issues);
        let title = f.optional("title", issues);
        let points_possible = f.optional("pointsPossible", issues);
        let criteria = f.required("criteria", issues);
        Some(Rubric {
            id,
            title,
            points_possible,
            criteria: criteria?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub id: Option<u64>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub points: Option<f64>,
}

impl Decode for Criterion {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(Criterion {
            id: f.optional("id", issues),
            description: f.optional("description", issues),
            long_description: f.optional("longDescription", issues),
            points: f.optional("points", issues),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discussion {
    pub id: u64,
    pub title: Option<String>,
}

impl Discussion {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let title = f.optional("title", issues);
        Some(Discussion { id: id?, title })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTool {
    pub id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl ExternalTool {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let name = f.optional("name", issues);
        let description = f.optional("description", issues);
        let url = f.optional("url", issues);
        Some(ExternalTool {
            id: id?,
            name,
            description,
            url,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalUrl {
    pub id: u64,
    pub title: Option<String>,
    pub ext_url: Option<String>,
}

impl ExternalUrl {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let title = f.optional("title", issues);
        let ext_url = f.optional("extUrl", issues);
        Some(ExternalUrl {
            id: id?,
            title,
            ext_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: u64,
    pub content_type: Option<String>,
    pub url: Option<String>,
}

impl File {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let content_type = f.optional("contentType", issues);
        let url = f.optional("url", issues);
        Some(File {
            id: id?,
            content_type,
            url,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleExternalTool {
    pub id: u64,
    pub mod_url: Option<String>,
}

impl ModuleExternalTool {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let mod_url = f.optional("modUrl", issues);
        Some(ModuleExternalTool { id: id?, mod_url })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: u64,
    pub title: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let title = f.optional("title", issues);
        let created_at = f.optional("createdAt", issues);
        let updated_at = f.optional("updatedAt", issues);
        Some(Page {
            id: id?,
            title,
            created_at,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub id: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quiz {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        let id = f.required("id", issues);
        let created_at = f.optional("createdAt", issues);
        let updated_at = f.optional("updatedAt", issues);
        Some(Quiz {
            id: id?,
            created_at,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubHeader {
    pub title: Option<String>,
}

impl SubHeader {
    fn from_fields(f: &Fields<'_>, issues: &mut Issues) -> Option<Self> {
        Some(SubHeader {
            title: f.optional("title", issues),
        })
    }
}

/// Decodes the `data` of a user enrollments query: `{ Model: { enrollments: [...] } }`.
///
/// Either every enrollment is valid or the complete list of issues is returned.
pub fn decode_enrollments(data: &Value) -> Result<Vec<Enrollment>, Issues> {
    let mut issues = Issues::new();
    let root = Path::root();

    let enrollments = Fields::open(data, &root, &mut issues)
        .and_then(|f| f.required::<ModelNode>("Model", &mut issues))
        .map(|model| model.enrollments);

    issues.finish(enrollments)
}

struct ModelNode {
    enrollments: Vec<Enrollment>,
}

impl Decode for ModelNode {
    fn decode(value: &Value, path: &Path, issues: &mut Issues) -> Option<Self> {
        let f = Fields::open(value, path, issues)?;
        Some(ModelNode {
            enrollments: f.required("enrollments", issues)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode<T: Decode>(value: Value) -> Result<T, Issues> {
        let mut issues = Issues::new();
        let out = T::decode(&value, &Path::root(), &mut issues);
        issues.finish(out)
    }

    #[test]
    fn test_course_name_structured() {
        let name = CourseName::parse("CSCN112: Intro to Something (001)");
        assert_eq!(
            name,
            CourseName::Structured(StructuredName {
                subject: "CSCN".into(),
                class: "112".into(),
                section: "001".into(),
                title: "Intro to Something".into(),
            })
        );
        assert_eq!(name.to_string(), "CSCN 112-001: Intro to Something");
    }

    #[test]
    fn test_course_name_raw_passthrough() {
        let name = CourseName::parse("Orientation for New Students");
        assert_eq!(name, CourseName::Raw("Orientation for New Students".into()));
        assert_eq!(name.to_string(), "Orientation for New Students");
    }

    #[test]
    fn test_numeric_string_coercion() {
        assert_eq!(decode::<u64>(json!("497698")).unwrap(), 497698);
        assert_eq!(decode::<u64>(json!(42)).unwrap(), 42);
        assert_eq!(decode::<f64>(json!("12.5")).unwrap(), 12.5);
        assert_eq!(decode::<f64>(json!(" 7 ")).unwrap(), 7.0);
        assert!(decode::<u64>(json!("abc")).is_err());
        assert!(decode::<u64>(json!(true)).is_err());
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", "Infinity"] {
            let err = decode::<f64>(json!(raw)).unwrap_err();
            assert!(err.iter().next().unwrap().message.contains("finite number"));
        }

        let err = decode::<Content>(json!({
            "type": "Assignment",
            "id": "1",
            "state": "published",
            "pointsPossible": "NaN"
        }))
        .unwrap_err();
        assert_eq!(err.iter().next().unwrap().path, "pointsPossible");
    }

    #[test]
    fn test_null_submission_entry_is_an_issue() {
        let err = decode::<Content>(json!({
            "type": "Assignment",
            "id": "1",
            "state": "published",
            "submissions": { "grades": [null] }
        }))
        .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.iter().next().unwrap().path, "submissions.grades[0]");
    }

    #[test]
    fn test_course_code_structured() {
        let code = CourseCode::parse("CSCN112_001_202420");
        assert_eq!(
            code,
            CourseCode::Structured(StructuredCode {
                subject: "CSCN".into(),
                class: 112,
                section: 1,
                year: 2024,
                term: 20,
            })
        );
        assert_eq!(code.term().as_deref(), Some("2024/20"));
    }

    #[test]
    fn test_course_code_raw_passthrough() {
        let code = CourseCode::parse("ORIENT");
        assert_eq!(code, CourseCode::Raw("ORIENT".into()));
        assert_eq!(code.term(), None);
    }

    #[test]
    fn test_datetime_coercion() {
        let dt = decode::<DateTime<Utc>>(json!("2024-01-05T15:30:00-05:00")).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-05T20:30:00+00:00");
        assert!(decode::<DateTime<Utc>>(json!("next tuesday")).is_err());
    }

    #[test]
    fn test_content_dispatch_on_type() {
        let content: Content = decode(json!({
            "type": "SubHeader",
            "title": "Week 1"
        }))
        .unwrap();
        assert_eq!(
            content,
            Content::SubHeader(SubHeader {
                title: Some("Week 1".into())
            })
        );
        assert_eq!(content.kind(), ContentKind::SubHeader);
    }

    #[test]
    fn test_content_unknown_type_is_an_issue() {
        let err = decode::<Content>(json!({ "type": "Wiki", "id": "1" })).unwrap_err();
        assert_eq!(err.len(), 1);
        let issue = err.iter().next().unwrap();
        assert_eq!(issue.path, "type");
        assert!(issue.message.contains("Wiki"));
    }

    #[test]
    fn test_content_tag_is_case_sensitive() {
        assert!(decode::<Content>(json!({ "type": "subheader" })).is_err());
    }

    #[test]
    fn test_assignment_decodes_with_rubric_and_submissions() {
        let content: Content = decode(json!({
            "type": "Assignment",
            "id": "77",
            "name": "Essay",
            "description": "<p>Write</p>",
            "url": "https://canvas.example.edu/courses/9/assignments/77",
            "pointsPossible": 100,
            "rubric": {
                "id": "3",
                "title": "Essay rubric",
                "pointsPossible": "100",
                "criteria": [{ "id": "1", "longDescription": "Thesis", "points": 50 }]
            },
            "createdAt": "2024-01-01T12:00:00Z",
            "dueAt": "2024-02-01T04:59:00Z",
            "updatedAt": null,
            "state": "published",
            "submissions": { "grades": [{ "id": "5", "gradingStatus": "graded" }] }
        }))
        .unwrap();

        let Content::Assignment(a) = content else {
            panic!("expected assignment");
        };
        assert_eq!(a.id, 77);
        assert_eq!(a.points_possible, Some(100.0));
        assert_eq!(a.rubric.as_ref().unwrap().criteria.len(), 1);
        assert_eq!(a.state, AssignmentState::Published);
        assert_eq!(a.submission_count(), 1);
    }

    #[test]
    fn test_decode_collects_every_issue() {
        let err = decode_enrollments(&json!({
            "Model": {
                "enrollments": [
                    { "id": "x", "state": "sleeping" },
                    { "course": { "id": "9" } }
                ]
            }
        }))
        .unwrap_err();

        let paths: Vec<_> = err.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "Model.enrollments[0].id",
                "Model.enrollments[0].state",
                "Model.enrollments[1].id",
                "Model.enrollments[1].course.name",
            ]
        );
    }

    #[test]
    fn test_decode_enrollments_nullish_fields() {
        let enrollments = decode_enrollments(&json!({
            "Model": {
                "enrollments": [{
                    "id": "1",
                    "state": "active",
                    "htmlUrl": null,
                    "course": {
                        "id": "9",
                        "name": "CSCN112: Intro (001)",
                        "modulesConnection": {
                            "modules": [
                                null,
                                { "id": "4", "name": null, "items": null }
                            ]
                        }
                    }
                }]
            }
        }))
        .unwrap();

        assert_eq!(enrollments.len(), 1);
        let course = enrollments[0].course.as_ref().unwrap();
        let modules = course
            .modules_connection
            .as_ref()
            .and_then(|c| c.modules.as_ref())
            .unwrap();
        assert_eq!(modules.len(), 2);
        assert!(modules[0].is_none());
        assert!(course.syllabus_body.is_none());
    }

    #[test]
    fn test_decode_enrollments_missing_model() {
        let err = decode_enrollments(&json!({ "Model": null })).unwrap_err();
        assert_eq!(err.iter().next().unwrap().path, "Model");
    }

    #[test]
    fn test_content_kind_from_str() {
        assert_eq!("quiz".parse::<ContentKind>(), Ok(ContentKind::Quiz));
        assert_eq!(
            "ModuleExternalTool".parse::<ContentKind>(),
            Ok(ContentKind::ModuleExternalTool)
        );
        assert!("wiki".parse::<ContentKind>().is_err());
    }
}
