// ABOUTME: Things 3 JSON import document: converter-facing input and validated output
// ABOUTME: Validation checks every record and renders dates, tags and checklists

pub mod grammar;

pub use grammar::{DateTimeValue, DateValue, TimeValue};

use crate::issue::{Issues, Path};
use crate::url::ShortcutUrl;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const THINGS_JSON_URL: &str = "things:///json";

const MAX_CHECKLIST_ITEMS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialDay {
    Today,
    Tomorrow,
    Evening,
    Anytime,
    Someday,
}

impl SpecialDay {
    pub fn as_str(self) -> &'static str {
        match self {
            SpecialDay::Today => "today",
            SpecialDay::Tomorrow => "tomorrow",
            SpecialDay::Evening => "evening",
            SpecialDay::Anytime => "anytime",
            SpecialDay::Someday => "someday",
        }
    }
}

/// Scheduling hint. Only the rendered string reaches the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum When {
    Special(SpecialDay),
    Date(DateValue),
    DateTime(DateTimeValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadingAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChecklistItemAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled: Option<bool>,
}

// === INPUT ===

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToDoInput {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub when: Option<When>,
    pub deadline: Option<DateValue>,
    pub tags: Option<Vec<String>>,
    pub checklist_items: Option<Vec<ChecklistItemAttributes>>,
    pub list_id: Option<String>,
    pub list: Option<String>,
    pub heading_id: Option<String>,
    pub heading: Option<String>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    pub creation_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToDoUpdateInput {
    pub attributes: ToDoInput,
    pub prepend_notes: Option<String>,
    pub append_notes: Option<String>,
    pub add_tags: Option<Vec<String>>,
    pub prepend_checklist_items: Option<Vec<String>>,
    pub append_checklist_items: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToDoRecordInput {
    Create(ToDoInput),
    Update(ToDoUpdateInput),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub when: Option<When>,
    pub deadline: Option<DateValue>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
    pub canceled: Option<bool>,
    pub creation_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub area_id: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectItemInput {
    ToDo(ToDoRecordInput),
    Heading(HeadingAttributes),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCreateInput {
    pub attributes: ProjectInput,
    pub items: Option<Vec<ProjectItemInput>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdateInput {
    pub attributes: ProjectInput,
    pub prepend_notes: Option<String>,
    pub append_notes: Option<String>,
    pub add_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectRecordInput {
    Create(ProjectCreateInput),
    Update(ProjectUpdateInput),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordInput {
    ToDo(ToDoRecordInput),
    Project(ProjectRecordInput),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInput {
    pub auth_token: Option<String>,
    pub reveal: Option<bool>,
    pub data: Vec<RecordInput>,
}

// === OUTPUT ===

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToDoAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist_items: Option<Vec<ChecklistItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToDoUpdateAttributes {
    #[serde(flatten)]
    pub attributes: ToDoAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepend_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepend_checklist_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_checklist_items: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectCreateAttributes {
    #[serde(flatten)]
    pub attributes: ProjectAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ProjectItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectUpdateAttributes {
    #[serde(flatten)]
    pub attributes: ProjectAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepend_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_tags: Option<String>,
}

/// Wire shape shared by every record: `{ type, operation?, attributes }`.
#[derive(Serialize)]
struct Envelope<'a, A> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<&'static str>,
    attributes: &'a A,
}

fn envelope<S: Serializer, A: Serialize>(
    serializer: S,
    kind: &'static str,
    operation: Option<&'static str>,
    attributes: &A,
) -> Result<S::Ok, S::Error> {
    Envelope {
        kind,
        operation,
        attributes,
    }
    .serialize(serializer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem(pub ChecklistItemAttributes);

impl Serialize for ChecklistItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        envelope(serializer, "checklist-item", None, &self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToDo {
    Create(ToDoAttributes),
    Update(ToDoUpdateAttributes),
}

impl Serialize for ToDo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToDo::Create(a) => envelope(serializer, "to-do", Some("create"), a),
            ToDo::Update(a) => envelope(serializer, "to-do", Some("update"), a),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectItem {
    ToDo(ToDo),
    Heading(HeadingAttributes),
}

impl Serialize for ProjectItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProjectItem::ToDo(todo) => todo.serialize(serializer),
            ProjectItem::Heading(a) => envelope(serializer, "heading", None, a),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Project {
    Create(ProjectCreateAttributes),
    Update(ProjectUpdateAttributes),
}

impl Serialize for Project {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Project::Create(a) => envelope(serializer, "project", Some("create"), a),
            Project::Update(a) => envelope(serializer, "project", Some("update"), a),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    ToDo(ToDo),
    Project(Project),
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Record::ToDo(todo) => todo.serialize(serializer),
            Record::Project(project) => project.serialize(serializer),
        }
    }
}

/// A validated import document. Construct through [`DocumentInput::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    auth_token: Option<String>,
    reveal: Option<bool>,
    data: Vec<Record>,
}

impl Document {
    pub fn data(&self) -> &[Record] {
        &self.data
    }

    /// `things:///json?...` with one JSON-encoded parameter per present field.
    pub fn to_url(&self) -> Result<ShortcutUrl, serde_json::Error> {
        let mut params = Map::new();
        if let Some(token) = &self.auth_token {
            params.insert("auth-token".into(), Value::String(token.clone()));
        }
        if let Some(reveal) = self.reveal {
            params.insert("reveal".into(), Value::Bool(reveal));
        }
        params.insert("data".into(), serde_json::to_value(&self.data)?);

        let mut url = ShortcutUrl::new(THINGS_JSON_URL);
        url.add_params(&params);
        Ok(url)
    }
}

// === VALIDATION ===

impl DocumentInput {
    /// Checks every record and renders all formatted fields.
    ///
    /// Returns the complete list of problems if anything is invalid.
    pub fn validate(self) -> Result<Document, Issues> {
        let mut issues = Issues::new();
        let root = Path::root();
        let data_path = root.key("data");

        if self.data.is_empty() {
            issues.push(&data_path, "expected a non-empty array");
        }

        let data: Vec<Record> = self
            .data
            .into_iter()
            .enumerate()
            .map(|(i, record)| validate_record(record, &data_path.index(i), &mut issues))
            .collect();

        let document = Document {
            auth_token: self.auth_token,
            reveal: self.reveal,
            data,
        };
        issues.finish(Some(document))
    }
}

fn validate_record(record: RecordInput, path: &Path, issues: &mut Issues) -> Record {
    match record {
        RecordInput::ToDo(todo) => Record::ToDo(validate_todo(todo, path, issues)),
        RecordInput::Project(project) => Record::Project(validate_project(project, path, issues)),
    }
}

fn validate_todo(todo: ToDoRecordInput, path: &Path, issues: &mut Issues) -> ToDo {
    let attrs = path.key("attributes");
    match todo {
        ToDoRecordInput::Create(input) => ToDo::Create(todo_attributes(input, &attrs, issues)),
        ToDoRecordInput::Update(input) => ToDo::Update(ToDoUpdateAttributes {
            attributes: todo_attributes(input.attributes, &attrs, issues),
            prepend_notes: input.prepend_notes,
            append_notes: input.append_notes,
            add_tags: joined(input.add_tags, ",", None, &attrs.key("add-tags"), issues),
            prepend_checklist_items: joined(
                input.prepend_checklist_items,
                "\n",
                Some(MAX_CHECKLIST_ITEMS),
                &attrs.key("prepend-checklist-items"),
                issues,
            ),
            append_checklist_items: joined(
                input.append_checklist_items,
                "\n",
                Some(MAX_CHECKLIST_ITEMS),
                &attrs.key("append-checklist-items"),
                issues,
            ),
        }),
    }
}

fn validate_project(project: ProjectRecordInput, path: &Path, issues: &mut Issues) -> Project {
    let attrs = path.key("attributes");
    match project {
        ProjectRecordInput::Create(input) => {
            let attributes = project_attributes(input.attributes, &attrs, issues);
            let items = input.items.map(|items| {
                let items_path = attrs.key("items");
                if items.is_empty() {
                    issues.push(&items_path, "expected a non-empty array");
                }
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = items_path.index(i);
                        match item {
                            ProjectItemInput::ToDo(todo) => {
                                ProjectItem::ToDo(validate_todo(todo, &item_path, issues))
                            }
                            ProjectItemInput::Heading(heading) => ProjectItem::Heading(heading),
                        }
                    })
                    .collect()
            });
            Project::Create(ProjectCreateAttributes { attributes, items })
        }
        ProjectRecordInput::Update(input) => Project::Update(ProjectUpdateAttributes {
            attributes: project_attributes(input.attributes, &attrs, issues),
            prepend_notes: input.prepend_notes,
            append_notes: input.append_notes,
            add_tags: joined(input.add_tags, ",", None, &attrs.key("add-tags"), issues),
        }),
    }
}

fn todo_attributes(input: ToDoInput, path: &Path, issues: &mut Issues) -> ToDoAttributes {
    let checklist_items = input.checklist_items.map(|items| {
        bounded(
            items.len(),
            Some(MAX_CHECKLIST_ITEMS),
            &path.key("checklist-items"),
            issues,
        );
        items.into_iter().map(ChecklistItem).collect()
    });

    ToDoAttributes {
        title: input.title,
        notes: input.notes,
        when: input.when.and_then(|w| when(&w, &path.key("when"), issues)),
        deadline: input
            .deadline
            .and_then(|d| rendered(grammar::render_date(&d), &path.key("deadline"), issues)),
        tags: non_empty(input.tags, &path.key("tags"), issues),
        checklist_items,
        list_id: checked_uuid(input.list_id, &path.key("list-id"), issues),
        list: input.list,
        heading_id: checked_uuid(input.heading_id, &path.key("heading-id"), issues),
        heading: input.heading,
        completed: input.completed,
        canceled: input.canceled,
        creation_date: input.creation_date.map(|d| iso(&d)),
        completion_date: input.completion_date.map(|d| iso(&d)),
    }
}

fn project_attributes(input: ProjectInput, path: &Path, issues: &mut Issues) -> ProjectAttributes {
    ProjectAttributes {
        title: input.title,
        notes: input.notes,
        when: input.when.and_then(|w| when(&w, &path.key("when"), issues)),
        deadline: input
            .deadline
            .and_then(|d| rendered(grammar::render_date(&d), &path.key("deadline"), issues)),
        tags: non_empty(input.tags, &path.key("tags"), issues),
        completed: input.completed,
        canceled: input.canceled,
        creation_date: input.creation_date.map(|d| iso(&d)),
        completion_date: input.completion_date.map(|d| iso(&d)),
        area_id: checked_uuid(input.area_id, &path.key("area-id"), issues),
        area: input.area,
    }
}

fn when(value: &When, path: &Path, issues: &mut Issues) -> Option<String> {
    match value {
        When::Special(day) => Some(day.as_str().to_string()),
        When::Date(date) => rendered(grammar::render_date(date), path, issues),
        When::DateTime(dt) => rendered(grammar::render_date_time(dt), path, issues),
    }
}

fn rendered(result: Result<String, String>, path: &Path, issues: &mut Issues) -> Option<String> {
    result.map_err(|e| issues.push(path, e)).ok()
}

fn bounded(len: usize, max: Option<usize>, path: &Path, issues: &mut Issues) {
    if len == 0 {
        issues.push(path, "expected a non-empty array");
    }
    if let Some(max) = max.filter(|max| len > *max) {
        issues.push(path, format!("expected at most {} entries, received {}", max, len));
    }
}

fn non_empty(values: Option<Vec<String>>, path: &Path, issues: &mut Issues) -> Option<Vec<String>> {
    let values = values?;
    bounded(values.len(), None, path, issues);
    Some(values)
}

fn joined(
    values: Option<Vec<String>>,
    separator: &str,
    max: Option<usize>,
    path: &Path,
    issues: &mut Issues,
) -> Option<String> {
    let values = values?;
    bounded(values.len(), max, path, issues);
    Some(values.join(separator))
}

fn checked_uuid(value: Option<String>, path: &Path, issues: &mut Issues) -> Option<String> {
    let value = value?;
    if uuid::Uuid::parse_str(&value).is_err() {
        issues.push(path, format!("invalid uuid `{}`", value));
    }
    Some(value)
}

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
