// ABOUTME: Converts Canvas enrollments into a Things project per course
// ABOUTME: Modules become headings, module items become to-dos with per-type notes

use crate::canvas::{
    Assignment, Content, ContentKind, Course, Enrollment, EnrollmentState, ModuleItem, Rubric,
};
use crate::things::{
    DateValue, DocumentInput, HeadingAttributes, ProjectCreateInput, ProjectInput,
    ProjectItemInput, ProjectRecordInput, RecordInput, SpecialDay, ToDoInput, ToDoRecordInput,
    When,
};
use crate::util::{fallback, format_timestamp};
use crate::{Error, Result};
use chrono::{FixedOffset, Offset, Utc};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub offset: FixedOffset,
    pub skip: BTreeSet<ContentKind>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            offset: Utc.fix(),
            skip: BTreeSet::new(),
        }
    }
}

pub fn convert(enrollments: &[Enrollment], options: &ConvertOptions) -> Result<DocumentInput> {
    if enrollments.is_empty() {
        return Err(Error::Invariant(
            "There should be at least one enrollment!".into(),
        ));
    }

    let data = enrollments
        .iter()
        .map(|enrollment| project(enrollment, options).map(RecordInput::Project))
        .collect::<Result<Vec<_>>>()?;

    Ok(DocumentInput {
        data,
        ..Default::default()
    })
}

fn project(enrollment: &Enrollment, options: &ConvertOptions) -> Result<ProjectRecordInput> {
    let course = enrollment.course.as_ref().ok_or_else(|| {
        Error::Invariant(format!(
            "Enrollment {} should have an associated course!",
            enrollment.id
        ))
    })?;

    let mut attributes = ProjectInput {
        title: Some(course.name.to_string()),
        notes: Some(project_notes(enrollment, course)),
        ..Default::default()
    };
    match enrollment.state {
        Some(EnrollmentState::CreationPending) => {
            attributes.when = Some(When::Special(SpecialDay::Someday));
        }
        Some(EnrollmentState::Inactive) => attributes.canceled = Some(true),
        Some(EnrollmentState::Completed) => attributes.completed = Some(true),
        _ => {}
    }

    let connection = course.modules_connection.as_ref().ok_or_else(|| {
        Error::Invariant(format!(
            "Course {} should have an existent module connection!",
            course.id
        ))
    })?;
    let modules = connection.modules.as_deref().unwrap_or_default();

    if modules.is_empty() {
        debug!(course = course.id, "course has no modules");
        return Ok(ProjectRecordInput::Create(ProjectCreateInput {
            attributes,
            items: None,
        }));
    }

    let mut items = Vec::new();
    for (position, module) in modules.iter().enumerate() {
        let module = module.as_ref().ok_or_else(|| {
            Error::Invariant(format!(
                "Module #{} of course {} should exist!",
                position, course.id
            ))
        })?;

        items.push(ProjectItemInput::Heading(HeadingAttributes {
            title: Some(fallback(&[module.name.as_deref()], "Unknown Heading")),
            archived: None,
        }));

        for item in module.items.iter().flatten() {
            if let Some(todo) = todo(item, options)? {
                items.push(ProjectItemInput::ToDo(ToDoRecordInput::Create(todo)));
            }
        }
    }

    Ok(ProjectRecordInput::Create(ProjectCreateInput {
        attributes,
        items: Some(items),
    }))
}

fn project_notes(enrollment: &Enrollment, course: &Course) -> String {
    format!(
        "- Enrollment id: {}\n\
         - Course id: {}\n\
         - Enrollment url: {}\n\
         \n\
         ## Syllabus\n\
         \n\
         {}",
        enrollment.id,
        course.id,
        enrollment.html_url.as_deref().unwrap_or("none"),
        course
            .syllabus_body
            .as_deref()
            .unwrap_or("No syllabus provided."),
    )
}

fn todo(item: &ModuleItem, options: &ConvertOptions) -> Result<Option<ToDoInput>> {
    let content = item
        .content
        .as_ref()
        .ok_or_else(|| Error::Invariant("Module item should have content!".into()))?;

    if options.skip.contains(&content.kind()) {
        debug!(kind = %content.kind(), "skipping module item");
        return Ok(None);
    }

    let name = item.name.as_deref();
    let offset = &options.offset;
    let kind = content.kind();

    let todo = match content {
        Content::Assignment(a) => ToDoInput {
            title: Some(fallback(&[name, a.name.as_deref()], "No name")),
            notes: Some(assignment_notes(a, offset)),
            deadline: a
                .due_at
                .map(|due| DateValue::Timestamp(due.with_timezone(offset))),
            completed: Some(a.submission_count() > 0),
            ..Default::default()
        },
        Content::Discussion(d) => ToDoInput {
            title: Some(format!(
                "Discussion: {}",
                fallback(&[name, d.title.as_deref()], "No title")
            )),
            notes: Some(type_line(kind)),
            ..Default::default()
        },
        Content::ExternalTool(t) => ToDoInput {
            title: Some(fallback(&[name, t.name.as_deref()], "No name")),
            notes: Some(format!(
                "{}\n\n{}\n- Url: {}",
                t.description.as_deref().unwrap_or("No description provided"),
                type_line(kind),
                t.url.as_deref().unwrap_or("none"),
            )),
            ..Default::default()
        },
        Content::ExternalUrl(u) => ToDoInput {
            title: Some(fallback(&[name, u.title.as_deref()], "No title")),
            notes: Some(format!(
                "{}\n- Url: {}",
                type_line(kind),
                u.ext_url.as_deref().unwrap_or("none"),
            )),
            ..Default::default()
        },
        Content::File(f) => ToDoInput {
            title: Some(fallback(&[name], &format!("File #{}", f.id))),
            notes: Some(format!(
                "{}\n- Content type: {}\n- Url: {}",
                type_line(kind),
                f.content_type.as_deref().unwrap_or("Unknown"),
                f.url.as_deref().unwrap_or("none"),
            )),
            ..Default::default()
        },
        Content::ModuleExternalTool(t) => ToDoInput {
            title: Some(fallback(
                &[name],
                &format!("Module External Tool #{}", t.id),
            )),
            notes: Some(format!(
                "{}\n- Url: {}",
                type_line(kind),
                t.mod_url.as_deref().unwrap_or("none"),
            )),
            ..Default::default()
        },
        Content::Page(p) => ToDoInput {
            title: Some(fallback(&[name, p.title.as_deref()], "No title")),
            notes: Some(format!(
                "{}\n- Created at: {}\n- Last updated: {}",
                type_line(kind),
                format_timestamp(p.created_at.as_ref(), offset),
                format_timestamp(p.updated_at.as_ref(), offset),
            )),
            ..Default::default()
        },
        Content::Quiz(q) => ToDoInput {
            title: Some(fallback(&[name], &q.id.to_string())),
            notes: Some(format!(
                "{}\n- Created at: {}\n- Last updated: {}",
                type_line(kind),
                format_timestamp(q.created_at.as_ref(), offset),
                format_timestamp(q.updated_at.as_ref(), offset),
            )),
            ..Default::default()
        },
        Content::SubHeader(s) => ToDoInput {
            title: Some(fallback(&[name, s.title.as_deref()], "No title")),
            ..Default::default()
        },
    };

    Ok(Some(todo))
}

fn type_line(kind: ContentKind) -> String {
    format!("- Type: {}", kind)
}

fn assignment_notes(a: &Assignment, offset: &FixedOffset) -> String {
    format!(
        "## Info\n\
         \n\
         {}\n\
         \n\
         {}\n\
         - Points possible: {}\n\
         - Url: {}\n\
         - Created at: {}\n\
         - Last updated: {}\n\
         \n\
         ## Rubric\n\
         \n\
         {}",
        a.description.as_deref().unwrap_or("No description provided"),
        type_line(ContentKind::Assignment),
        points(a.points_possible, "unknown"),
        a.url.as_deref().unwrap_or("none"),
        format_timestamp(a.created_at.as_ref(), offset),
        format_timestamp(a.updated_at.as_ref(), offset),
        rubric_section(a.rubric.as_ref()),
    )
}

fn points(value: Option<f64>, missing: &str) -> String {
    value.map(|p| p.to_string()).unwrap_or_else(|| missing.into())
}

fn rubric_section(rubric: Option<&Rubric>) -> String {
    let Some(rubric) = rubric else {
        return "No rubric provided".into();
    };

    let criteria = rubric
        .criteria
        .iter()
        .map(|c| {
            format!(
                "{} point(s) - {}",
                points(c.points, "Unknown number of"),
                c.long_description
                    .as_deref()
                    .unwrap_or("No description provided")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\n- Points possible: {}\n\n{}",
        rubric.title.as_deref().unwrap_or("Unknown title"),
        points(rubric.points_possible, "unknown"),
        criteria
    )
}
