// ABOUTME: GraphQL documents sent to the Canvas endpoint
// ABOUTME: Full enrollment/module model and a lightweight course listing

/// A named GraphQL operation plus the fragments it spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub name: &'static str,
    pub fragments: &'static str,
    pub operation: &'static str,
}

impl Query {
    /// Full request document: fragments first, then the operation.
    pub fn document(&self) -> String {
        format!("{}\n{}", self.fragments.trim(), self.operation.trim())
            .trim()
            .to_string()
    }
}

const FRAGMENTS: &str = r#"
fragment RubricFragment on Rubric {
  id: _id
  title
  pointsPossible
  criteria {
    id: _id
    description
    longDescription
    points
  }
}
fragment SubmissionFragment on Submission {
  id: _id
}
fragment CourseFragment on Course {
  id: _id
  name
  courseCode
}
fragment ModuleFragment on Module {
  id: _id
  name
}
fragment ModuleItemFragment on ModuleItem {
  id: _id
  url
}
fragment SubHeaderFragment on SubHeader {
  type: __typename
  title
}
fragment PageFragment on Page {
  type: __typename
  id: _id
  title
  createdAt
  updatedAt
}
fragment AssignmentFragment on Assignment {
  type: __typename
  id: _id
  name
  description
  url: htmlUrl
  pointsPossible
  rubric {
    ...RubricFragment
  }
  createdAt
  dueAt
  updatedAt
  state
  submissions: submissionsConnection {
    grades: nodes {
      ...SubmissionFragment
    }
  }
}
fragment FileFragment on File {
  type: __typename
  id: _id
  contentType
  url
}
fragment ExtUrlFragment on ExternalUrl {
  type: __typename
  id: _id
  title
  extUrl: url
}
fragment ModuleExtToolFragment on ModuleExternalTool {
  type: __typename
  id: _id
  modUrl: url
}
fragment ExtToolFragment on ExternalTool {
  type: __typename
  id: _id
  name
  description
  url
}
fragment DiscussionFragment on Discussion {
  type: __typename
  id: _id
  title
}
fragment QuizFragment on Quiz {
  type: __typename
  id: _id
  createdAt
  updatedAt
}
"#;

const MODEL_OPERATION: &str = r#"
query ModelQuery($id: ID!) {
  Model: legacyNode(_id: $id, type: User) {
    ... on User {
      enrollments {
        id: _id
        state
        htmlUrl
        course {
          ...CourseFragment
          syllabusBody
          modulesConnection {
            modules: nodes {
              ...ModuleFragment
              items: moduleItems {
                ...ModuleItemFragment
                content {
                  ...SubHeaderFragment
                  ...PageFragment
                  ...AssignmentFragment
                  ...FileFragment
                  ...ExtUrlFragment
                  ...ModuleExtToolFragment
                  ...ExtToolFragment
                  ...DiscussionFragment
                  ...QuizFragment
                }
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Every enrollment of a user with courses, modules, items and their content.
pub const MODEL_QUERY: Query = Query {
    name: "ModelQuery",
    fragments: FRAGMENTS,
    operation: MODEL_OPERATION,
};

/// Enrollment and course ids with names only.
pub const COURSES_QUERY: Query = Query {
    name: "CoursesQuery",
    fragments: "",
    operation: r#"
query CoursesQuery($id: ID!) {
  Model: legacyNode(_id: $id, type: User) {
    ... on User {
      enrollments {
        id: _id
        state
        course {
          id: _id
          name
          courseCode
        }
      }
    }
  }
}
"#,
};
