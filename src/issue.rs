// ABOUTME: Structured validation failures shared by both schemas
// ABOUTME: Each issue pairs a JSON path with the expected shape

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every issue found during one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &Path, message: impl Into<String>) {
        self.0.push(Issue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Yields `value` only when nothing was recorded.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, Issues> {
        match value {
            Some(v) if self.is_empty() => Ok(v),
            _ if self.is_empty() => {
                let mut issues = self;
                issues.push(&Path::root(), "validation produced no value");
                Err(issues)
            }
            _ => Err(self),
        }
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issue(s)", self.0.len())?;
        for issue in &self.0 {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for Issues {}

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location inside a JSON value, rendered as `a.b[0].c`.
#[derive(Debug, Clone, Default)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.0.push(Segment::Key(key.to_string()));
        next
    }

    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(Segment::Index(index));
        next
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = Path::root().key("Model").key("enrollments").index(2).key("id");
        assert_eq!(path.to_string(), "Model.enrollments[2].id");
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn test_issues_display_lists_every_issue() {
        let mut issues = Issues::new();
        issues.push(&Path::root().key("id"), "expected number");
        issues.push(&Path::root(), "expected object");

        let rendered = issues.to_string();
        assert!(rendered.starts_with("2 issue(s)"));
        assert!(rendered.contains("id: expected number"));
        assert!(rendered.contains("(root): expected object"));
    }

    #[test]
    fn test_finish_requires_clean_issue_list() {
        let ok: Result<u8, Issues> = Issues::new().finish(Some(1));
        assert_eq!(ok.unwrap(), 1);

        let mut issues = Issues::new();
        issues.push(&Path::root(), "bad");
        assert!(issues.finish(Some(1)).is_err());

        assert!(Issues::new().finish::<u8>(None).is_err());
    }
}
