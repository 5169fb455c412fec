use std::fmt;

/// One step in a path into a validated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElem {
    /// Named field.
    Field(&'static str),
    /// Map key (data source name, color key, ...).
    Key(String),
    /// Sequence index.
    Index(usize),
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location of the offending value, rooted at `$`.
    pub path: Vec<PathElem>,
    /// Human readable description of the violation.
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn at(path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// Render the path as `$.components[1].id`.
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Key(key) => {
                s.push_str("[\"");
                s.push_str(key);
                s.push_str("\"]");
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// Outcome of a validation pass. Collects every violation instead of stopping at the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// All violations in document order.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Empty (valid) report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report holding a single issue.
    pub fn single(path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            errors: vec![ValidationIssue::at(path, message)],
        }
    }

    /// `true` when no violation was recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn push(&mut self, path: &[PathElem], message: impl Into<String>) {
        self.errors.push(ValidationIssue::at(path, message));
    }

    /// Convert into `Err(Validation)` when any violation was recorded.
    pub fn into_result(self) -> crate::PagesmithResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::PagesmithError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Build a child path without mutating the parent.
pub(crate) fn join(path: &[PathElem], tail: &[PathElem]) -> Vec<PathElem> {
    [path, tail].concat()
}
