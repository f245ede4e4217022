//! Page path validation
//!
//! The title captured here is later used verbatim as a file name, so the
//! allow-list is the only thing standing between a request path and the
//! filesystem. Keep it anchored at both ends.

use regex::Regex;

/// Full-path allow-list: action segment followed by an alphanumeric title.
pub const PAGE_PATH_PATTERN: &str = r"^/(edit|save|view)/([a-zA-Z0-9]+)$";

/// Page action selected by the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Save,
    View,
}

impl Action {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "edit" => Some(Self::Edit),
            "save" => Some(Self::Save),
            "view" => Some(Self::View),
            _ => None,
        }
    }

    /// Path prefix routed to this action, e.g. `/view/`
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Edit => "/edit/",
            Self::Save => "/save/",
            Self::View => "/view/",
        }
    }

    /// Request path for this action on `title`
    pub fn path_for(self, title: &str) -> String {
        format!("{}{title}", self.prefix())
    }
}

/// A request path that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidPath<'a> {
    pub action: Action,
    pub title: &'a str,
}

/// Compiled page path pattern, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    regex: Regex,
}

impl RoutePattern {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(PAGE_PATH_PATTERN)?,
        })
    }

    /// Match `path` against the allow-list, returning the action and title
    pub fn validate<'a>(&self, path: &'a str) -> Option<ValidPath<'a>> {
        let captures = self.regex.captures(path)?;
        let action = Action::from_segment(captures.get(1)?.as_str())?;
        let title = captures.get(2)?.as_str();
        Some(ValidPath { action, title })
    }
}
