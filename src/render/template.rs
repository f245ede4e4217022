//! Page templates
//!
//! Templates are plain HTML with two actions: `{{.Title}}` and `{{.Body}}`.
//! `{{printf "%s" .Body}}` is accepted as a spelling of `{{.Body}}`.
//! Every substituted value is HTML-escaped; literal text is emitted as is.
//! Escaping covers `& < > "`, so attribute values in templates must be
//! double-quoted.

use crate::storage::Page;
use maud::Escaper;
use std::collections::HashMap;
use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ACTION_OPEN: &str = "{{";
const ACTION_CLOSE: &str = "}}";

/// Names of the templates every page set must provide
pub const REQUIRED_TEMPLATES: [&str; 2] = ["edit", "view"];

/// Failure while loading or parsing templates at startup
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {name}: cannot read {}: {source}", path.display())]
    Io {
        name: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("template {name}: unclosed action at byte {offset}")]
    Unclosed { name: String, offset: usize },
    #[error("template {name}: unknown action {{{{{action}}}}} at byte {offset}")]
    UnknownAction {
        name: String,
        action: String,
        offset: usize,
    },
}

/// Failure while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template {0:?} is not defined")]
    Missing(String),
    #[error("template {name}: {source}")]
    Write {
        name: String,
        source: std::fmt::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Field),
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut offset = 0;

        while let Some(start) = source[offset..].find(ACTION_OPEN) {
            let open = offset + start;
            if open > offset {
                segments.push(Segment::Text(source[offset..open].to_string()));
            }

            let inner_start = open + ACTION_OPEN.len();
            let Some(len) = source[inner_start..].find(ACTION_CLOSE) else {
                return Err(TemplateError::Unclosed {
                    name: name.to_string(),
                    offset: open,
                });
            };
            let action = source[inner_start..inner_start + len].trim();
            let field = parse_action(action).ok_or_else(|| TemplateError::UnknownAction {
                name: name.to_string(),
                action: action.to_string(),
                offset: open,
            })?;
            segments.push(Segment::Field(field));
            offset = inner_start + len + ACTION_CLOSE.len();
        }

        if offset < source.len() {
            segments.push(Segment::Text(source[offset..].to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render `page` into a new string
    pub fn render(&self, page: &Page) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.size_hint() + page.body.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(Field::Title) => {
                    escape_html_into(&mut out, &page.title).map_err(|source| {
                        RenderError::Write {
                            name: self.name.clone(),
                            source,
                        }
                    })?;
                }
                Segment::Field(Field::Body) => {
                    let body = String::from_utf8_lossy(&page.body);
                    escape_html_into(&mut out, &body).map_err(|source| RenderError::Write {
                        name: self.name.clone(),
                        source,
                    })?;
                }
            }
        }
        Ok(out)
    }

    fn size_hint(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(text) => text.len(),
                Segment::Field(_) => 0,
            })
            .sum()
    }
}

fn parse_action(action: &str) -> Option<Field> {
    match action {
        ".Title" => Some(Field::Title),
        ".Body" | "printf \"%s\" .Body" => Some(Field::Body),
        _ => None,
    }
}

/// Escape text for HTML element content and double-quoted attribute values
fn escape_html_into(out: &mut String, text: &str) -> std::fmt::Result {
    Escaper::new(out).write_str(text)
}

/// The named templates pages are rendered with
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, Template>,
}

impl TemplateSet {
    /// Load `edit.html` and `view.html` from `dir`.
    ///
    /// Any failure here must stop the server from starting.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let mut set = Self::default();
        for name in REQUIRED_TEMPLATES {
            let path = dir.join(format!("{name}.html"));
            let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                name: name.to_string(),
                path: path.clone(),
                source,
            })?;
            set.insert(Template::parse(name, &source)?);
        }
        Ok(set)
    }

    /// Build a set from in-memory `(name, source)` pairs
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, TemplateError> {
        let mut set = Self::default();
        for (name, source) in sources {
            set.insert(Template::parse(name, source)?);
        }
        Ok(set)
    }

    fn insert(&mut self, template: Template) {
        self.templates.insert(template.name().to_string(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn render(&self, name: &str, page: &Page) -> Result<String, RenderError> {
        self.get(name)
            .ok_or_else(|| RenderError::Missing(name.to_string()))?
            .render(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render(source: &str, page: &Page) -> String {
        Template::parse("test", source)
            .expect("parse")
            .render(page)
            .expect("render")
    }

    #[test]
    fn test_render_substitutes_fields() {
        let page = Page::new("hello", "Hello World");
        assert_eq!(
            render("<h1>{{.Title}}</h1><div>{{.Body}}</div>", &page),
            "<h1>hello</h1><div>Hello World</div>"
        );
    }

    #[test]
    fn test_render_allows_whitespace_and_printf_body() {
        let page = Page::new("t", "b");
        assert_eq!(render("{{ .Title }}|{{printf \"%s\" .Body}}", &page), "t|b");
    }

    #[test]
    fn test_render_escapes_body() {
        let page = Page::new("x", "<script>alert(1) & \"bye\"</script>");
        let html = render("<div>{{.Body}}</div>", &page);
        assert_eq!(
            html,
            "<div>&lt;script&gt;alert(1) &amp; &quot;bye&quot;&lt;/script&gt;</div>"
        );
    }

    #[test]
    fn test_render_escapes_title() {
        let page = Page::new("a<b>&\"c\"", "");
        assert_eq!(render("{{.Title}}", &page), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_render_escapes_inside_attribute() {
        let page = Page::new("x", "\" onmouseover=\"evil()");
        let html = render("<input value=\"{{.Body}}\">", &page);
        assert!(!html.contains("\" onmouseover"));
        assert!(html.contains("&quot; onmouseover=&quot;evil()"));
    }

    #[test]
    fn test_render_lossy_body_bytes() {
        let page = Page::new("x", vec![b'a', 0xff, b'b']);
        assert_eq!(render("{{.Body}}", &page), "a\u{FFFD}b");
    }

    #[test]
    fn test_render_literal_only_and_empty() {
        let page = Page::empty("x");
        assert_eq!(render("plain }} text", &page), "plain }} text");
        assert_eq!(render("", &page), "");
        assert_eq!(render("[{{.Body}}]", &page), "[]");
    }

    #[test]
    fn test_parse_unclosed_action() {
        let err = Template::parse("edit", "<p>{{.Title</p>").expect_err("unclosed");
        assert!(matches!(err, TemplateError::Unclosed { offset: 3, .. }));
        assert!(err.to_string().contains("edit"));
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = Template::parse("view", "{{.Author}}").expect_err("unknown field");
        match err {
            TemplateError::UnknownAction { action, offset, .. } => {
                assert_eq!(action, ".Author");
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(Template::parse("view", "{{}}").is_err());
    }

    #[test]
    fn test_set_missing_template() {
        let set = TemplateSet::from_sources([("edit", "{{.Title}}")]).expect("parse");
        let err = set.render("view", &Page::empty("x")).expect_err("no view");
        assert!(matches!(err, RenderError::Missing(ref name) if name == "view"));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("edit.html"), "edit {{.Title}}").expect("write");
        std::fs::write(dir.path().join("view.html"), "view {{.Body}}").expect("write");

        let set = TemplateSet::load(dir.path()).expect("load");
        let page = Page::new("a", "b");
        assert_eq!(set.render("edit", &page).expect("edit"), "edit a");
        assert_eq!(set.render("view", &page).expect("view"), "view b");
    }

    #[test]
    fn test_load_fails_when_template_missing() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("edit.html"), "edit").expect("write");

        let err = TemplateSet::load(dir.path()).expect_err("view.html missing");
        assert!(matches!(err, TemplateError::Io { ref name, .. } if name == "view"));
    }

    #[test]
    fn test_load_fails_on_broken_template() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("edit.html"), "{{.Title}}").expect("write");
        std::fs::write(dir.path().join("view.html"), "{{.Nope}}").expect("write");

        assert!(matches!(
            TemplateSet::load(dir.path()),
            Err(TemplateError::UnknownAction { .. })
        ));
    }

    #[test]
    fn test_shipped_templates_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let set = TemplateSet::load(dir).expect("shipped templates");
        let html = set
            .render("edit", &Page::new("hello", "Hello World"))
            .expect("render");
        assert!(html.contains("Hello World"));
        assert!(html.contains("/save/hello"));
    }
}
