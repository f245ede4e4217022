//! Page rendering
//!
//! Binds a page into one of the named templates and builds the response.
//! Output is rendered into a buffer first, so a failing template never
//! produces a partial page.

mod template;

pub use template::{TemplateError, TemplateSet};

use crate::http;
use crate::logger;
use crate::storage::Page;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Template a page is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Edit,
    View,
}

impl Target {
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::View => "view",
        }
    }
}

/// Render `page` with the `target` template, or a 500 carrying the error text
pub fn render_page(templates: &TemplateSet, target: Target, page: &Page) -> Response<Full<Bytes>> {
    match templates.render(target.template_name(), page) {
        Ok(html) => http::response::build_html_response(html),
        Err(e) => {
            logger::log_render_failed(&page.title, &e);
            http::build_500_response(&e.to_string())
        }
    }
}
