//! Path validation in front of the page handlers
//!
//! Page handlers only ever receive a title that already matched the
//! allow-list. They do not validate again.

use super::pages::{EditPage, SavePage, ViewPage};
use super::request::PageRequest;
use crate::config::Wiki;
use crate::http;
use crate::logger;
use crate::routing::{Action, RoutePattern};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;

/// An action invoked with a pre-validated page title
#[allow(async_fn_in_trait)]
pub trait PageHandler {
    async fn handle(&self, wiki: &Wiki, req: &PageRequest, title: &str) -> Response<Full<Bytes>>;
}

/// A page handler guarded by the route pattern
pub struct Validated<H> {
    pattern: Arc<RoutePattern>,
    handler: H,
}

/// Wrap `handler` so it only runs for paths the pattern accepts
pub const fn make_handler<H: PageHandler>(pattern: Arc<RoutePattern>, handler: H) -> Validated<H> {
    Validated { pattern, handler }
}

impl<H: PageHandler> Validated<H> {
    /// Validate the request path, answering 404 without touching storage on mismatch
    pub async fn serve(&self, wiki: &Wiki, req: &PageRequest) -> Response<Full<Bytes>> {
        let Some(valid) = self.pattern.validate(req.path()) else {
            logger::log_rejected_path(req.path());
            return http::build_404_response();
        };
        logger::log_dispatch(valid.action, valid.title);
        self.handler.handle(wiki, req, valid.title).await
    }
}

/// The three page routes, selected by path prefix
pub struct PageRoutes {
    view: Validated<ViewPage>,
    edit: Validated<EditPage>,
    save: Validated<SavePage>,
}

impl PageRoutes {
    pub fn new(pattern: Arc<RoutePattern>) -> Self {
        Self {
            view: make_handler(Arc::clone(&pattern), ViewPage),
            edit: make_handler(Arc::clone(&pattern), EditPage),
            save: make_handler(pattern, SavePage),
        }
    }

    /// Dispatch on path prefix; unknown prefixes are 404
    pub async fn route(&self, wiki: &Wiki, req: &PageRequest) -> Response<Full<Bytes>> {
        let path = req.path();
        if path.starts_with(Action::View.prefix()) {
            self.view.serve(wiki, req).await
        } else if path.starts_with(Action::Edit.prefix()) {
            self.edit.serve(wiki, req).await
        } else if path.starts_with(Action::Save.prefix()) {
            self.save.serve(wiki, req).await
        } else {
            logger::log_rejected_path(path);
            http::build_404_response()
        }
    }
}
