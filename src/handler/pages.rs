//! Page actions
//!
//! Each handler is a transition on whether the titled page currently
//! exists in storage.

use super::dispatch::PageHandler;
use super::request::PageRequest;
use crate::config::Wiki;
use crate::http;
use crate::logger;
use crate::render::{render_page, Target};
use crate::routing::Action;
use crate::storage::Page;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Form field carrying the page body on save
pub const BODY_FIELD: &str = "body";

/// Show a page, or send the client to edit it when it cannot be loaded
pub struct ViewPage;

impl PageHandler for ViewPage {
    async fn handle(&self, wiki: &Wiki, _req: &PageRequest, title: &str) -> Response<Full<Bytes>> {
        match wiki.store.load(title).await {
            Ok(page) => render_page(&wiki.templates, Target::View, &page),
            Err(e) => {
                logger::log_page_load_failed(title, &e);
                http::build_redirect_response(&Action::Edit.path_for(title))
            }
        }
    }
}

/// Edit a page; an unreadable page opens as a new, empty one
pub struct EditPage;

impl PageHandler for EditPage {
    async fn handle(&self, wiki: &Wiki, _req: &PageRequest, title: &str) -> Response<Full<Bytes>> {
        let page = match wiki.store.load(title).await {
            Ok(page) => page,
            Err(e) => {
                logger::log_page_load_failed(title, &e);
                Page::empty(title)
            }
        };
        render_page(&wiki.templates, Target::Edit, &page)
    }
}

/// Store the submitted body and redirect to the page view
pub struct SavePage;

impl PageHandler for SavePage {
    async fn handle(&self, wiki: &Wiki, req: &PageRequest, title: &str) -> Response<Full<Bytes>> {
        let page = Page::new(title, req.form_value(BODY_FIELD).await);
        match wiki.store.save(&page).await {
            Ok(()) => {
                logger::log_page_saved(title, page.body.len());
                http::build_redirect_response(&Action::View.path_for(title))
            }
            Err(e) => {
                logger::log_page_save_failed(title, &e);
                http::build_500_response(&e.to_string())
            }
        }
    }
}
