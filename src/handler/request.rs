//! Buffered page request
//!
//! The router reads the whole body before dispatching, so handlers see a
//! plain value instead of a streaming body.

use crate::logger;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Method, Uri};
use std::convert::Infallible;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const FORM_MULTIPART: &str = "multipart/form-data";

/// Request data the page handlers read from
#[derive(Debug, Clone)]
pub struct PageRequest {
    method: Method,
    path: String,
    query: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

impl PageRequest {
    pub fn new(method: Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(ToString::to_string),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
            body,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of the form field `key`, or empty when absent.
    ///
    /// A urlencoded or multipart POST/PUT/PATCH body is searched before the
    /// query string. File parts of a multipart body are not form values.
    pub async fn form_value(&self, key: &str) -> Vec<u8> {
        self.body_form_value(key)
            .await
            .or_else(|| {
                self.query
                    .as_deref()
                    .and_then(|q| find_form_value(q.as_bytes(), key))
            })
            .unwrap_or_default()
    }

    async fn body_form_value(&self, key: &str) -> Option<Vec<u8>> {
        if !matches!(self.method, Method::POST | Method::PUT | Method::PATCH) {
            return None;
        }
        let content_type = self.content_type.as_deref()?;
        let media_type = content_type.split(';').next()?.trim();
        if media_type.eq_ignore_ascii_case(FORM_URLENCODED) {
            find_form_value(&self.body, key)
        } else if media_type.eq_ignore_ascii_case(FORM_MULTIPART) {
            match find_multipart_value(content_type, self.body.clone(), key).await {
                Ok(value) => value,
                Err(e) => {
                    logger::log_warning(&format!("Malformed multipart form for {}: {e}", self.path));
                    None
                }
            }
        } else {
            None
        }
    }
}

/// Scan a `multipart/form-data` payload for the first non-file part named `key`
async fn find_multipart_value(
    content_type: &str,
    body: Bytes,
    key: &str,
) -> Result<Option<Vec<u8>>, multer::Error> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures::stream::once(std::future::ready(Ok::<_, Infallible>(body)));
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(key) && field.file_name().is_none() {
            return Ok(Some(field.bytes().await?.to_vec()));
        }
    }
    Ok(None)
}

/// Scan an `application/x-www-form-urlencoded` payload for `key`
fn find_form_value(raw: &[u8], key: &str) -> Option<Vec<u8>> {
    raw.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (name, value) = match pair.iter().position(|&b| b == b'=') {
                Some(idx) => (&pair[..idx], &pair[idx + 1..]),
                None => (pair, &[][..]),
            };
            (decode_component(name) == key.as_bytes()).then(|| decode_component(value))
        })
}

/// Percent-decode one form component, treating `+` as a space
fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();
    urlencoding::decode_binary(&spaced).into_owned()
}
