//! Logger module
//!
//! Provides logging utilities for the wiki server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Page storage and rendering failures
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::render::TemplateError;
use crate::routing::Action;
use crate::storage::StoreError;
use std::fmt::Display;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.level.eq_ignore_ascii_case("debug"),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write a debug line; dropped unless the configured level is `debug`
fn write_debug(message: &str) {
    if writer::get().is_some_and(writer::LogWriter::debug_enabled) {
        write_info(message);
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Wiki server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Page directory: {}", config.storage.data_dir));
    write_info(&format!("Template directory: {}", config.templates.dir));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_templates_loaded(dir: &str) {
    write_info(&format!("[Templates] Loaded edit and view templates from {dir}"));
}

pub fn log_template_error(err: &TemplateError) {
    write_error(&format!("[FATAL] {err}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_rejected_path(path: &str) {
    log_warning(&format!("Rejected request path: {path:?}"));
}

pub fn log_dispatch(action: Action, title: &str) {
    write_debug(&format!("[Route] {action:?} '{title}'"));
}

pub fn log_page_load_failed(title: &str, err: &StoreError) {
    write_debug(&format!("[Page] Cannot load '{title}': {err}"));
}

pub fn log_page_saved(title: &str, bytes: usize) {
    write_debug(&format!("[Page] Saved '{title}' ({bytes} bytes)"));
}

pub fn log_page_save_failed(title: &str, err: &StoreError) {
    log_error(&format!("Failed to save page '{title}': {err}"));
}

pub fn log_render_failed(title: &str, err: &impl Display) {
    log_error(&format!("Failed to render page '{title}': {err}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n[Signal] {signal} received, shutting down"));
}

pub fn log_shutdown_complete() {
    write_info("[Shutdown] Listener closed; no longer accepting connections");
}

pub fn log_connections_drained(open: usize) {
    write_info(&format!("[Shutdown] {open} open connection(s) finished"));
}

pub fn log_drain_timeout(remaining: usize, grace: Duration) {
    log_warning(&format!(
        "Shutdown timeout after {} seconds; dropping {remaining} connection(s)",
        grace.as_secs()
    ));
}
