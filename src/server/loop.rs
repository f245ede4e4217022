// Server loop module
// Accepts connections until shutdown is requested

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop for the wiki listener.
///
/// Must run inside a `LocalSet`: connections are served with `spawn_local`.
/// Once `shutdown` is notified the listener is closed and every open
/// connection is asked to finish its current request. Returns when they have
/// all closed, or after `performance.shutdown_timeout` seconds.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown_complete();

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    let open = active_connections.load(Ordering::SeqCst);
    if tokio::time::timeout(grace, graceful.shutdown()).await.is_ok() {
        logger::log_connections_drained(open);
    } else {
        logger::log_drain_timeout(active_connections.load(Ordering::SeqCst), grace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::TemplateSet;
    use crate::server::create_reusable_listener;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request.as_bytes()).await.expect("write");
        read_response(&mut stream).await
    }

    async fn read_response(stream: &mut TcpStream) -> String {
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.expect("read");
        String::from_utf8_lossy(&response).into_owned()
    }

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::load_from("definitely-not-a-config-file").expect("defaults");
        config.storage.data_dir = dir.path().to_string_lossy().into_owned();
        config.logging.access_log = false;
        config
    }

    fn test_state(config: Config) -> Arc<AppState> {
        let templates =
            TemplateSet::from_sources([("edit", "E:{{.Body}}"), ("view", "V:{{.Body}}")])
                .expect("parse");
        Arc::new(AppState::new(config, templates).expect("state"))
    }

    #[tokio::test]
    async fn test_serves_pages_over_tcp_until_shutdown() {
        let dir = TempDir::new().expect("temp dir");
        let state = test_state(test_config(&dir));

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::new(AtomicUsize::new(0)),
                    Arc::clone(&shutdown),
                ));

                let body = "body=over+tcp";
                let saved = raw_request(
                    addr,
                    &format!(
                        "POST /save/Tcp HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
                         Content-Type: application/x-www-form-urlencoded\r\n\
                         Content-Length: {}\r\n\r\n{body}",
                        body.len()
                    ),
                )
                .await;
                assert!(saved.starts_with("HTTP/1.1 302"), "{saved}");
                assert!(saved.contains("location: /view/Tcp"), "{saved}");

                let viewed = raw_request(
                    addr,
                    "GET /view/Tcp HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                )
                .await;
                assert!(viewed.starts_with("HTTP/1.1 200"), "{viewed}");
                assert!(viewed.ends_with("V:over tcp"), "{viewed}");

                shutdown.notify_one();
                server.await.expect("server loop exits");
            })
            .await;

        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_lets_in_flight_save_finish() {
        let dir = TempDir::new().expect("temp dir");
        let state = test_state(test_config(&dir));

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::new(AtomicUsize::new(0)),
                    Arc::clone(&shutdown),
                ));

                let body = "body=in+flight";
                let mut stream = TcpStream::connect(addr).await.expect("connect");
                let head = format!(
                    "POST /save/Slow HTTP/1.1\r\nHost: localhost\r\n\
                     Content-Type: application/x-www-form-urlencoded\r\n\
                     Content-Length: {}\r\n\r\n{}",
                    body.len(),
                    &body[..7]
                );
                stream.write_all(head.as_bytes()).await.expect("write head");
                tokio::time::sleep(Duration::from_millis(200)).await;

                shutdown.notify_one();
                tokio::time::sleep(Duration::from_millis(100)).await;

                stream
                    .write_all(body[7..].as_bytes())
                    .await
                    .expect("write rest");
                let saved = read_response(&mut stream).await;
                assert!(saved.starts_with("HTTP/1.1 302"), "{saved}");

                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .expect("drained before the shutdown timeout")
                    .expect("server loop exits");
            })
            .await;

        assert_eq!(
            std::fs::read(dir.path().join("Slow.txt")).expect("page file"),
            b"in flight"
        );
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_keep_alive_connection() {
        let dir = TempDir::new().expect("temp dir");
        let state = test_state(test_config(&dir));

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(Notify::new());

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::new(AtomicUsize::new(0)),
                    Arc::clone(&shutdown),
                ));

                let mut idle = TcpStream::connect(addr).await.expect("connect");
                tokio::time::sleep(Duration::from_millis(100)).await;
                shutdown.notify_one();

                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .expect("idle connection does not hold shutdown")
                    .expect("server loop exits");
                assert_eq!(read_response(&mut idle).await, "");
            })
            .await;
    }

    #[tokio::test]
    async fn test_connection_lifetime_is_bounded() {
        let dir = TempDir::new().expect("temp dir");
        let mut config = test_config(&dir);
        config.performance.read_timeout = 1;
        config.performance.write_timeout = 1;
        let state = test_state(config);

        let listener =
            create_reusable_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(Notify::new());
        let active = Arc::new(AtomicUsize::new(0));

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = tokio::task::spawn_local(start_server_loop(
                    listener,
                    state,
                    Arc::clone(&active),
                    Arc::clone(&shutdown),
                ));

                let mut silent = TcpStream::connect(addr).await.expect("connect");
                let closed = tokio::time::timeout(Duration::from_secs(5), read_response(&mut silent))
                    .await
                    .expect("connection closed by the server");
                assert_eq!(closed, "");
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(active.load(Ordering::SeqCst), 0);

                shutdown.notify_one();
                server.await.expect("server loop exits");
            })
            .await;
    }
}
