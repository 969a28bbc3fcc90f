mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Fixture, INDEX_BODY, exchange, split_response};
use minihttpd::config::Config;
use minihttpd::http::connection;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn quick(config: Config) -> Config {
    Config {
        read_timeout: Duration::from_millis(100),
        ..config
    }
}

#[tokio::test]
async fn test_get_existing_file() {
    let fx = Fixture::new("conn-get");

    let raw = exchange(fx.config(), b"GET /index.html HTTP/1.0\r\n\r\n", false).await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(head, "HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
    assert_eq!(body, INDEX_BODY);
}

#[tokio::test]
async fn test_get_missing_file() {
    let fx = Fixture::new("conn-missing");

    let raw = exchange(fx.config(), b"GET /nope.html HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_head_existing_file() {
    let fx = Fixture::new("conn-head");

    let raw = exchange(fx.config(), b"HEAD /index.html HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
}

#[tokio::test]
async fn test_head_missing_file() {
    let fx = Fixture::new("conn-head-missing");

    let raw = exchange(fx.config(), b"HEAD /nope.html HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_post_and_delete_not_implemented() {
    let fx = Fixture::new("conn-501");

    for req in [
        &b"POST /index.html HTTP/1.0\r\n\r\n"[..],
        &b"POST /nope.html HTTP/1.0\r\n\r\n"[..],
        &b"DELETE /index.html HTTP/1.0\r\n\r\n"[..],
    ] {
        let raw = exchange(fx.config(), req, false).await;
        assert_eq!(raw, b"HTTP/1.0 501 Not Implemented\r\n\r\n");
    }
}

#[tokio::test]
async fn test_unknown_method_is_bad_request() {
    let fx = Fixture::new("conn-unknown");

    let raw = exchange(fx.config(), b"PUT /index.html HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 400 Bad Request\r\n\r\n");
}

#[tokio::test]
async fn test_too_few_tokens_is_bad_request() {
    let fx = Fixture::new("conn-tokens");

    for req in [&b"GET\r\n\r\n"[..], &b"\r\n\r\n"[..]] {
        let raw = exchange(fx.config(), req, false).await;
        assert_eq!(raw, b"HTTP/1.0 400 Bad Request\r\n\r\n");
    }
}

#[tokio::test]
async fn test_no_line_break_within_limit_is_bad_request() {
    let fx = Fixture::new("conn-limit");
    let cfg = Config {
        max_request_bytes: 32,
        ..fx.config()
    };

    let raw = exchange(cfg, &[b'A'; 64], false).await;

    assert_eq!(raw, b"HTTP/1.0 400 Bad Request\r\n\r\n");
}

#[tokio::test]
async fn test_oversized_header_block_still_served() {
    let fx = Fixture::new("conn-big-headers");
    let cfg = Config {
        max_request_bytes: 64,
        ..fx.config()
    };

    let mut req = b"HEAD /index.html HTTP/1.0\r\n".to_vec();
    req.extend_from_slice(b"X-Padding: ");
    req.extend_from_slice(&[b'p'; 128]);
    req.extend_from_slice(b"\r\n\r\n");

    let raw = exchange(cfg, &req, false).await;

    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
}

#[tokio::test]
async fn test_client_closes_before_blank_line() {
    let fx = Fixture::new("conn-eof");

    let raw = exchange(fx.config(), b"GET /index.html HTTP/1.0\r\nHost: x\r\n", true).await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body, INDEX_BODY);
}

#[tokio::test]
async fn test_client_closes_mid_line() {
    let fx = Fixture::new("conn-eof-partial");

    let raw = exchange(fx.config(), b"GET /index.ht", true).await;

    assert_eq!(raw, b"HTTP/1.0 400 Bad Request\r\n\r\n");
}

#[tokio::test]
async fn test_idle_client_with_request_line_is_served() {
    let fx = Fixture::new("conn-idle");

    let raw = exchange(quick(fx.config()), b"HEAD /index.html HTTP/1.0\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
}

#[tokio::test]
async fn test_idle_client_without_line_break_is_bad_request() {
    let fx = Fixture::new("conn-idle-partial");

    let raw = exchange(quick(fx.config()), b"GET /index.html", false).await;

    assert_eq!(raw, b"HTTP/1.0 400 Bad Request\r\n\r\n");
}

#[tokio::test]
async fn test_simple_request_answered_without_waiting() {
    let fx = Fixture::new("conn-simple");

    let raw = tokio::time::timeout(
        Duration::from_secs(2),
        exchange(fx.config(), b"GET /index.html\r\n", false),
    )
    .await
    .expect("simple request should not wait for headers");

    let (_, body) = split_response(&raw);
    assert_eq!(body, INDEX_BODY);
}

#[tokio::test]
async fn test_extra_tokens_are_ignored() {
    let fx = Fixture::new("conn-extra");

    let raw = exchange(fx.config(), b"HEAD /index.html HTTP/1.0 ?q=1\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
}

#[tokio::test]
async fn test_absolute_uri() {
    let fx = Fixture::new("conn-absolute");

    let raw = exchange(
        fx.config(),
        b"HEAD http://localhost/index.html HTTP/1.0\r\n\r\n",
        false,
    )
    .await;

    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
}

#[tokio::test]
async fn test_path_traversal_fails_closed() {
    let fx = Fixture::new("conn-traversal");

    let raw = exchange(fx.config(), b"GET /../../etc/passwd HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_directory_is_not_found() {
    let fx = Fixture::new("conn-dir");

    let raw = exchange(fx.config(), b"GET / HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_oversized_file_refused() {
    let fx = Fixture::new("conn-oversized");
    let cfg = Config {
        max_response_bytes: 4,
        ..fx.config()
    };

    let raw = exchange(cfg.clone(), b"GET /index.html HTTP/1.0\r\n\r\n", false).await;
    assert_eq!(raw, b"HTTP/1.0 500 Internal Server Error\r\n\r\n");

    // HEAD sends no body, so the limit does not apply
    let raw = exchange(cfg, b"HEAD /index.html HTTP/1.0\r\n\r\n", false).await;
    assert_eq!(raw, b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\n");
}

#[tokio::test]
async fn test_binary_body_is_sent_verbatim() {
    let fx = Fixture::new("conn-binary");
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    fx.write("blob.bin", &data);

    let raw = exchange(fx.config(), b"GET /blob.bin HTTP/1.0\r\n\r\n", false).await;
    let (head, body) = split_response(&raw);

    assert_eq!(head, "HTTP/1.0 200 OK\r\nContent-Length: 10000\r\n\r\n");
    assert_eq!(body, data);
}

#[tokio::test]
async fn test_overlong_name_is_not_found() {
    let fx = Fixture::new("conn-long-name");

    let req = format!("GET /{} HTTP/1.0\r\n\r\n", "a".repeat(300));
    let raw = exchange(fx.config(), req.as_bytes(), false).await;

    assert_eq!(raw, b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_overlong_path_is_not_found() {
    let fx = Fixture::new("conn-long-path");

    // Each segment is a legal name; together they exceed the path limit
    let segment = "b".repeat(250);
    let path = vec![segment.as_str(); 20].join("/");
    let req = format!("GET /{path} HTTP/1.0\r\n\r\n");
    let raw = exchange(fx.config(), req.as_bytes(), false).await;

    assert_eq!(raw, b"HTTP/1.0 404 Not Found\r\n\r\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolution_failure_is_internal_error() {
    let fx = Fixture::new("conn-symlink-loop");
    std::os::unix::fs::symlink("loop.html", fx.root.join("loop.html")).unwrap();

    // exchange waits for the handler task to finish
    let raw = exchange(fx.config(), b"GET /loop.html HTTP/1.0\r\n\r\n", false).await;

    assert_eq!(raw, b"HTTP/1.0 500 Internal Server Error\r\n\r\n");
}

#[tokio::test]
async fn test_slow_reader_gets_whole_body() {
    let fx = Fixture::new("conn-slow-reader");
    let data: Vec<u8> = (0..64 * 1024u32).map(|i| (i % 253) as u8).collect();
    fx.write("slow.bin", &data);

    // The whole transfer takes several times the write timeout
    let cfg = Config {
        write_timeout: Duration::from_millis(200),
        ..fx.config()
    };

    let (mut client, server) = tokio::io::duplex(4096);
    let handler = tokio::spawn(connection::handle(server, Arc::new(cfg)));
    client.write_all(b"GET /slow.bin HTTP/1.0\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = client.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    handler.await.unwrap();

    let (head, body) = split_response(&raw);
    assert_eq!(head, "HTTP/1.0 200 OK\r\nContent-Length: 65536\r\n\r\n");
    assert_eq!(body, data);
}
