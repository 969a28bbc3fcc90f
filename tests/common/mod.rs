#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use minihttpd::config::Config;
use minihttpd::http::connection;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const INDEX_BODY: &[u8] = b"hello world\n";

/// A throwaway resource root holding `index.html` (12 bytes).
pub struct Fixture {
    pub root: PathBuf,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("minihttpd-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("index.html"), INDEX_BODY).unwrap();
        Self { root }
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn config(&self) -> Config {
        Config {
            root_dir: self.root.clone(),
            ..Config::default()
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Runs one exchange through the connection handler over an in-memory pipe.
///
/// With `half_close` the client signals end-of-request after writing.
pub async fn exchange(config: Config, request: &[u8], half_close: bool) -> Vec<u8> {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let handler = tokio::spawn(connection::handle(server, Arc::new(config)));

    client.write_all(request).await.unwrap();
    if half_close {
        client.shutdown().await.unwrap();
    }

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    handler.await.unwrap();

    response
}

/// Splits a raw response at the end of its head.
pub fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    let end = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response head not terminated")
        + 4;

    (String::from_utf8(raw[..end].to_vec()).unwrap(), raw[end..].to_vec())
}
