//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body on every path, with a configurable status
//! code and a request counter so tests can assert that a resolution touched
//! (or did not touch) the network.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub struct TestServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name)
    }
}

/// Starts a server in a background thread serving `body` with status 200.
/// The server runs until the process exits.
pub fn start(body: Vec<u8>) -> TestServer {
    start_with_status(body, 200)
}

/// Like `start` but responds with the given status code (body included
/// regardless, so tests can check that error statuses win over content).
pub fn start_with_status(body: Vec<u8>, status: u16) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &body, status, &hits));
        }
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn handle(mut stream: TcpStream, body: &[u8], status: u16, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    // read until the end of the request headers
    let mut used = 0;
    loop {
        let n = match stream.read(&mut buf[used..]) {
            Ok(0) => return,
            Ok(n) => n,
            Err(_) => return,
        };
        used += n;
        if buf[..used].windows(4).any(|w| w == b"\r\n\r\n") || used == buf.len() {
            break;
        }
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
