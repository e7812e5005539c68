//! Minimal HTTP server that hands out a fixed page archive.
//!
//! Connections that close without sending a request (reachability probes)
//! are not counted as requests.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::io::{Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use zip::write::SimpleFileOptions;

/// Background server answering every request with the same response.
pub struct ArchiveServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl ArchiveServer {
    /// Serves `body` with status 200.
    pub fn start(body: Vec<u8>) -> Self {
        Self::with_status(200, body)
    }

    /// Serves `body` with the given status.
    pub fn with_status(status: u16, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                if read_request(&stream) {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let _ = respond(stream, status, &body);
                }
            }
        });

        Self { addr, requests }
    }

    /// URL of the archive.
    pub fn url(&self) -> String {
        format!("http://{}/tldr.zip", self.addr)
    }

    /// Number of HTTP requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Reads the request head. Returns false if the peer closed without one.
fn read_request(mut stream: &TcpStream) -> bool {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return !head.is_empty(),
            Ok(n) => {
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    return true;
                }
            }
        }
    }
}

fn respond(mut stream: TcpStream, status: u16, body: &[u8]) -> std::io::Result<()> {
    let reason = if status == 200 { "OK" } else { "Error" };
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    )?;
    stream.write_all(body)?;
    stream.flush()
}

/// Builds a page archive: `pages/index.json` plus one file per `(platform, page, markdown)`.
pub fn pages_zip(pages: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o644);

    writer.add_directory("pages/", options).unwrap();
    writer.start_file("pages/index.json", options).unwrap();
    writer.write_all(b"{\"commands\":[]}").unwrap();

    for (platform, page, markdown) in pages {
        writer
            .start_file(format!("pages/{}/{}.md", platform, page), options)
            .unwrap();
        writer.write_all(markdown.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// A small archive covering three platforms.
pub fn sample_archive() -> Vec<u8> {
    pages_zip(&[
        ("common", "tar", TAR_PAGE),
        ("common", "git-pull", "# git pull\n\n> Fetch and merge.\n"),
        ("linux", "apt", "# apt\n\n> Package manager.\n"),
        ("osx", "brew", "# brew\n\n> Package manager.\n"),
    ])
}

/// Markup of the sample `tar` page.
pub const TAR_PAGE: &str = "# tar\n\n> Archiving utility.\n\n- Create an archive from files:\n\n`tar cf {{target.tar}} {{file1}}`\n";
