//! Integration tests for the html-to-dokuwiki CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_html-to-dokuwiki"))
}

#[test]
fn test_basic_stdin() {
    cli()
        .write_stdin("<h1>Title</h1><p>Content</p>")
        .assert()
        .success()
        .stdout("====== Title ======\n\nContent\n");
}

#[test]
fn test_file_input() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("input.html");
    fs::write(&input_path, "<p><b>Test</b> content</p>").unwrap();

    cli()
        .arg(input_path.to_str().unwrap())
        .assert()
        .success()
        .stdout("**Test** content\n");
}

#[test]
fn test_file_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("output.txt");

    cli()
        .arg("-o")
        .arg(output_path.to_str().unwrap())
        .write_stdin("<p>Output test</p>")
        .assert()
        .success();

    let output = fs::read_to_string(&output_path).unwrap();
    assert_eq!(output, "Output test\n");
}

#[test]
fn test_dash_reads_stdin() {
    cli()
        .arg("-")
        .write_stdin("<ul><li>a</li><li>b<ul><li>c</li></ul></li></ul>")
        .assert()
        .success()
        .stdout("* a\n  * b\n    * c\n");
}

#[test]
fn test_missing_input_file_fails() {
    cli()
        .arg("/nonexistent/input.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_image_without_endpoint_degrades_to_comment() {
    cli()
        .write_stdin(r#"<p>x</p><img src="data:image/png;base64,aGVsbG8=">"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("<!-- image upload failed"))
        .stdout(predicate::str::contains("no upload endpoint configured"));
}

#[test]
fn test_upload_round_trip() {
    let (url, handle, req_rx) = serve_upload_once();

    cli()
        .arg("--upload-url")
        .arg(&url)
        .write_stdin(r#"<p>doc</p><img src="data:image/png;base64,aGVsbG8=" alt="pic">"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("{{pasted_image_"))
        .stdout(predicate::str::contains("|pic}}"));

    let request = req_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.contains("POST"));
    assert!(request.contains("name=\"call\""), "missing call field: {request}");
    assert!(request.contains("mediaupload"));
    assert!(request.contains("name=\"ow\""), "missing ow field: {request}");
    assert!(request.contains("name=\"qqfile\""), "missing file part: {request}");
    assert!(request.contains("filename=\"pasted_image_"), "missing file name: {request}");

    handle.join().unwrap();
}

#[test]
fn test_upload_rejection_degrades_to_comment() {
    let (url, handle) = serve_rejection_once();

    cli()
        .arg("--upload-url")
        .arg(&url)
        .write_stdin(r#"<img src="data:image/png;base64,aGVsbG8=">"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("<!-- image upload failed"))
        .stdout(predicate::str::contains("ACL denied"));

    handle.join().unwrap();
}

/// One-shot HTTP server that captures the raw upload request and answers
/// with a success JSON body.
fn serve_upload_once() -> (String, thread::JoinHandle<()>, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    let (url, handle) = serve_once_with(r#"{"success":true,"error":null}"#, tx);
    (url, handle, rx)
}

fn serve_rejection_once() -> (String, thread::JoinHandle<()>) {
    let (tx, _rx) = mpsc::channel();
    // Channel receiver is dropped; the server ignores the send failure.
    serve_once_with(r#"{"error":"ACL denied"}"#, tx)
}

fn serve_once_with(body: &'static str, tx: mpsc::Sender<String>) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_full_request(&mut stream);
        let _ = tx.send(request);

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
    });

    (format!("http://{addr}"), handle)
}

fn read_full_request(stream: &mut std::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut header_end = None;
    let mut content_length = None;

    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if header_end.is_none() {
            if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
                header_end = Some(pos + 4);
                let headers = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok());
            }
        }

        if let Some(end) = header_end {
            match content_length {
                Some(len) if buf.len() >= end + len => break,
                // Chunked transfer ends with a zero-size chunk.
                None if buf.ends_with(b"0\r\n\r\n") => break,
                _ => {}
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
