use std::path::Path;
use std::time::Duration;

use filegate::http::connection::{Connection, ConnectionOptions};
use filegate::http::response::{NOT_FOUND_BODY, StatusCode};
use filegate::http::writer::Delivery;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn options(root: &Path) -> ConnectionOptions {
    ConnectionOptions {
        root: root.to_path_buf(),
        read_timeout: Some(Duration::from_secs(5)),
        write_timeout: Some(Duration::from_secs(5)),
    }
}

enum Client {
    Sends(&'static [u8]),
    ClosesImmediately,
    StaysSilent,
}

/// Runs one connection against an in-memory client and returns what the client saw.
async fn exchange(options: ConnectionOptions, behavior: Client) -> (Vec<u8>, Delivery) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(Connection::new(server, options).run());

    match behavior {
        Client::Sends(bytes) => client.write_all(bytes).await.unwrap(),
        Client::ClosesImmediately => client.shutdown().await.unwrap(),
        Client::StaysSilent => {}
    }

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    let delivery = handle.await.unwrap().unwrap();
    (response, delivery)
}

async fn request(root: &Path, bytes: &'static [u8]) -> (Vec<u8>, Delivery) {
    exchange(options(root), Client::Sends(bytes)).await
}

#[tokio::test]
async fn test_serves_existing_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let contents = vec![b'x'; 50];
    std::fs::write(dir.path().join("file1.html"), &contents).unwrap();

    let (response, delivery) =
        request(dir.path(), b"GET /file1.html HTTP/1.1\r\nHost: x\r\n\r\n").await;

    let mut expected =
        b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\nContent-Length: 50\r\n\r\n".to_vec();
    expected.extend_from_slice(&contents);
    assert_eq!(response, expected);
    assert_eq!(delivery.status, StatusCode::Ok);
    assert_eq!(delivery.body_bytes, 50);
}

#[tokio::test]
async fn test_serves_jpeg_with_image_type() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("image9.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();

    let (response, _) = request(dir.path(), b"GET /image9.jpg HTTP/1.0\r\n\r\n").await;

    let mut expected =
        b"HTTP/1.0 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: 4\r\n\r\n".to_vec();
    expected.extend_from_slice(&[0xff, 0xd8, 0xff, 0xe0]);
    assert_eq!(response, expected);
}

#[tokio::test]
async fn test_generic_name_is_served_without_content_type() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    let (response, _) = request(dir.path(), b"GET /notes.txt HTTP/1.1\r\n\r\n").await;

    assert_eq!(response, b"HTTP/1.0 200 OK\r\nContent-Length: 5\r\n\r\nhello".to_vec());
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let (response, delivery) = request(dir.path(), b"GET /missing.jpg HTTP/1.0\r\n\r\n").await;

    let mut expected = b"HTTP/1.0 404 Not Found\r\nContent-Type: text/html\r\n\r\n".to_vec();
    expected.extend_from_slice(NOT_FOUND_BODY);
    assert_eq!(response, expected);
    assert_eq!(delivery.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_missing_terminator_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file1.html"), b"<html></html>").unwrap();

    let (response, delivery) = request(dir.path(), b"GET /file1.html HTTP/1.1").await;

    assert_eq!(response, b"HTTP/1.0 400 Bad Request\r\n\r\n".to_vec());
    assert_eq!(delivery.status, StatusCode::BadRequest);
}

#[tokio::test]
async fn test_post_is_bad_request_and_only_one_response() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file1.html"), b"<html></html>").unwrap();

    let (response, _) = request(dir.path(), b"POST /file1.html HTTP/1.1\r\n\r\n").await;

    // Exactly the 400, nothing from the 200 or 404 paths after it.
    assert_eq!(response, b"HTTP/1.0 400 Bad Request\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_client_closing_immediately_gets_bad_request() {
    let dir = tempfile::tempdir().unwrap();

    let (response, delivery) = exchange(options(dir.path()), Client::ClosesImmediately).await;

    assert_eq!(response, b"HTTP/1.0 400 Bad Request\r\n\r\n".to_vec());
    assert_eq!(delivery.status, StatusCode::BadRequest);
}

#[tokio::test]
async fn test_silent_client_times_out_with_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path());
    opts.read_timeout = Some(Duration::from_millis(50));

    let (response, _) = exchange(opts, Client::StaysSilent).await;

    assert_eq!(response, b"HTTP/1.0 400 Bad Request\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_body_after_headers_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file2.html"), b"ok").unwrap();

    let (response, _) = request(
        dir.path(),
        b"GET /file2.html HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc",
    )
    .await;

    assert_eq!(
        response,
        b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\nContent-Length: 2\r\n\r\nok".to_vec()
    );
}

#[tokio::test]
async fn test_client_gone_before_response_does_not_fail_handler() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("image1.jpg"), vec![0u8; 256 * 1024]).unwrap();

    let (mut client, server) = tokio::io::duplex(1024);
    let handle = tokio::spawn(Connection::new(server, options(dir.path())).run());

    client.write_all(b"GET /image1.jpg HTTP/1.1\r\n\r\n").await.unwrap();
    let mut first = [0u8; 16];
    client.read_exact(&mut first).await.unwrap();
    drop(client);

    // The transfer is cut short, but that is reported rather than raised.
    let delivery = handle.await.unwrap().unwrap();
    assert!(!delivery.is_complete());
    assert!(delivery.body_bytes < 256 * 1024);
}
