use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use reqwest::Client;
use services::{FeedLoadError, FeedSource, HttpFeedSource};

fn source() -> HttpFeedSource {
    let client = Client::builder().no_proxy().build().unwrap();
    HttpFeedSource::with_client(client)
}

/// Serves exactly one canned HTTP response on a loopback port.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: text/tab-separated-values; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    format!("http://{addr}/pub?output=tsv")
}

#[tokio::test]
async fn http_source_returns_body_on_success() {
    let url = serve_once("200 OK", "Q\tA\tH\tF\n2+2=?\t4\thint\tinteger\n").await;
    let body = source().fetch(&url).await.unwrap();
    assert!(body.contains("2+2=?"));
}

#[tokio::test]
async fn http_source_reports_non_success_status() {
    let url = serve_once("404 Not Found", "").await;
    let err = source().fetch(&url).await.unwrap_err();
    assert!(matches!(err, FeedLoadError::HttpStatus(status) if status.as_u16() == 404));
}

#[tokio::test]
async fn http_source_reports_unreachable_host() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source()
        .fetch(&format!("http://{addr}/pub"))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedLoadError::Unreachable(_)));
}
