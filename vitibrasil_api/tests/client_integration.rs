use std::time::Duration;

use scraper::Selector;
use vitibrasil_api::types::Section;
use vitibrasil_api::{Client, ClientConfig, Error, PageQuery};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base_url: &str, timeout: Duration) -> Client {
    Client::new(&ClientConfig {
        base_url: base_url.to_string(),
        user_agent: "vitibrasil-tests/1.0".to_string(),
        timeout,
    })
    .unwrap()
}

#[tokio::test]
async fn fetch_parses_html_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("opcao", "opt_02"))
        .and(query_param("ano", "2020"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><table class=\"tb_dados\"></table></body></html>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Duration::from_secs(5));
    let query = PageQuery::new(Section::Production).with_year(2020);
    let doc = client.fetch("index.php", &query).await.unwrap();

    let selector = Selector::parse("table.tb_dados").unwrap();
    assert_eq!(doc.select(&selector).count(), 1);
}

#[tokio::test]
async fn fetch_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(header("user-agent", "vitibrasil-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Duration::from_secs(5));
    let result = client
        .fetch("index.php", &PageQuery::new(Section::Export))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn fetch_normalizes_slashes_between_base_and_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = format!("{}/", mock_server.uri());
    let client = client_for(&base, Duration::from_secs(5));
    let result = client
        .fetch("/index.php", &PageQuery::new(Section::Import))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn fetch_server_error_is_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Duration::from_secs(5));
    let result = client
        .fetch("index.php", &PageQuery::new(Section::Production))
        .await;

    match result {
        Err(Error::HttpStatus { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected HttpStatus, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn fetch_error_body_is_capped() {
    let mock_server = MockServer::start().await;
    let long_body = "x".repeat(5000);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string(long_body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Duration::from_secs(5));
    let err = client
        .fetch("index.php", &PageQuery::new(Section::Production))
        .await
        .unwrap_err();

    let Error::HttpStatus { status, body } = err else {
        panic!("expected HttpStatus");
    };
    assert_eq!(status, 404);
    assert!(body.len() < 600);
    assert!(body.ends_with("...[truncated]"));
}

#[tokio::test]
async fn fetch_timeout_is_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Duration::from_millis(200));
    let err = client
        .fetch("index.php", &PageQuery::new(Section::Production))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn fetch_connection_refused_is_transport_failure() {
    // Nothing listens on port 9 of localhost in the test environment.
    let client = client_for("http://127.0.0.1:9", Duration::from_secs(2));
    let err = client
        .fetch("index.php", &PageQuery::new(Section::Production))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
}

#[tokio::test]
async fn fetch_garbage_body_still_returns_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<<<not html at all"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Duration::from_secs(5));
    let doc = client
        .fetch("index.php", &PageQuery::new(Section::Production))
        .await
        .unwrap();
    let selector = Selector::parse("table").unwrap();
    assert_eq!(doc.select(&selector).count(), 0);
}

#[test]
fn status_errors_are_not_transient() {
    let err = Error::HttpStatus {
        status: 500,
        body: String::new(),
    };
    assert!(!err.is_transient());
}

/// Serves one response whose body is shorter than its declared length, so
/// reading the body fails after the status line arrived.
async fn serve_truncated_once(status_line: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "{}\r\nContent-Type: text/html\r\nContent-Length: 1000\r\n\r\nshort",
            status_line
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn fetch_status_error_survives_unreadable_body() {
    let base_url = serve_truncated_once("HTTP/1.1 503 Service Unavailable").await;

    let client = client_for(&base_url, Duration::from_secs(5));
    let err = client
        .fetch_text("index.php", &PageQuery::new(Section::Production))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn fetch_truncated_success_body_is_transport_failure() {
    let base_url = serve_truncated_once("HTTP/1.1 200 OK").await;

    let client = client_for(&base_url, Duration::from_secs(5));
    let err = client
        .fetch_text("index.php", &PageQuery::new(Section::Production))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
    assert!(err.is_transient());
}
