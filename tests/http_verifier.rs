use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use wifi_portal::services::verification::{
    ConnectionVerifier, HttpVerifier, VerificationRequest,
};

// Mock verification backend answering every request with a fixed status and body
async fn start_mock_verification_server(
    status_line: &'static str,
    response_body: &'static str,
    ready_tx: oneshot::Sender<String>,
    request_tx: mpsc::UnboundedSender<String>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let endpoint = format!("http://{}/verify", listener.local_addr()?);

    // Signal that the server is ready
    let _ = ready_tx.send(endpoint);

    loop {
        let (mut stream, _) = listener.accept().await?;
        let request_tx = request_tx.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(&mut stream);
            let mut content_length = 0;

            // Read HTTP headers
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).await.is_err() {
                    return;
                }

                if line.trim().is_empty() {
                    break;
                }

                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }

            let mut body = vec![0; content_length];
            if reader.read_exact(&mut body).await.is_err() {
                return;
            }
            let _ = request_tx.send(String::from_utf8_lossy(&body).to_string());

            let http_response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{response_body}",
                response_body.len(),
            );

            let _ = stream.write_all(http_response.as_bytes()).await;
        });
    }
}

fn request(password: &str) -> VerificationRequest {
    VerificationRequest {
        ssid: "Home-5G".to_string(),
        password: password.to_string(),
        mac: "00:1A:2B:3C:4D:5E".to_string(),
        ip: "192.168.1.100".to_string(),
    }
}

async fn start(
    status_line: &'static str,
    response_body: &'static str,
) -> (
    String,
    mpsc::UnboundedReceiver<String>,
    tokio::task::JoinHandle<()>,
) {
    let (ready_tx, ready_rx) = oneshot::channel();
    let (request_tx, request_rx) = mpsc::unbounded_channel();

    let server_handle = tokio::spawn(async move {
        let _ = start_mock_verification_server(status_line, response_body, ready_tx, request_tx)
            .await;
    });

    let endpoint = ready_rx.await.expect("server failed to start");
    (endpoint, request_rx, server_handle)
}

#[tokio::test]
async fn http_verifier_forwards_request_and_parses_success() {
    let (endpoint, mut requests, server_handle) =
        start("200 OK", r#"{"success":true,"message":"welcome"}"#).await;

    let verifier = HttpVerifier::new(endpoint).expect("failed to create verifier");
    let response = verifier
        .verify(request("longenough1"))
        .await
        .expect("verification request failed");

    assert!(response.success);
    assert_eq!(response.message.as_deref(), Some("welcome"));

    let sent: serde_json::Value =
        serde_json::from_str(&requests.recv().await.expect("request body")).unwrap();
    assert_eq!(sent["ssid"], "Home-5G");
    assert_eq!(sent["password"], "longenough1");
    assert_eq!(sent["mac"], "00:1A:2B:3C:4D:5E");
    assert_eq!(sent["ip"], "192.168.1.100");

    // Clean up
    server_handle.abort();
}

#[tokio::test]
async fn http_verifier_passes_on_rejection() {
    let (endpoint, _requests, server_handle) = start("200 OK", r#"{"success":false}"#).await;

    let verifier = HttpVerifier::new(endpoint).expect("failed to create verifier");
    let response = verifier.verify(request("longenough1")).await.unwrap();

    assert!(!response.success);
    assert!(response.message.is_none());

    server_handle.abort();
}

#[tokio::test]
async fn http_verifier_fails_on_error_status() {
    let (endpoint, _requests, server_handle) =
        start("503 Service Unavailable", r#"{"error":"maintenance"}"#).await;

    let verifier = HttpVerifier::new(endpoint).expect("failed to create verifier");
    let err = verifier.verify(request("longenough1")).await.unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("503"));
    assert!(message.contains("maintenance"));

    server_handle.abort();
}

#[tokio::test]
async fn http_verifier_fails_on_malformed_body() {
    let (endpoint, _requests, server_handle) = start("200 OK", "not json").await;

    let verifier = HttpVerifier::new(endpoint).expect("failed to create verifier");
    let err = verifier.verify(request("longenough1")).await.unwrap_err();

    assert!(format!("{err:#}").contains("failed to parse verification response"));

    server_handle.abort();
}

#[tokio::test]
async fn http_verifier_validates_before_sending() {
    let (endpoint, mut requests, server_handle) = start("200 OK", r#"{"success":true}"#).await;

    let verifier = HttpVerifier::new(endpoint).expect("failed to create verifier");
    assert!(verifier.verify(request("")).await.is_err());

    server_handle.abort();
    assert!(requests.recv().await.is_none());
}
