//! Session bootstrap. Waits for the automation library to report CONNECTED.
//!
//! The gateway is only handed out from here, so the rest of the application
//! never holds a client that is still starting up.

use crate::adapters::openwa::client::OpenWaGateway;
use crate::domain::DomainError;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const CONNECTED: &str = "CONNECTED";
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll `getConnectionState` until CONNECTED or `timeout` elapses.
///
/// # Errors
///
/// Returns `DomainError::SessionNotReady` with the last observed state (or
/// transport error) when the deadline passes.
pub async fn connect(
    base_url: &str,
    api_key: Option<String>,
    timeout: Duration,
) -> Result<OpenWaGateway, DomainError> {
    connect_polling(base_url, api_key, timeout, POLL_INTERVAL).await
}

pub(crate) async fn connect_polling(
    base_url: &str,
    api_key: Option<String>,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<OpenWaGateway, DomainError> {
    let gateway = OpenWaGateway::new(base_url, api_key);
    let deadline = Instant::now() + timeout;

    loop {
        let last = match gateway.call::<String>("getConnectionState", serde_json::json!({})).await {
            Ok(state) if state.eq_ignore_ascii_case(CONNECTED) => {
                info!(url = base_url, "WhatsApp session connected");
                return Ok(gateway);
            }
            Ok(state) => format!("state {}", state),
            Err(e) => e.to_string(),
        };
        if Instant::now() >= deadline {
            return Err(DomainError::SessionNotReady(last));
        }
        debug!(last = %last, "waiting for WhatsApp session");
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_in_state(state: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getConnectionState"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "response": state})),
            )
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_connects_once_state_is_connected() {
        let server = server_in_state("CONNECTED").await;
        let result = connect_polling(
            &server.uri(),
            None,
            Duration::from_secs(5),
            Duration::from_millis(10),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_times_out_with_last_state() {
        let server = server_in_state("OPENING").await;
        let err = connect_polling(
            &server.uri(),
            None,
            Duration::from_millis(50),
            Duration::from_millis(10),
        )
        .await
        .err()
        .unwrap();
        match err {
            DomainError::SessionNotReady(last) => assert_eq!(last, "state OPENING"),
            other => panic!("unexpected error: {other}"),
        }
        let polls = server.received_requests().await.unwrap().len();
        assert!(polls >= 2, "polled {polls} times");
    }
}
