//! Typed client for the UptimeRobot endpoints this proxy fronts.

use std::sync::Arc;

use serde_json::json;
use tokio::time::Duration;

use super::{fetch_with_retry, FetchError, Transport, UpstreamRequest, UpstreamResponse};

const API_BASE: &str = "https://api.uptimerobot.com/v2";
const STATUS_PAGE_BASE: &str = "https://stats.uptimerobot.com/api";

/// Builds the upstream requests and funnels them through the retrying
/// fetcher. Holds two keys: the main (account-scoped) key and a read-only
/// key used for bulk monitor listings.
pub struct UptimeRobotClient {
    transport: Arc<dyn Transport>,
    api_key: String,
    read_api_key: String,
    retries: u32,
    retry_delay: Duration,
}

impl UptimeRobotClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        api_key: String,
        read_api_key: String,
        retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            transport,
            api_key,
            read_api_key,
            retries,
            retry_delay,
        }
    }

    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, FetchError> {
        fetch_with_retry(
            self.transport.as_ref(),
            request,
            self.retries,
            self.retry_delay,
        )
        .await
    }

    /// All monitors with their recent logs (`logs=1`), read-only key.
    pub async fn get_monitors(&self) -> Result<UpstreamResponse, FetchError> {
        let request = UpstreamRequest::post(
            format!("{API_BASE}/getMonitors"),
            json!({
                "api_key": self.read_api_key,
                "format": "json",
                "logs": 1,
            }),
        );
        self.send(request).await
    }

    /// A single monitor by id through the authenticated API.
    pub async fn get_monitor(&self, monitor_id: &str) -> Result<UpstreamResponse, FetchError> {
        let request = UpstreamRequest::post(
            format!("{API_BASE}/getMonitors"),
            json!({
                "api_key": self.api_key,
                "format": "json",
                "logs": 1,
                "monitors": monitor_id,
            }),
        );
        self.send(request).await
    }

    /// A single monitor through its public status page (no key needed).
    pub async fn get_public_monitor(
        &self,
        page_id: &str,
        monitor_id: &str,
    ) -> Result<UpstreamResponse, FetchError> {
        let request = UpstreamRequest::get(format!(
            "{STATUS_PAGE_BASE}/getMonitor/{page_id}?m={monitor_id}"
        ));
        self.send(request).await
    }

    /// All public status pages on the account.
    pub async fn get_public_pages(&self) -> Result<UpstreamResponse, FetchError> {
        let request = UpstreamRequest::post(
            format!("{API_BASE}/getPSPs"),
            json!({
                "api_key": self.api_key,
                "format": "json",
            }),
        );
        self.send(request).await
    }

    /// Account details (limits, monitor counts, contact email).
    pub async fn get_account_details(&self) -> Result<UpstreamResponse, FetchError> {
        let request = UpstreamRequest::post(
            format!("{API_BASE}/getAccountDetails"),
            json!({
                "api_key": self.api_key,
                "format": "json",
            }),
        );
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{TransportError, UpstreamMethod};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Records every request and answers 200 with an empty body.
    struct RecordingTransport {
        requests: Mutex<Vec<UpstreamRequest>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(
            &self,
            request: UpstreamRequest,
        ) -> Result<UpstreamResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(UpstreamResponse {
                status: 200,
                body: json!({"stat": "ok"}),
            })
        }
    }

    fn client_with_recorder() -> (UptimeRobotClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport {
            requests: Mutex::new(Vec::new()),
        });
        let client = UptimeRobotClient::new(
            transport.clone(),
            "main-key".to_string(),
            "read-key".to_string(),
            3,
            Duration::from_millis(1000),
        );
        (client, transport)
    }

    #[tokio::test]
    async fn get_monitors_posts_read_key_with_logs() {
        let (client, transport) = client_with_recorder();
        client.get_monitors().await.expect("stubbed ok");

        let requests = transport.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.method, UpstreamMethod::Post);
        assert_eq!(request.url, "https://api.uptimerobot.com/v2/getMonitors");
        let body = request.body.as_ref().expect("json body");
        assert_eq!(body["api_key"], Value::from("read-key"));
        assert_eq!(body["logs"], Value::from(1));
    }

    #[tokio::test]
    async fn get_monitor_uses_main_key_and_id_filter() {
        let (client, transport) = client_with_recorder();
        client.get_monitor("777").await.expect("stubbed ok");

        let requests = transport.requests.lock().unwrap();
        let body = requests[0].body.as_ref().expect("json body");
        assert_eq!(body["api_key"], Value::from("main-key"));
        assert_eq!(body["monitors"], Value::from("777"));
    }

    #[tokio::test]
    async fn public_monitor_hits_the_status_page_api() {
        let (client, transport) = client_with_recorder();
        client
            .get_public_monitor("abc123", "42")
            .await
            .expect("stubbed ok");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].method, UpstreamMethod::Get);
        assert_eq!(
            requests[0].url,
            "https://stats.uptimerobot.com/api/getMonitor/abc123?m=42"
        );
        assert!(requests[0].body.is_none());
    }
}
