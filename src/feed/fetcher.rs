use crate::feed::traits::FeedSource;
use crate::model::FeedError;

use reqwest::Client;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) RimFeedBot/0.1";
const TIMEOUT_SECS: u64 = 120;

pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, FeedError> {
        Self::with_timeout(Duration::from_secs(TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        info!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?.to_vec();
        info!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/export_data/M28244.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<?xml version=\"1.0\"?><root><rims><cae>X1</cae></rims></root>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpFeedSource::new().expect("client");
        let body = source
            .fetch(&format!("{}/export_data/M28244.xml", server.uri()))
            .await
            .expect("fetch");
        assert!(String::from_utf8_lossy(&body).contains("<cae>X1</cae>"));
    }

    #[tokio::test]
    async fn fetch_keeps_body_bytes_as_served() {
        // "Шина" in windows-1251, served without a charset
        let body = b"<?xml version=\"1.0\" encoding=\"windows-1251\"?><r><name>\xD8\xE8\xED\xE0</name></r>".to_vec();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "text/xml"))
            .mount(&server)
            .await;

        let source = HttpFeedSource::new().expect("client");
        let fetched = source.fetch(&format!("{}/feed.xml", server.uri())).await.expect("fetch");
        assert_eq!(fetched, body);
    }

    #[tokio::test]
    async fn fetch_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpFeedSource::new().expect("client");
        let url = format!("{}/ftp/Brinex_disk.xml", server.uri());
        let err = source.fetch(&url).await.unwrap_err();
        match err {
            FeedError::Status { status, url: failed } => {
                assert_eq!(status, 503);
                assert_eq!(failed, url);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_fails_when_unreachable() {
        let source = HttpFeedSource::with_timeout(Duration::from_secs(2)).expect("client");
        let err = source.fetch("http://127.0.0.1:1/feed.xml").await.unwrap_err();
        assert!(matches!(err, FeedError::Http(_)));
    }
}
