use async_trait::async_trait;
use dzfp_core::TransportError;
use reqwest::Method;
use std::time::Duration;

/// One HTTP exchange as the protocol driver sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// POST with the headers the invoice service insists on.
    pub fn post_xml(url: &str, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            url: url.to_string(),
            headers: vec![
                ("Content-Type", "text/xml".to_string()),
                ("charset", "utf-8".to_string()),
            ],
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries one request to the service and hands back the raw reply.
///
/// Timeouts are the implementation's business and must surface as
/// [`TransportError::Timeout`]. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.http_client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        tracing::debug!(status, bytes = body.len(), "received reply from invoice service");
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_xml_sets_service_headers() {
        let request = HttpRequest::post_xml("http://localhost/SvrServlet", b"<a/>".to_vec());

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("content-type"), Some("text/xml"));
        assert_eq!(request.header("Charset"), Some("utf-8"));
        assert_eq!(request.header("SOAPAction"), None);
    }

    #[test]
    fn only_2xx_is_success() {
        let reply = |status| HttpResponse {
            status,
            body: Vec::new(),
        };
        assert!(reply(200).is_success());
        assert!(reply(204).is_success());
        assert!(!reply(302).is_success());
        assert!(!reply(500).is_success());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport
            .send(HttpRequest::post_xml("http://127.0.0.1:1/SvrServlet", Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_) | TransportError::Timeout));
    }
}
