use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// Source of raw documents (manifests, indexes) by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> LauncherResult<Vec<u8>>;
}

/// Fetches documents over HTTP with a shared client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self {
            client: build_http_client()?,
            retries: 0,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client, retries: 0 }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    async fn fetch_once(&self, url: &str) -> LauncherResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> LauncherResult<Vec<u8>> {
        with_retry(self.retries, || self.fetch_once(url)).await
    }
}

/// Run `op` up to `retries + 1` times with exponential backoff.
///
/// HTTP status failures other than 429 and 5xx are returned immediately.
pub async fn with_retry<T, F, Fut>(retries: u32, mut op: F) -> LauncherResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LauncherResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < retries && is_retryable(&err) => {
                let backoff_ms = 2_u64.pow(attempt + 1) * 250;
                warn!(
                    "Attempt {} failed ({}), retrying in {}ms",
                    attempt + 1,
                    err,
                    backoff_ms
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn is_retryable(err: &LauncherError) -> bool {
    match err {
        LauncherError::Http(_) => true,
        LauncherError::DownloadFailed { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Lowercase hex SHA-1 of `bytes`.
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Answer a single request on a local port with a canned response.
    async fn serve_once(response: &'static [u8]) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/doc.json")
    }

    fn local_fetcher() -> HttpFetcher {
        HttpFetcher::with_client(Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn fetch_collects_streamed_body() {
        let url =
            serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello").await;
        let body = local_fetcher().fetch(&url).await.unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn fetch_reports_status() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let err = local_fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, LauncherError::DownloadFailed { status: 404, .. }));
    }

    #[tokio::test]
    async fn advertised_length_is_not_trusted() {
        // claims 1 TiB, sends five bytes and hangs up
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 1099511627776\r\nConnection: close\r\n\r\nhello",
        )
        .await;
        let err = local_fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, LauncherError::Http(_)));
    }

    #[test]
    fn sha1_of_known_input() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let calls = AtomicU32::new(0);
        let result = with_retry(1, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(LauncherError::DownloadFailed {
                    url: "u".into(),
                    status: 503,
                })
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = AtomicU32::new(0);
        let result: LauncherResult<()> = with_retry(3, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LauncherError::DownloadFailed {
                url: "u".into(),
                status: 404,
            })
        })
        .await;

        assert!(matches!(
            result,
            Err(LauncherError::DownloadFailed { status: 404, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
