//! HTTP scrape of a metrics endpoint.
//!
//! A plain HTTP/1.1 GET over a fresh TCP connection, bounded by a timeout.
//! Only status 200 counts as success; the body is returned as text.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, HOST, USER_AGENT};
use http::{Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Empty};
use tracing::debug;

use crate::error::{FetchError, FetchResult};

const SCRAPE_ACCEPT: &str = "text/plain;version=0.0.4;q=1,*/*;q=0.1";
const SCRAPE_USER_AGENT: &str = concat!("promlive/", env!("CARGO_PKG_VERSION"));

/// Boxed scrape future.
pub type FetchFuture = Pin<Box<dyn Future<Output = FetchResult<String>> + Send>>;

/// Scrape function used by the monitor: `(url, timeout) → body`.
///
/// Swappable so the refresh loop can be driven without a network.
pub type Fetcher = Arc<dyn Fn(String, Duration) -> FetchFuture + Send + Sync>;

/// The default fetcher, backed by [`fetch_text`].
pub fn http_fetcher() -> Fetcher {
    Arc::new(|url, timeout| Box::pin(async move { fetch_text(&url, timeout).await }))
}

/// GET `url` and return the response body.
///
/// Fails on connection or protocol errors, on any status other than 200,
/// and when the whole exchange takes longer than `timeout`.
pub async fn fetch_text(url: &str, timeout: Duration) -> FetchResult<String> {
    let uri: Uri = url
        .trim()
        .parse()
        .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => return Err(FetchError::UnsupportedScheme(other.to_string())),
        None => return Err(FetchError::InvalidUrl(url.to_string())),
    }

    match tokio::time::timeout(timeout, get(&uri)).await {
        Ok(result) => result,
        Err(_) => {
            debug!(%uri, ?timeout, "scrape timed out");
            Err(FetchError::Timeout(timeout))
        }
    }
}

async fn get(uri: &Uri) -> FetchResult<String> {
    let authority = uri
        .authority()
        .ok_or_else(|| FetchError::InvalidUrl(uri.to_string()))?;
    let address = match authority.port_u16() {
        Some(_) => authority.as_str().to_string(),
        None => format!("{}:80", authority.host()),
    };

    let stream = tokio::net::TcpStream::connect(&address)
        .await
        .map_err(FetchError::Connect)?;

    let io = hyper_util::rt::TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(FetchError::Handshake)?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "scrape connection closed with error");
        }
    });

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let req = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(HOST, authority.as_str())
        .header(ACCEPT, SCRAPE_ACCEPT)
        .header(USER_AGENT, SCRAPE_USER_AGENT)
        .body(Empty::<Bytes>::new())
        .map_err(FetchError::Request)?;

    let resp = sender.send_request(req).await.map_err(FetchError::Send)?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status(status));
    }

    if let Some(content_type) = resp.headers().get(http::header::CONTENT_TYPE) {
        if !content_type.as_bytes().starts_with(b"text/plain") {
            debug!(?content_type, %uri, "unexpected scrape content type");
        }
    }

    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(FetchError::Body)?
        .to_bytes();

    Ok(String::from_utf8_lossy(&body).into_owned())
}
