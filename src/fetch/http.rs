use crate::fetch::error::FetchError;
use futures_util::TryStreamExt;
use reqwest::{Client, Response};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;

/// GET `url` and turn transport failures and non-2xx statuses into
/// [`FetchError`]s.
pub(crate) async fn get_checked(client: &Client, url: &str) -> Result<Response, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

    // Logging is left to the caller: a 404 is routine while looking for the
    // latest cycle but an error for a download.
    match response.error_for_status() {
        Ok(resp) => Ok(resp),
        Err(e) => {
            Err(if let Some(status) = e.status() {
                FetchError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                FetchError::NetworkRequest(url.to_string(), e)
            })
        }
    }
}

/// The response body as an [`AsyncRead`].
pub(crate) fn body_reader(response: Response) -> impl AsyncRead + Unpin {
    let stream = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    StreamReader::new(Box::pin(stream))
}

/// Fills `buf` with up to `chunk_size` bytes. An empty `buf` afterwards means
/// the body is exhausted.
pub(crate) async fn read_chunk<R>(
    reader: &mut R,
    chunk_size: usize,
    buf: &mut Vec<u8>,
) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    buf.clear();
    reader.take(chunk_size as u64).read_to_end(buf).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub server");
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_get_checked_maps_status() {
        let router = Router::new()
            .route("/ok", get(|| async { "listing" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let base = spawn_stub(router).await;
        let client = Client::new();

        let ok = get_checked(&client, &format!("{}/ok", base)).await;
        assert!(ok.is_ok());

        let url = format!("{}/missing", base);
        let err = get_checked(&client, &url).await.expect_err("404 must fail");
        assert!(matches!(
            &err,
            FetchError::HttpStatus { url: failed, status, .. }
                if failed == &url && *status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_read_chunk_caps_size() {
        let router = Router::new().route("/body", get(|| async { "0123456789" }));
        let base = spawn_stub(router).await;
        let response = get_checked(&Client::new(), &format!("{}/body", base))
            .await
            .unwrap();

        let mut reader = body_reader(response);
        let mut buf = Vec::new();
        assert_eq!(read_chunk(&mut reader, 4, &mut buf).await.unwrap(), 4);
        assert_eq!(buf, b"0123");
        assert_eq!(read_chunk(&mut reader, 100, &mut buf).await.unwrap(), 6);
        assert_eq!(buf, b"456789");
        assert_eq!(read_chunk(&mut reader, 100, &mut buf).await.unwrap(), 0);
    }
}
