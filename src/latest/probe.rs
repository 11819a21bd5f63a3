use crate::fetch::config::FetchConfig;
use crate::fetch::http::{body_reader, get_checked, read_chunk};
use crate::types::dataset::DatasetTime;
use log::{debug, info};
use reqwest::Client;

/// Text NOMADS puts in a directory listing for a cycle that is not there (yet).
pub const NO_FILES_MARKER: &[u8] = b"No files or directories found";

/// Answers whether a GFS cycle has been published.
#[allow(async_fn_in_trait)]
pub trait AvailabilityProbe {
    async fn is_available(&self, time: DatasetTime) -> bool;
}

/// Probes the filter service's directory listing for a cycle.
///
/// A cycle counts as available when the listing request succeeds and the
/// first chunk of the listing does not contain [`NO_FILES_MARKER`]. Every
/// failure, remote or local, counts as "not available".
pub struct HttpProbe {
    client: Client,
    config: FetchConfig,
}

impl HttpProbe {
    pub fn new(client: Client, config: &FetchConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }
}

impl AvailabilityProbe for HttpProbe {
    async fn is_available(&self, time: DatasetTime) -> bool {
        let url = self.config.listing_url(&time);
        info!("Trying {}", url);

        let response = match get_checked(&self.client, &url).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Cycle {} unavailable: {}", time, e);
                return false;
            }
        };

        let mut reader = body_reader(response);
        let mut head = Vec::new();
        if let Err(e) = read_chunk(&mut reader, self.config.chunk_size, &mut head).await {
            debug!("Failed reading listing for {}: {}", time, e);
            return false;
        }
        !contains_marker(&head)
    }
}

fn contains_marker(body: &[u8]) -> bool {
    body.windows(NO_FILES_MARKER.len())
        .any(|window| window == NO_FILES_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    const FILTER_PATH: &str = "/cgi-bin/filter_gfs_0p25.pl";

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub server");
        });
        format!("http://{}{}", addr, FILTER_PATH)
    }

    /// Publishes only the 2023-01-01 06z cycle; 12z answers with a 404 and
    /// anything else with the "no files" listing.
    fn listing_router() -> Router {
        Router::new().route(
            FILTER_PATH,
            get(|Query(query): Query<HashMap<String, String>>| async move {
                match query.get("dir").map(String::as_str) {
                    Some("/gfs.20230101/06/atmos") => (
                        StatusCode::OK,
                        "<html><a href=\"gfs.t06z.pgrb2.0p25.anl\">anl</a></html>",
                    )
                        .into_response(),
                    Some("/gfs.20230101/12/atmos") => StatusCode::NOT_FOUND.into_response(),
                    _ => (
                        StatusCode::OK,
                        "<html><body>No files or directories found</body></html>",
                    )
                        .into_response(),
                }
            }),
        )
    }

    fn cycle(hour: u32) -> DatasetTime {
        DatasetTime::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), hour)
    }

    async fn probe_for_stub() -> HttpProbe {
        let base_url = spawn_stub(listing_router()).await;
        HttpProbe::new(Client::new(), &FetchConfig::curated().with_base_url(base_url))
    }

    #[tokio::test]
    async fn test_published_cycle_is_available() {
        let probe = probe_for_stub().await;
        assert!(probe.is_available(cycle(6)).await);
    }

    #[tokio::test]
    async fn test_marker_means_unavailable() {
        let probe = probe_for_stub().await;
        assert!(!probe.is_available(cycle(0)).await);
    }

    #[tokio::test]
    async fn test_http_error_means_unavailable() {
        let probe = probe_for_stub().await;
        assert!(!probe.is_available(cycle(12)).await);
    }

    #[tokio::test]
    async fn test_unreachable_host_means_unavailable() {
        // Port 9 (discard) on localhost is essentially never listening.
        let config = FetchConfig::curated().with_base_url("http://127.0.0.1:9/filter");
        let probe = HttpProbe::new(Client::new(), &config);
        assert!(!probe.is_available(cycle(0)).await);
    }

    #[test]
    fn test_contains_marker() {
        assert!(contains_marker(b"...No files or directories found..."));
        assert!(!contains_marker(b"No files"));
        assert!(!contains_marker(b""));
    }
}
