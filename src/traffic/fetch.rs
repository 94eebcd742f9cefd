use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

use super::snapshot::{GraphSnapshot, parse_snapshot};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach {endpoint}: {reason}")]
    NetworkFailure { endpoint: String, reason: String },
    #[error("{endpoint} answered with HTTP {status}")]
    HttpError { endpoint: String, status: u16 },
    #[error("unexpected snapshot body from {endpoint}: {source}")]
    DecodeFailure {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything able to produce the latest graph snapshot. Called from a worker thread.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self) -> Result<GraphSnapshot, FetchError>;

    fn endpoint(&self) -> &str;
}

#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub use_system_proxy: bool,
}

pub struct HttpSnapshotSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpSnapshotSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().timeout(config.timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .with_context(|| format!("failed to build HTTP client for {}", config.endpoint))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    fn network_failure(&self, error: &reqwest::Error) -> FetchError {
        let reason = if error.is_timeout() {
            "request timed out".to_owned()
        } else {
            error.to_string()
        };
        FetchError::NetworkFailure {
            endpoint: self.endpoint.clone(),
            reason,
        }
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self) -> Result<GraphSnapshot, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|error| self.network_failure(&error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpError {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|error| self.network_failure(&error))?;

        parse_snapshot(&body).map_err(|source| FetchError::DecodeFailure {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use super::super::feed::{FeedStatus, SnapshotFeed};
    use super::*;

    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let address = listener.local_addr().expect("listener address");

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 2048];
                let _ = stream.read(&mut request);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{address}/api/graph_data")
    }

    fn source_for(endpoint: String) -> HttpSnapshotSource {
        HttpSnapshotSource::new(&SourceConfig {
            endpoint,
            timeout: Duration::from_secs(3),
            use_system_proxy: false,
        })
        .expect("client builds")
    }

    #[test]
    fn decodes_successful_response() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"nodes":[{"id":"Start","label":"Start"}],"edges":[],"best_route":["Start"],"min_weight":0,"max_weight":1,"next_update":1}"#,
        );
        let snapshot = source_for(endpoint).fetch().expect("fetch succeeds");
        assert_eq!(snapshot.nodes[0].id, "Start");
        assert_eq!(snapshot.best_route, vec!["Start"]);
    }

    #[test]
    fn non_success_status_is_http_error() {
        let endpoint = serve_once("503 Service Unavailable", "{}");
        let error = source_for(endpoint).fetch().unwrap_err();
        assert!(matches!(error, FetchError::HttpError { status: 503, .. }));
        assert!(error.to_string().contains("503"));
    }

    #[test]
    fn malformed_body_is_decode_failure() {
        let endpoint = serve_once("200 OK", "not json at all");
        let error = source_for(endpoint).fetch().unwrap_err();
        assert!(matches!(error, FetchError::DecodeFailure { .. }));
    }

    #[test]
    fn refused_connection_is_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let source = source_for(format!("http://{address}/api/graph_data"));
        let error = source.fetch().unwrap_err();
        assert!(matches!(error, FetchError::NetworkFailure { .. }));
        assert_eq!(source.endpoint(), format!("http://{address}/api/graph_data"));
    }

    #[test]
    fn stalled_endpoint_times_out_as_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let address = listener.local_addr().expect("listener address");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 2048];
                let _ = stream.read(&mut request);
                thread::sleep(Duration::from_secs(3));
            }
        });

        let source = HttpSnapshotSource::new(&SourceConfig {
            endpoint: format!("http://{address}/api/graph_data"),
            timeout: Duration::from_millis(200),
            use_system_proxy: false,
        })
        .expect("client builds");

        let mut feed = SnapshotFeed::new(Arc::new(source), Duration::from_secs(60));
        feed.start(Instant::now());
        assert!(feed.wait_for_fetch(Duration::from_secs(2)));

        let state = feed.state();
        assert_eq!(state.status, FeedStatus::Error);
        let message = state.error.as_deref().expect("error message");
        assert!(message.contains("request timed out"), "{message}");
        assert!(state.snapshot.is_none());
    }

    #[test]
    fn timeout_reason_names_the_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let address = listener.local_addr().expect("listener address");
        thread::spawn(move || {
            if let Ok((_stream, _)) = listener.accept() {
                thread::sleep(Duration::from_secs(3));
            }
        });

        let endpoint = format!("http://{address}/api/graph_data");
        let source = HttpSnapshotSource::new(&SourceConfig {
            endpoint: endpoint.clone(),
            timeout: Duration::from_millis(200),
            use_system_proxy: false,
        })
        .expect("client builds");

        match source.fetch().unwrap_err() {
            FetchError::NetworkFailure {
                endpoint: failed,
                reason,
            } => {
                assert_eq!(failed, endpoint);
                assert_eq!(reason, "request timed out");
            }
            other => panic!("expected a network failure, got {other}"),
        }
    }
}
