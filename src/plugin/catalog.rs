//! Remote package catalog.
//!
//! The catalog is a source repository whose top-level directories are
//! packages. It is read through a GitHub-style contents API: listing the root
//! gives the packages, and fetching `{package}/plugin.json` gives a manifest
//! with base64-encoded content.

use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::compat::is_compatible;
use super::manifest::{decode, ManifestDecode, MANIFEST_FILES};
use super::{PluginError, PluginResult};
use crate::core::RemoteConfig;

/// One record of a contents listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Entry name
    pub name: String,

    /// Path relative to the repository root
    #[serde(default)]
    pub path: String,

    /// `dir`, `file`, `symlink` or `submodule`; empty when the remote omits it
    #[serde(rename = "type", default)]
    pub entry_type: String,

    /// Object hash
    #[serde(default)]
    pub sha: Option<String>,

    /// Browser URL
    #[serde(default)]
    pub html_url: Option<String>,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == "dir"
    }
}

/// A package offered by the catalog.
#[derive(Debug, Clone)]
pub struct RemotePackage {
    /// Package name (top-level directory name)
    pub name: String,

    /// Manifest resolved after listing
    pub manifest: ManifestDecode,

    /// The listing record the package came from
    pub entry: ContentEntry,
}

impl RemotePackage {
    /// Whether the package passes the compatibility gate.
    pub fn is_compatible(&self, host_version: &str) -> bool {
        is_compatible(&self.manifest.clone().into_manifest(), host_version)
    }

    /// Manifest version, if declared.
    pub fn version(&self) -> Option<String> {
        match &self.manifest {
            ManifestDecode::Parsed(m) => m.version().map(str::to_string),
            ManifestDecode::Empty => None,
        }
    }

    /// Manifest description, if declared.
    pub fn description(&self) -> Option<String> {
        match &self.manifest {
            ManifestDecode::Parsed(m) => m.description().map(str::to_string),
            ManifestDecode::Empty => None,
        }
    }
}

/// File object returned by the contents API.
#[derive(Debug, Deserialize)]
struct ContentFile {
    content: String,
}

/// Error body returned by the contents API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// User agent sent with every request.
pub fn user_agent() -> String {
    format!("configcore/{}", crate::CORE_VERSION)
}

/// Build a blocking client with the given timeout.
pub(crate) fn http_client(timeout: Duration) -> PluginResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .map_err(|e| PluginError::Network(e.to_string()))
}

/// Turn a non-success response into [`PluginError::RemoteStatus`].
pub(crate) fn status_error(response: reqwest::blocking::Response) -> PluginError {
    let status = response.status().as_u16();
    let message = response.json::<ErrorBody>().map(|b| b.message).unwrap_or_default();
    PluginError::RemoteStatus { status, message }
}

/// Decode base64 file content as served by the contents API.
pub fn decode_content(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// Decode a contents listing and keep its directories, in order.
pub fn parse_listing(body: &str) -> PluginResult<Vec<ContentEntry>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| PluginError::Serialization(format!("Invalid listing format: {e}")))?;

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ContentEntry>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed listing entry");
                None
            }
        })
        .filter(ContentEntry::is_dir)
        .collect())
}

/// Client for the remote package catalog.
pub struct RemoteCatalog {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
}

impl RemoteCatalog {
    /// Create a catalog client.
    pub fn new(config: RemoteConfig) -> PluginResult<Self> {
        let client = http_client(config.list_timeout())?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn get(&self, path: &str) -> reqwest::Result<reqwest::blocking::Response> {
        let url = if path.is_empty() {
            format!("{}/", self.config.contents_url())
        } else {
            format!("{}/{}", self.config.contents_url(), path)
        };

        let mut request =
            self.client.get(url).header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }
        request.send()
    }

    /// List the package directories at the repository root, in remote order.
    ///
    /// Records that do not look like entries are skipped; only a body that is
    /// not a JSON array fails the listing.
    pub fn list_packages(&self) -> PluginResult<Vec<ContentEntry>> {
        let response = self.get("")?;
        if !response.status().is_success() {
            return Err(status_error(response));
        }

        let body = response.text()?;
        let packages = parse_listing(&body)?;
        tracing::debug!(count = packages.len(), "Listed remote packages");
        Ok(packages)
    }

    /// Fetch a package's manifest. Never fails; see [`ManifestDecode::Empty`].
    pub fn fetch_remote_manifest(&self, package: &str) -> ManifestDecode {
        for file_name in MANIFEST_FILES {
            let response = match self.get(&format!("{package}/{file_name}")) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(package, error = %e, "Failed to fetch remote manifest");
                    return ManifestDecode::Empty;
                }
            };

            if response.status() != reqwest::StatusCode::OK {
                continue;
            }

            let Ok(file) = response.json::<ContentFile>() else {
                continue;
            };

            return match decode_content(&file.content) {
                Some(text) => decode(&text),
                None => {
                    tracing::debug!(package, file = file_name, "Manifest content is not base64 text");
                    ManifestDecode::Empty
                }
            };
        }

        ManifestDecode::Empty
    }

    /// List packages and resolve each one's manifest.
    pub fn refresh(&self) -> PluginResult<Vec<RemotePackage>> {
        let entries = self.list_packages()?;
        Ok(entries
            .into_iter()
            .map(|entry| RemotePackage {
                name: entry.name.clone(),
                manifest: self.fetch_remote_manifest(&entry.name),
                entry,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_with_newlines() {
        let encoded = "eyJuYW1lIjog\nImRlbW8ifQ==\n";
        assert_eq!(decode_content(encoded).as_deref(), Some(r#"{"name": "demo"}"#));
    }

    #[test]
    fn test_decode_content_invalid() {
        assert!(decode_content("%%%").is_none());
    }

    #[test]
    fn test_listing_filters_directories() {
        let json = r#"[
            {"name": "README.md", "path": "README.md", "type": "file"},
            {"name": "i3-gaps", "path": "i3-gaps", "type": "dir", "sha": "abc"},
            {"name": "bar", "path": "bar", "type": "dir"}
        ]"#;
        let dirs: Vec<_> = parse_listing(json).unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(dirs, vec!["i3-gaps", "bar"]);
    }

    #[test]
    fn test_listing_skips_malformed_entries() {
        let json = r#"[
            {"name": "untyped"},
            {"type": "dir"},
            42,
            {"name": "bar", "type": "dir"}
        ]"#;
        let dirs: Vec<_> = parse_listing(json).unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(dirs, vec!["bar"]);
    }

    #[test]
    fn test_listing_that_is_not_an_array() {
        let err = parse_listing(r#"{"message": "Not Found"}"#).unwrap_err();
        assert!(matches!(err, PluginError::Serialization(msg) if msg.contains("Invalid listing format")));
    }

    #[test]
    fn test_remote_package_compatibility() {
        let entry = ContentEntry {
            name: "demo".into(),
            path: "demo".into(),
            entry_type: "dir".into(),
            sha: None,
            html_url: None,
        };
        let package = RemotePackage {
            name: "demo".into(),
            manifest: decode(r#"{"min_core_version": "9.0", "version": "1.2.0"}"#),
            entry: entry.clone(),
        };
        assert!(!package.is_compatible("0.2.0"));
        assert_eq!(package.version().as_deref(), Some("1.2.0"));

        let unknown = RemotePackage { name: "x".into(), manifest: ManifestDecode::Empty, entry };
        assert!(unknown.is_compatible("0.2.0"));
        assert!(unknown.description().is_none());
    }

    #[test]
    fn test_user_agent() {
        assert!(user_agent().starts_with("configcore/"));
    }

    #[test]
    fn test_unreachable_remote() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = RemoteConfig {
            api_root: format!("http://127.0.0.1:{port}"),
            list_timeout_secs: 2,
            ..RemoteConfig::default()
        };
        let catalog = RemoteCatalog::new(config).unwrap();

        assert!(matches!(catalog.list_packages(), Err(PluginError::Network(_))));
        assert!(catalog.fetch_remote_manifest("gaps").is_empty());
    }

    mod http {
        use super::*;
        use serde_json::json;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const LISTING: &str = "/repos/o/r/contents/";

        fn remote(server: &MockServer) -> RemoteConfig {
            RemoteConfig {
                owner: "o".to_string(),
                repo: "r".to_string(),
                api_root: server.uri(),
                archive_host: server.uri(),
                ..RemoteConfig::default()
            }
        }

        /// The blocking client must live outside the async runtime.
        async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
            tokio::task::spawn_blocking(f).await.unwrap()
        }

        #[tokio::test]
        async fn test_list_packages_keeps_dirs_in_remote_order() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(LISTING))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    {"name": "README.md", "type": "file"},
                    {"name": "zeta", "type": "dir"},
                    {"name": "no-type"},
                    {"name": "alpha", "type": "dir"}
                ])))
                .mount(&server)
                .await;

            let config = remote(&server);
            let names = blocking(move || {
                let catalog = RemoteCatalog::new(config).unwrap();
                catalog.list_packages().unwrap().into_iter().map(|e| e.name).collect::<Vec<_>>()
            })
            .await;
            assert_eq!(names, vec!["zeta", "alpha"]);

            let requests = server.received_requests().await.unwrap();
            assert_eq!(requests.len(), 1);
            assert!(requests[0].headers.get("authorization").is_none());
            assert_eq!(
                requests[0].headers.get("accept").unwrap().to_str().unwrap(),
                "application/vnd.github+json"
            );
        }

        #[tokio::test]
        async fn test_list_packages_sends_token() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(LISTING))
                .and(header("authorization", "Bearer secret"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    {"name": "gaps", "type": "dir"}
                ])))
                .mount(&server)
                .await;

            let mut config = remote(&server);
            config.token = Some("secret".to_string());
            let listed = blocking(move || RemoteCatalog::new(config).unwrap().list_packages()).await;
            assert_eq!(listed.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_list_packages_reports_remote_message() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(LISTING))
                .respond_with(
                    ResponseTemplate::new(403)
                        .set_body_json(json!({"message": "API rate limit exceeded"})),
                )
                .mount(&server)
                .await;

            let config = remote(&server);
            let err = blocking(move || RemoteCatalog::new(config).unwrap().list_packages())
                .await
                .unwrap_err();
            match err {
                PluginError::RemoteStatus { status, message } => {
                    assert_eq!(status, 403);
                    assert_eq!(message, "API rate limit exceeded");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_manifest_falls_back_to_second_file() {
            let server = MockServer::start().await;
            // plugin.json is absent (404 by default)
            Mock::given(method("GET"))
                .and(path("/repos/o/r/contents/gaps/manifest.json"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "content": "eyJ2ZXJzaW9uIjogIjEuMi4wIiwgIm\n1pbl9jb3JlX3ZlcnNpb24iOiAiOS4wIn0="
                })))
                .mount(&server)
                .await;

            let config = remote(&server);
            let manifest =
                blocking(move || RemoteCatalog::new(config).unwrap().fetch_remote_manifest("gaps"))
                    .await
                    .into_manifest();
            assert_eq!(manifest.version(), Some("1.2.0"));
            assert!(!is_compatible(&manifest, "0.2.0"));

            let paths: Vec<_> = server
                .received_requests()
                .await
                .unwrap()
                .iter()
                .map(|r| r.url.path().to_string())
                .collect();
            assert_eq!(
                paths,
                vec!["/repos/o/r/contents/gaps/plugin.json", "/repos/o/r/contents/gaps/manifest.json"]
            );
        }

        #[tokio::test]
        async fn test_refresh_resolves_each_manifest() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(LISTING))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    {"name": "gaps", "type": "dir"},
                    {"name": "bare", "type": "dir"}
                ])))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/repos/o/r/contents/gaps/plugin.json"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "content": "bmFtZTogZ2Fwcwp2ZXJzaW9uOiAwLjMuMAo="
                })))
                .mount(&server)
                .await;

            let config = remote(&server);
            let packages = blocking(move || RemoteCatalog::new(config).unwrap().refresh().unwrap()).await;

            assert_eq!(packages.len(), 2);
            assert_eq!(packages[0].name, "gaps");
            assert_eq!(packages[0].version().as_deref(), Some("0.3.0"));
            assert!(packages[0].is_compatible("0.2.0"));
            assert_eq!(packages[1].name, "bare");
            assert!(packages[1].manifest.is_empty());
            assert!(packages[1].is_compatible("0.2.0"));
        }
    }
}
