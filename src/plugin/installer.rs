//! Package installer.
//!
//! Installing downloads a snapshot archive of the whole catalog repository,
//! picks out one top-level package directory, and replaces the store copy of
//! that package with it.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use zip::ZipArchive;

use super::store::{validate_name, LocalStore};
use super::{PluginError, PluginResult};

/// Extract `package` from a snapshot archive into the store.
///
/// Consumes the snapshot; its temporary file is removed when this returns,
/// whatever the outcome. Any previous copy of the package is replaced, never
/// merged.
pub fn install_from_snapshot(
    snapshot: NamedTempFile,
    package: &str,
    store: &LocalStore,
) -> PluginResult<PathBuf> {
    validate_name(package)?;
    extract_package(snapshot.reopen()?, package, store)
}

/// Extract `package` from an opened snapshot archive into the store.
pub fn extract_package(archive: File, package: &str, store: &LocalStore) -> PluginResult<PathBuf> {
    let mut archive = ZipArchive::new(archive)?;
    if archive.is_empty() {
        return Err(PluginError::EmptyArchive);
    }

    let first = archive.by_index_raw(0)?.name().to_string();
    let root = first.split('/').next().unwrap_or_default();
    let prefix = format!("{root}/{package}/");

    let mut selected = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if let Some(rel) = entry.name().strip_prefix(&prefix) {
            selected.push((index, rel.to_string()));
        }
    }

    if selected.is_empty() {
        return Err(PluginError::PackageNotFound(package.to_string()));
    }

    store.ensure()?;
    let staging = tempfile::Builder::new().prefix(".staging-").tempdir_in(store.root())?;

    for (index, rel) in selected {
        if rel.is_empty() {
            continue;
        }
        if !is_plain_relative(&rel) {
            tracing::warn!(entry = %rel, package, "Skipping unsafe archive entry");
            continue;
        }

        let mut entry = archive.by_index(index)?;
        let target = staging.path().join(&rel);
        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    let dest = store.root().join(package);
    if dest.exists() {
        std::fs::remove_dir_all(&dest)?;
    }
    std::fs::rename(staging.path(), &dest)?;

    tracing::info!(package, path = %dest.display(), "Package installed");
    Ok(dest)
}

/// Whether an archive-relative path stays inside its destination.
pub fn is_plain_relative(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    !path.is_empty()
        && !path.contains('\\')
        && Path::new(path).components().all(|c| matches!(c, Component::Normal(_)))
}

/// Downloads snapshots from the catalog host and installs packages.
#[cfg(feature = "remote")]
pub struct Installer {
    config: crate::core::RemoteConfig,
    store: LocalStore,
    download_dir: Option<PathBuf>,
}

#[cfg(feature = "remote")]
impl Installer {
    pub fn new(config: crate::core::RemoteConfig, store: LocalStore) -> Self {
        Self { config, store, download_dir: None }
    }

    /// Download snapshots into `dir` instead of the system temp directory.
    #[must_use]
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Download the snapshot of `branch` into a temporary file.
    pub fn download_snapshot(&self, branch: &str) -> PluginResult<NamedTempFile> {
        let url = self.config.archive_url(branch);
        let client = super::catalog::http_client(self.config.download_timeout())?;

        let mut request = client.get(&url);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url = %url, "Downloading snapshot");
        let mut response = request.send()?;
        if !response.status().is_success() {
            return Err(super::catalog::status_error(response));
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("configcore-").suffix(".zip");
        let mut snapshot = match self.download_dir {
            Some(ref dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        let bytes = response.copy_to(snapshot.as_file_mut())?;
        tracing::debug!(bytes, "Snapshot downloaded");
        Ok(snapshot)
    }

    /// Install (or update) `package` from `branch`.
    pub fn install(&self, package: &str, branch: &str) -> PluginResult<PathBuf> {
        validate_name(package)?;
        let snapshot = self.download_snapshot(branch)?;
        install_from_snapshot(snapshot, package, &self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn snapshot(entries: &[(&str, Option<&str>)]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let mut writer = ZipWriter::new(file.reopen().unwrap());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            match content {
                Some(content) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(content.as_bytes()).unwrap();
                }
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap();
        file
    }

    fn repo_snapshot() -> NamedTempFile {
        snapshot(&[
            ("Modules-main/", None),
            ("Modules-main/README.md", Some("catalog")),
            ("Modules-main/demo/", None),
            ("Modules-main/demo/plugin.json", Some(r#"{"name": "demo"}"#)),
            ("Modules-main/demo/scripts/", None),
            ("Modules-main/demo/scripts/run.sh", Some("echo hi")),
            ("Modules-main/other/plugin.json", Some("{}")),
        ])
    }

    #[test]
    fn test_install_extracts_only_package() {
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());

        let path = install_from_snapshot(repo_snapshot(), "demo", &store).unwrap();

        assert_eq!(path, store_dir.path().join("demo"));
        assert!(path.join("plugin.json").is_file());
        assert_eq!(std::fs::read_to_string(path.join("scripts/run.sh")).unwrap(), "echo hi");
        assert!(!store_dir.path().join("other").exists());
        assert_eq!(store.list(), vec!["demo"]);
    }

    #[test]
    fn test_reinstall_replaces_without_merge() {
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());
        let stale = store_dir.path().join("demo/stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        install_from_snapshot(repo_snapshot(), "demo", &store).unwrap();
        install_from_snapshot(repo_snapshot(), "demo", &store).unwrap();

        assert!(!stale.exists());
        assert!(store_dir.path().join("demo/plugin.json").is_file());
        assert_eq!(store.list(), vec!["demo"]);
    }

    #[test]
    fn test_missing_package_removes_snapshot() {
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());
        let archive = repo_snapshot();
        let archive_path = archive.path().to_path_buf();

        let result = install_from_snapshot(archive, "absent", &store);

        assert!(matches!(result, Err(PluginError::PackageNotFound(ref name)) if name == "absent"));
        assert!(!archive_path.exists());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_empty_archive() {
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());

        let result = install_from_snapshot(snapshot(&[]), "demo", &store);
        assert!(matches!(result, Err(PluginError::EmptyArchive)));
    }

    #[test]
    fn test_not_an_archive() {
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<html>rate limited</html>").unwrap();

        let result = install_from_snapshot(file, "demo", &store);
        assert!(matches!(result, Err(PluginError::Archive(_))));
    }

    #[test]
    fn test_invalid_package_name() {
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());
        let result = install_from_snapshot(repo_snapshot(), "..", &store);
        assert!(matches!(result, Err(PluginError::InvalidName(_))));
    }

    #[test]
    fn test_plain_relative_paths() {
        assert!(is_plain_relative("plugin.json"));
        assert!(is_plain_relative("scripts/run.sh"));
        assert!(is_plain_relative("scripts/"));
        assert!(!is_plain_relative("../escape.txt"));
        assert!(!is_plain_relative("a/../../b"));
        assert!(!is_plain_relative("/etc/passwd"));
        assert!(!is_plain_relative("./x"));
        assert!(!is_plain_relative(""));
    }

    #[cfg(feature = "remote")]
    mod http {
        use super::*;
        use crate::core::RemoteConfig;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const ARCHIVE: &str = "/o/r/archive/refs/heads/main.zip";

        fn installer(server: &MockServer, store: &TempDir, downloads: &TempDir) -> Installer {
            let config = RemoteConfig {
                owner: "o".to_string(),
                repo: "r".to_string(),
                archive_host: server.uri(),
                download_timeout_secs: 5,
                ..RemoteConfig::default()
            };
            Installer::new(config, LocalStore::new(store.path())).download_dir(downloads.path())
        }

        fn is_empty_dir(dir: &TempDir) -> bool {
            std::fs::read_dir(dir.path()).unwrap().next().is_none()
        }

        async fn serve_snapshot(server: &MockServer) {
            let bytes = std::fs::read(repo_snapshot().path()).unwrap();
            Mock::given(method("GET"))
                .and(path(ARCHIVE))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
                .mount(server)
                .await;
        }

        #[tokio::test]
        async fn test_install_downloads_and_extracts() {
            let server = MockServer::start().await;
            serve_snapshot(&server).await;
            let store = TempDir::new().unwrap();
            let downloads = TempDir::new().unwrap();

            let installer = installer(&server, &store, &downloads);
            let installed = tokio::task::spawn_blocking(move || installer.install("demo", "main"))
                .await
                .unwrap()
                .unwrap();

            assert!(installed.join("scripts/run.sh").is_file());
            assert!(is_empty_dir(&downloads));
        }

        #[tokio::test]
        async fn test_missing_package_removes_download() {
            let server = MockServer::start().await;
            serve_snapshot(&server).await;
            let store = TempDir::new().unwrap();
            let downloads = TempDir::new().unwrap();

            let installer = installer(&server, &store, &downloads);
            let result = tokio::task::spawn_blocking(move || installer.install("absent", "main"))
                .await
                .unwrap();

            assert!(matches!(result, Err(PluginError::PackageNotFound(_))));
            assert!(is_empty_dir(&downloads));
        }

        #[tokio::test]
        async fn test_failed_download_reports_status() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(ARCHIVE))
                .respond_with(
                    ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})),
                )
                .mount(&server)
                .await;
            let store = TempDir::new().unwrap();
            let downloads = TempDir::new().unwrap();

            let installer = installer(&server, &store, &downloads);
            let result = tokio::task::spawn_blocking(move || installer.install("demo", "main"))
                .await
                .unwrap();

            assert!(matches!(
                result,
                Err(PluginError::RemoteStatus { status: 404, ref message }) if message == "Not Found"
            ));
            assert!(is_empty_dir(&downloads));
            assert!(LocalStore::new(store.path()).list().is_empty());
        }
    }
}
