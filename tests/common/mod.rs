// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rpmget::config::{load_config_from, LoadedConfig};
use rpmget::sync::SyncOptions;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const NOARCH_RPM: &str = "python3-py3tftp-1.3.0-1.el9.noarch.rpm";
pub const SRC_RPM: &str = "python-pygtail-0.14.0.3-1.el9.src.rpm";

/// Mock package server for blocking tests
///
/// Wraps a wiremock `MockServer` with its own runtime so the blocking
/// transfer client can be driven from plain `#[test]` functions. HEAD and
/// GET answer with `Content-Length`; anything not added is a 404.
pub struct TestServer {
    server: MockServer,
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    runtime: Runtime,
}

impl TestServer {
    pub fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let server = runtime.block_on(MockServer::start());
        Self {
            server,
            files: RefCell::default(),
            runtime,
        }
    }

    /// Serve `body` at `/pkgs/<name>`, returning its URL
    ///
    /// Adding a name again replaces its body. This remounts every file and
    /// clears the request log.
    pub fn add(&self, name: &str, body: &[u8]) -> String {
        let route = format!("/pkgs/{name}");
        let replaced = self
            .files
            .borrow_mut()
            .insert(route.clone(), body.to_vec())
            .is_some();

        if replaced {
            // The first mounted match wins, so start from a clean server
            self.runtime.block_on(self.server.reset());
            for (route, body) in self.files.borrow().iter() {
                self.mount(route, body);
            }
        } else {
            self.mount(&route, body);
        }
        format!("{}{}", self.server.uri(), route)
    }

    fn mount(&self, route: &str, body: &[u8]) {
        self.runtime.block_on(async {
            Mock::given(method("HEAD"))
                .and(path(route))
                .respond_with(
                    ResponseTemplate::new(200).insert_header("Content-Length", body.len().to_string()),
                )
                .mount(&self.server)
                .await;
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), "application/x-rpm"))
                .mount(&self.server)
                .await;
        });
    }

    /// URL under the server that nothing is served at
    pub fn missing(&self, name: &str) -> String {
        format!("{}/missing/{}", self.server.uri(), name)
    }

    /// Number of requests received so far with the given method
    pub fn count(&self, verb: &str) -> usize {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == verb)
            .count()
    }
}

/// Write an rpmget config listing `urls` and load it
///
/// `top_dir` is relative (`rpms`) so callers can re-root it with
/// [`SyncOptions::with_root`].
pub fn write_config(dir: &Path, name: &str, layout: &str, urls: &[String]) -> LoadedConfig {
    let mut text = format!(
        "[rpmget]\ntop_dir = rpms\nrepo_dir = repo\nlayout = {layout}\npkg_tool = rpm\nhttpx_timeout = 5\n\n[packages]\nurls =\n"
    );
    for url in urls {
        text.push_str(&format!("    {url}\n"));
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    load_config_from(Some(&path)).unwrap()
}

/// Scratch workspace: options rooted in a temp dir with its own cache
///
/// Returns (TempDir, SyncOptions) - keep the TempDir alive to prevent cleanup.
pub fn scratch() -> (TempDir, SyncOptions) {
    let temp_dir = tempfile::tempdir().unwrap();
    let options =
        SyncOptions::new(temp_dir.path().join("cache")).with_root(temp_dir.path().to_path_buf());
    (temp_dir, options)
}

/// Path a package lands at under the scratch root
pub fn top_dir(root: &Path) -> PathBuf {
    root.join("rpms")
}

/// Deterministic package payload of `len` bytes
pub fn payload(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}
