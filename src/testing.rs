// Shared fixtures for tests that talk to a mock ChainDB server.

use crate::api::ApiClient;
use crate::store::{ConfigStore, Configuration, Credential, CredentialStore};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

// The client is blocking, so the mock server is driven by its own
// runtime and the requests are made from the plain test thread.
pub struct Harness {
    pub server: MockServer,
    rt: Runtime,
    dir: TempDir,
    pub client: ApiClient,
}

impl Harness {
    pub fn new(token: Option<&str>) -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        let dir = TempDir::new().unwrap();
        let config = ConfigStore::at(dir.path().join("config.json"));
        config.save(&Configuration { host: server.uri() }).unwrap();
        let credentials = CredentialStore::at(dir.path().join("token.json"));
        if let Some(token) = token {
            credentials
                .save(&Credential {
                    token: token.into(),
                    database: "shop".into(),
                })
                .unwrap();
        }
        let client = ApiClient::new(config, credentials).unwrap();
        Harness {
            server,
            rt,
            dir,
            client,
        }
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    pub fn received(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn request_count(&self) -> usize {
        self.received().len()
    }
}

/// A host nothing listens on.
pub fn closed_port_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
