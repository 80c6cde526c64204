//! Canned-response HTTP server standing in for GitHub, raw content and
//! Vertex AI in one process.
//!
//! Routes match on method and path only. The richer server in
//! `mirrorsync-remote/tests/common` also records headers and bodies and
//! can delay responses; the binary tests only need request counts.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tiny_http::{Header, Response, Server};

pub struct Route {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
}

impl Route {
    pub fn new(method: &'static str, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            body: body.into(),
        }
    }
}

/// Method and URL of one served request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
}

pub struct MockServer {
    pub base: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock server"));
        let port = server.server_addr().to_ip().expect("ip listener").port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = server.clone();
            let requests = requests.clone();
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    let url = request.url().to_string();
                    let method = request.method().as_str().to_string();
                    requests.lock().expect("lock").push(Recorded {
                        method: method.clone(),
                        url: url.clone(),
                    });

                    let path = url.split('?').next().unwrap_or_default();
                    let response = match routes.iter().find(|r| r.method == method && r.path == path) {
                        Some(route) => {
                            let header: Header =
                                "Content-Type: application/json".parse().expect("header");
                            Response::from_string(route.body.clone())
                                .with_status_code(route.status)
                                .with_header(header)
                        }
                        None => Response::from_string("no route").with_status_code(404),
                    };
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            base: format!("http://127.0.0.1:{port}"),
            server,
            requests,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
