//! Minimal canned-response HTTP server for exercising the `ureq` clients.
//!
//! `mirrorsync-cli/tests/common` keeps a reduced variant (no header/body
//! capture, no delays) for the binary tests; keep the routing rules in step.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Route {
    pub fn new(method: &'static str, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
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
                for mut request in server.incoming_requests() {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let url = request.url().to_string();
                    let method = request.method().as_str().to_string();
                    let authorization = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());
                    requests.lock().expect("lock").push(Recorded {
                        method: method.clone(),
                        url: url.clone(),
                        authorization,
                        body,
                    });

                    let path = url.split('?').next().unwrap_or_default();
                    let route = routes
                        .iter()
                        .find(|r| r.method == method && r.path == path);
                    let response = match route {
                        Some(route) => {
                            if let Some(delay) = route.delay {
                                thread::sleep(delay);
                            }
                            let header: Header = "Content-Type: application/json"
                                .parse()
                                .expect("header");
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
