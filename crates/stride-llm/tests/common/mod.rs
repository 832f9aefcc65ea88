//! Local stub HTTP server for provider tests.

use std::io::Read;
use std::sync::mpsc;
use std::thread;

/// One request as seen by the stub.
#[derive(Debug)]
pub struct Captured {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct StubServer {
    pub base_url: String,
    captured: mpsc::Receiver<Captured>,
}

impl StubServer {
    /// Serve `responses` in order, one per request, then stop.
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().map(|a| a.port()).unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let Ok(mut request) = server.recv() else {
                    return;
                };
                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                let captured = Captured {
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.to_string(), h.value.to_string()))
                        .collect(),
                    body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
                };
                let _ = tx.send(captured);
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        tiny_http::Header::from_bytes("Content-Type", "application/json").unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            captured: rx,
        }
    }

    pub fn next_request(&self) -> Captured {
        self.captured
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap()
    }
}
