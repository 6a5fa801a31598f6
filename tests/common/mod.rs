//! Shared integration-test harness: a minimal in-process HTTP server that
//! answers like `/wp-json/wp/v2`, backed by the JSON under `fixtures/wp/`.

#![allow(dead_code)]

use serde_json::Value;
use std::io::{Read as _, Write as _};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const API_PATH: &str = "/wp-json/wp/v2";

// ===========================================================================
// Minimal HTTP server
// ===========================================================================

/// A parsed request line.
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn json(value: &Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn error(status: u16) -> Self {
        Self {
            status,
            body: format!(r#"{{"code":"test_error","message":"status {status}","data":{{"status":{status}}}}}"#),
        }
    }
}

type Handler = dyn Fn(&Request) -> Response + Send + Sync;

pub struct TestServer {
    port: u16,
    requests: Arc<Mutex<Vec<Request>>>,
    _stop: std::sync::mpsc::Sender<()>,
}

impl TestServer {
    pub fn start(handler: impl Fn(&Request) -> Response + Send + Sync + 'static) -> Self {
        let handler: Arc<Handler> = Arc::new(handler);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = std::sync::mpsc::channel::<()>();

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            listener.set_nonblocking(true).unwrap();
            loop {
                if rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => {
                        let handler = Arc::clone(&handler);
                        let log = Arc::clone(&log);
                        thread::spawn(move || serve_request(stream, &*handler, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            port,
            requests,
            _stop: tx,
        }
    }

    /// Server answering from `fixtures/wp/`.
    pub fn wordpress() -> Self {
        let fixtures = Fixtures::load();
        Self::start(move |req| fixtures.respond(req))
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.url(), API_PATH)
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve_request(mut stream: std::net::TcpStream, handler: &Handler, log: &Mutex<Vec<Request>>) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return,
    };
    let raw = String::from_utf8_lossy(&buf[..n]);
    let target = raw.split_whitespace().nth(1).unwrap_or("/");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let request = Request {
        path: path.to_string(),
        query: url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
    };
    log.lock().unwrap().push(request.clone());

    let response = handler(&request);
    let reason = match response.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    };
    let header = format!(
        "HTTP/1.1 {} {reason}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        response.status,
        response.body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(response.body.as_bytes());
}

/// A port with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}{API_PATH}")
}

// ===========================================================================
// WordPress fixture routing
// ===========================================================================

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn read_fixture(name: &str) -> Vec<Value> {
    let path = fixtures_dir().join("wp").join(name);
    let text = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

pub struct Fixtures {
    pub posts: Vec<Value>,
    pub pages: Vec<Value>,
    pub categories: Vec<Value>,
}

impl Fixtures {
    pub fn load() -> Self {
        Self {
            posts: read_fixture("posts.json"),
            pages: read_fixture("pages.json"),
            categories: read_fixture("categories.json"),
        }
    }

    /// Answer a request the way WordPress does for the routes this tool uses.
    pub fn respond(&self, req: &Request) -> Response {
        let Some(route) = req.path.strip_prefix(API_PATH) else {
            return Response::error(404);
        };
        let per_page = req
            .param("per_page")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        match route {
            "/posts" => Response::json(&collection(&self.posts, req, per_page)),
            "/pages" => Response::json(&collection(&self.pages, req, per_page)),
            "/categories" => Response::json(&Value::Array(self.categories.clone())),
            _ => match route.strip_prefix("/posts/").and_then(|id| id.parse::<u64>().ok()) {
                Some(id) => match self.posts.iter().find(|p| p["id"] == id) {
                    Some(post) => Response::json(post),
                    None => Response::error(404),
                },
                None => Response::error(404),
            },
        }
    }
}

fn collection(items: &[Value], req: &Request, per_page: usize) -> Value {
    let matching = items
        .iter()
        .filter(|item| match req.param("slug") {
            Some(slug) => item["slug"] == slug,
            None => true,
        })
        .take(per_page);
    let projected: Vec<Value> = match req.param("_fields") {
        Some(fields) => matching
            .map(|item| {
                let mut out = serde_json::Map::new();
                for field in fields.split(',') {
                    if let Some(v) = item.get(field) {
                        out.insert(field.to_string(), v.clone());
                    }
                }
                Value::Object(out)
            })
            .collect(),
        None => matching.cloned().collect(),
    };
    Value::Array(projected)
}
