//! Minimal HTTP/1.1 server standing in for the Gemini `generateContent` API.
//!
//! Replies with a scripted sequence of responses, one per connection. Once the
//! script is exhausted the last response repeats. Every request head and body
//! is recorded for inspection.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: &'static str,
    pub body: String,
}

impl Reply {
    pub fn ok_text(text: &str) -> Self {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 4, "candidatesTokenCount": 6, "totalTokenCount": 10 }
        });
        Self {
            status: "200 OK",
            body: body.to_string(),
        }
    }

    pub fn quota_exhausted(retry_delay: &str) -> Self {
        let body = serde_json::json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted (e.g. check quota).",
                "status": "RESOURCE_EXHAUSTED",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.RetryInfo",
                    "retryDelay": retry_delay
                }]
            }
        });
        Self {
            status: "429 Too Many Requests",
            body: body.to_string(),
        }
    }

    pub fn server_error() -> Self {
        let body = serde_json::json!({
            "error": { "code": 500, "message": "Internal error encountered.", "status": "INTERNAL" }
        });
        Self {
            status: "500 Internal Server Error",
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub head: String,
    pub body: String,
}

pub struct MockGemini {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockGemini {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(script: Vec<Reply>) -> MockGemini {
    assert!(!script.is_empty(), "script needs at least one reply");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&requests);
    thread::spawn(move || {
        for (i, stream) in listener.incoming().flatten().enumerate() {
            let reply = script[i.min(script.len() - 1)].clone();
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || handle(stream, &reply, &recorder));
        }
    });
    MockGemini {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, reply: &Reply, recorder: &Mutex<Vec<Recorded>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(recorded) = read_request(&mut stream) else {
        return;
    };
    recorder.lock().unwrap().push(recorded);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(split) = text.find("\r\n\r\n") {
            let head = text[..split].to_string();
            let length = content_length(&head);
            let body = &data[split + 4..];
            if body.len() >= length {
                return Some(Recorded {
                    body: String::from_utf8_lossy(&body[..length]).into_owned(),
                    head,
                });
            }
        }
    }
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
