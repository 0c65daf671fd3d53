//! Canned-response stand-in for the scanner control API.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use zapgate_core::ScannerEndpoint;

type Routes = Arc<Mutex<Vec<(String, VecDeque<String>)>>>;

/// Minimal HTTP server answering scanner API requests with canned JSON.
///
/// Routes match by substring on the request path+query, first match wins.
/// Each route holds a queue of bodies consumed one per hit; the last body
/// repeats. Unmatched requests get `{}`. Every request path is logged for
/// call-count assertions.
pub struct StubScanner {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubScanner {
    pub async fn start(routes: &[(&str, &[&str])]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let port = listener.local_addr().expect("stub addr").port();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let table: Routes = Arc::new(Mutex::new(
            routes
                .iter()
                .map(|(key, bodies)| {
                    (
                        (*key).to_string(),
                        bodies.iter().map(|b| (*b).to_string()).collect(),
                    )
                })
                .collect(),
        ));

        let log = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let log = log.clone();
                let table = table.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                    let path = request
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or_default()
                        .to_string();
                    log.lock().expect("request log").push(path.clone());

                    let body = {
                        let mut table = table.lock().expect("route table");
                        match table
                            .iter_mut()
                            .find(|(key, _)| path.contains(key.as_str()))
                        {
                            Some((_, bodies)) if bodies.len() > 1 => {
                                bodies.pop_front().expect("non-empty queue")
                            }
                            Some((_, bodies)) => {
                                bodies.front().cloned().unwrap_or_else(|| "{}".to_string())
                            }
                            None => "{}".to_string(),
                        }
                    };

                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { port, requests }
    }

    pub fn endpoint(&self) -> ScannerEndpoint {
        ScannerEndpoint::new("127.0.0.1", self.port, Duration::from_secs(5))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }

    pub fn count_calls(&self, key: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.contains(key))
            .count()
    }
}
