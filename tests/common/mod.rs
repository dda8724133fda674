//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use fanout_dispatcher::config::EndpointConfig;
use fanout_dispatcher::http::{DelayedEndpoint, RunningEndpoint};

/// What a programmable backend does with one connection.
#[allow(dead_code)]
pub enum Reply {
    /// Wait, then answer with status and body.
    Respond { delay: Duration, status: u16, body: String },
    /// Send the 200 head at once, the body only after `delay`.
    SlowBody { delay: Duration, body: String },
    /// Close the connection without answering.
    Hangup,
}

/// Start the crate's simulated endpoint with the given latency.
#[allow(dead_code)]
pub async fn start_delayed_endpoint(latency: Duration) -> RunningEndpoint {
    DelayedEndpoint::new(EndpointConfig {
        latency_ms: latency.as_millis() as u64,
        ..EndpointConfig::default()
    })
    .spawn()
    .await
    .unwrap()
}

/// Address on localhost that nothing listens on.
#[allow(dead_code)]
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start a raw-socket backend that decides per connection how to reply.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        match f().await {
                            Reply::Respond { delay, status, body } => {
                                tokio::time::sleep(delay).await;
                                let status_text = match status {
                                    200 => "200 OK",
                                    404 => "404 Not Found",
                                    500 => "500 Internal Server Error",
                                    503 => "503 Service Unavailable",
                                    _ => "200 OK",
                                };
                                let response = format!(
                                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    status_text,
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            Reply::SlowBody { delay, body } => {
                                let head = format!(
                                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                                    body.len()
                                );
                                let _ = socket.write_all(head.as_bytes()).await;
                                let _ = socket.flush().await;
                                tokio::time::sleep(delay).await;
                                let _ = socket.write_all(body.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            Reply::Hangup => drop(socket),
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

#[allow(dead_code)]
async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}
