#![allow(dead_code)]

use async_trait::async_trait;
use sbh_check::lookup::{PageTarget, ScheduleSource};
use sbh_check::models::*;
use sbh_check::SbhResult;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const SAMPLE_LOG: &str = "DATE,DEPARTURE_AIRPORT,ARRIVAL_AIRPORT\n\
                              2023-01-01,AAA,BBB\n\
                              2023-01-02,BBB,AAA\n";

pub fn write_log(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).expect("write fixture");
    path
}

pub fn schedule_entry(date: &str, from: &str, to: &str, minutes: u32) -> ScheduleRecord {
    ScheduleRecord {
        departure: ScheduleEndpoint {
            airport: AirportRef {
                iata: Some(from.to_string()),
            },
            date: Some(ScheduleDate {
                utc: Some(date.to_string()),
            }),
        },
        arrival: ScheduleEndpoint {
            airport: AirportRef {
                iata: Some(to.to_string()),
            },
            date: None,
        },
        elapsed_time: minutes,
    }
}

pub fn page(data: Vec<ScheduleRecord>, next: Option<&str>) -> SchedulePage {
    SchedulePage {
        data,
        paging: Paging {
            next: next.map(str::to_string),
        },
    }
}

/// Schedule source that replays canned pages and records what was asked for.
#[derive(Default)]
pub struct FakeSchedule {
    pages: Mutex<VecDeque<SbhResult<SchedulePage>>>,
    pub queries: Mutex<Vec<ScheduleQuery>>,
    pub tokens: Mutex<Vec<String>>,
}

impl FakeSchedule {
    pub fn with_pages(pages: Vec<SchedulePage>) -> Self {
        Self::with_results(pages.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<SbhResult<SchedulePage>>) -> Self {
        Self {
            pages: Mutex::new(results.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ScheduleSource for FakeSchedule {
    async fn fetch_page(&self, target: PageTarget<'_>) -> SbhResult<SchedulePage> {
        match target {
            PageTarget::Query(query) => self.queries.lock().await.push(query.clone()),
            PageTarget::Token(token) => self.tokens.lock().await.push(token.to_string()),
        }
        self.pages
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(SchedulePage::default()))
    }
}

/// Minimal HTTP/1.1 server answering one canned response per connection.
pub struct StubServer {
    listener: TcpListener,
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub address");
        Self {
            listener,
            base_url: format!("http://{addr}/"),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serves `responses` in order, one per incoming request, in the background.
    pub fn serve(self, responses: Vec<(u16, String)>) -> Arc<Mutex<Vec<String>>> {
        let requests = self.requests.clone();
        let listener = self.listener;

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };

                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                requests
                    .lock()
                    .await
                    .push(String::from_utf8_lossy(&head).into_owned());

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        self.requests
    }
}
