#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use downtime_predictor::server::{self, AppState, ServerConfig};
use downtime_predictor::serving::ModelHolder;
use downtime_predictor::store::ModelStore;
use downtime_predictor::tasks::TrainingConfig;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const BOUNDARY: &str = "downtime-test-boundary";

/// Balanced sensor log: even rows run cool and short, odd rows hot and long.
pub fn balanced_csv(rows: usize) -> String {
    let mut out = String::from("Machine_ID,Temperature,Run_Time,Downtime_Flag\n");
    for i in 0..rows {
        let (t, r, y) = if i % 2 == 0 {
            (60.0 + (i % 17) as f64, 80.0 + (i % 41) as f64, 0)
        } else {
            (74.0 + (i % 23) as f64, 110.0 + (i % 53) as f64, 1)
        };
        out.push_str(&format!("M{i},{t},{r},{y}\n"));
    }
    out
}

pub fn multipart_body(field: &str, file_name: &str, content: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

pub async fn spawn_server(model_path: &Path) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let holder = Arc::new(ModelHolder::new(ModelStore::new(model_path)));
    let state = AppState::new(holder, TrainingConfig::default());
    tokio::spawn(async move {
        let config = ServerConfig::default().with_address(addr);
        server::serve(listener, &config, state).await
    });
    addr
}

pub struct Reply {
    pub status: u16,
    pub body: Value,
}

async fn send(addr: SocketAddr, method: &str, path: &str, content_type: Option<&str>, body: &[u8]) -> Reply {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut head = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: {}\r\n",
        body.len()
    );
    if let Some(ct) = content_type {
        head.push_str(&format!("Content-Type: {ct}\r\n"));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(body).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();
    let (head, payload) = text.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    Reply {
        status,
        body: serde_json::from_str(payload).unwrap_or(Value::Null),
    }
}

pub async fn upload(addr: SocketAddr, csv: &str) -> Reply {
    let ct = format!("multipart/form-data; boundary={BOUNDARY}");
    send(addr, "POST", "/upload", Some(&ct), &multipart_body("file", "data.csv", csv)).await
}

pub async fn upload_raw(addr: SocketAddr, content_type: Option<&str>, body: &[u8]) -> Reply {
    send(addr, "POST", "/upload", content_type, body).await
}

pub async fn predict(addr: SocketAddr, json: &str) -> Reply {
    send(addr, "POST", "/predict", Some("application/json"), json.as_bytes()).await
}

pub async fn health(addr: SocketAddr) -> Reply {
    send(addr, "GET", "/health", None, b"").await
}
