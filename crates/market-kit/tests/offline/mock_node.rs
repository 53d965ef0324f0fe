//! In-process JSON-RPC node for offline tests.
//!
//! Serves one request per connection over plain HTTP/1.1, records every call
//! and answers from per-method handlers. Unhandled methods get `-32601`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use market_kit::*;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned answer to one request.
pub enum Reply {
    Result(Value),
    Error {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    Http(u16),
}

type Handler = Box<dyn FnMut(&Value) -> Reply + Send>;

#[derive(Default)]
struct State {
    handlers: HashMap<String, Handler>,
    calls: Vec<(String, Value)>,
}

#[derive(Clone)]
pub struct MockNode {
    url: String,
    state: Arc<Mutex<State>>,
}

/// Hash returned for every `eth_sendTransaction`.
pub const TX_HASH: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

impl MockNode {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(State::default()));

        let server_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = server_state.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, state).await;
                });
            }
        });

        Self { url, state }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// A client for this node with fast receipt polling and no retries.
    pub fn eth(&self) -> EthBuilder {
        Eth::custom(self.url.clone())
            .retry_config(RetryConfig::none())
            .poll_interval(Duration::from_millis(10))
            .receipt_timeout(Duration::from_secs(2))
    }

    pub fn on(&self, method: &str, handler: impl FnMut(&Value) -> Reply + Send + 'static) {
        self.state
            .lock()
            .unwrap()
            .handlers
            .insert(method.to_string(), Box::new(handler));
    }

    /// Always answer `method` with `value`.
    pub fn result(&self, method: &str, value: Value) {
        self.on(method, move |_| Reply::Result(value.clone()));
    }

    /// Always fail `method` with a JSON-RPC error.
    pub fn error(&self, method: &str, code: i64, message: &str, data: Option<Value>) {
        let message = message.to_string();
        self.on(method, move |_| Reply::Error {
            code,
            message: message.clone(),
            data: data.clone(),
        });
    }

    /// Answer `eth_call` by selector. The closure gets the full calldata and
    /// returns ABI-encoded return data.
    pub fn contract(&self, mut handler: impl FnMut(&[u8]) -> Vec<u8> + Send + 'static) {
        self.on("eth_call", move |params| {
            let data = hex_bytes(&params[0]["data"]);
            Reply::Result(json!(format!("0x{}", hex::encode(handler(&data)))))
        });
    }

    /// Node-managed accounts.
    pub fn accounts(&self, accounts: &[Address]) {
        self.result("eth_accounts", json!(accounts));
    }

    /// Accept `eth_sendTransaction` and mine every transaction with `status`.
    pub fn mine(&self, status: u64, contract_address: Option<Address>) {
        self.result("eth_sendTransaction", json!(TX_HASH));
        self.on("eth_getTransactionReceipt", move |params| {
            Reply::Result(receipt(&params[0], status, contract_address))
        });
    }

    /// Params of every recorded call to `method`, in order.
    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    /// Every recorded method name, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }
}

/// A receipt for `hash` in block 16.
pub fn receipt(hash: &Value, status: u64, contract_address: Option<Address>) -> Value {
    json!({
        "transactionHash": hash,
        "blockHash": format!("0x{}", "bb".repeat(32)),
        "blockNumber": "0x10",
        "from": Address::ZERO,
        "to": null,
        "contractAddress": contract_address,
        "gasUsed": "0x5208",
        "status": format!("{:#x}", status),
        "logs": []
    })
}

pub fn hex_bytes(value: &Value) -> Vec<u8> {
    let s = value.as_str().unwrap_or_default();
    hex::decode(s.trim_start_matches("0x")).unwrap()
}

pub fn address(value: &Value) -> Address {
    value.as_str().unwrap().parse().unwrap()
}

async fn serve(mut stream: TcpStream, state: Arc<Mutex<State>>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request: Value = serde_json::from_slice(&buf[header_end..header_end + length])
        .map_err(std::io::Error::other)?;
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();

    let reply = {
        let mut state = state.lock().unwrap();
        state.calls.push((method.clone(), params.clone()));
        match state.handlers.get_mut(&method) {
            Some(handler) => handler(&params),
            None => Reply::Error {
                code: -32601,
                message: format!("the method {} does not exist/is not available", method),
                data: None,
            },
        }
    };

    let (status, body) = match reply {
        Reply::Result(result) => (
            200,
            json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        ),
        Reply::Error {
            code,
            message,
            data,
        } => (
            200,
            json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": {"code": code, "message": message, "data": data}
            }),
        ),
        Reply::Http(code) => (code, json!({"message": "unavailable"})),
    };

    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        if status == 200 { "OK" } else { "Error" },
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
