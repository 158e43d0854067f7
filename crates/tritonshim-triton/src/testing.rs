//! In-process HTTP fake of a Triton API, for client tests.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub path: String,
    pub uri: String,
    pub request_id: Option<String>,
}

impl SeenRequest {
    pub(crate) fn query_value(&self, key: &str) -> Option<String> {
        let url = reqwest::Url::parse(&format!("http://fake{}", self.uri)).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Answers every request with a fixed status and body and records what it saw.
#[derive(Debug)]
pub(crate) struct FakeApi {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeApi {
    pub(crate) async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorder = Arc::clone(&recorder);
                tokio::spawn(async move {
                    let svc = service_fn(move |req: Request<Incoming>| {
                        let recorder = Arc::clone(&recorder);
                        async move {
                            recorder.lock().push(SeenRequest {
                                path: req.uri().path().to_owned(),
                                uri: req.uri().to_string(),
                                request_id: req
                                    .headers()
                                    .get("request-id")
                                    .and_then(|v| v.to_str().ok())
                                    .map(str::to_owned),
                            });
                            let response = Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(Full::new(Bytes::from_static(body.as_bytes())))
                                .unwrap();
                            Ok::<_, Infallible>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await;
                });
            }
        });

        Self { addr, seen }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn last_request(&self) -> SeenRequest {
        self.seen.lock().last().cloned().expect("no request recorded")
    }
}
