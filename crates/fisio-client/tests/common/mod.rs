#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use fisio_client::api::ApiClient;
use fisio_client::error::ClientError;
use fisio_client::mock::MockStore;
use fisio_client::session::SessionStore;
use fisio_client::transport::{BoxFuture, HttpRequest, HttpResponse, Method, Transport};

pub enum Reply {
    Respond(Result<HttpResponse, ClientError>),
    /// Never resolves.
    Stall,
}

type Handler = Box<dyn Fn(&HttpRequest) -> Reply + Send + Sync>;

/// Transport driven by a closure, recording every request it sees.
pub struct FakeTransport {
    handler: Handler,
    log: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new(handler: impl Fn(&HttpRequest) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Every request fails as if the server were down.
    pub fn unreachable() -> Arc<Self> {
        Self::new(|_| Reply::Respond(Err(ClientError::Connectivity("connection refused".into()))))
    }

    /// Every request gets the same status and JSON body.
    pub fn always(status: u16, body: serde_json::Value) -> Arc<Self> {
        Self::new(move |_| Reply::Respond(Ok(HttpResponse::json(status, &body))))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn count_of(&self, method: Method) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, ClientError>> {
        let reply = (self.handler)(&request);
        self.log.lock().unwrap().push(request);
        Box::pin(async move {
            match reply {
                Reply::Respond(result) => result,
                Reply::Stall => futures::future::pending().await,
            }
        })
    }
}

/// Echo a POSTed JSON body back with a fresh id, like the real API does.
pub fn echo_created(request: &HttpRequest, ids: &AtomicI64) -> Reply {
    let mut body: serde_json::Value =
        serde_json::from_slice(request.body.as_deref().unwrap_or(b"{}")).unwrap();
    body["id"] = ids.fetch_add(1, Ordering::Relaxed).into();
    Reply::Respond(Ok(HttpResponse::json(201, &body)))
}

pub fn client(transport: Arc<FakeTransport>) -> ApiClient {
    client_with(transport, MockStore::seeded(), SessionStore::in_memory())
}

pub fn client_with(transport: Arc<FakeTransport>, store: MockStore, session: SessionStore) -> ApiClient {
    ApiClient::new(transport, Arc::new(store), Arc::new(session))
}
