use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the per-request transaction id
pub static TRANSACTION_ID: HeaderName = HeaderName::from_static("transactionid");

/// Generates a UUID v4 transaction id when the client did not send one
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeTransactionId;

impl MakeRequestId for MakeTransactionId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}
