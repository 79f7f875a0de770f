//! Request builders and body readers for driving a router with `oneshot`.

use axum::body::{Body, to_bytes};
use axum::http::{
    Request, Response,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;

use crate::auth::MockAuth;

/// Build a request, optionally authenticated and with a JSON body.
pub fn request(
    method: &str,
    uri: &str,
    auth: Option<&MockAuth>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth.bearer());
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    }
}

/// Read a response body as JSON. Panics on non-JSON bodies.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Read a response body as UTF-8 text.
pub async fn text_body(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
