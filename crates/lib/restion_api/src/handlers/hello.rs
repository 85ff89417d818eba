//! Root endpoint.

/// `GET /` — plain-text liveness greeting.
pub async fn hello_world() -> &'static str {
    "Hello World!"
}
