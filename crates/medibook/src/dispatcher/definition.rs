use serde_json::Value;

use crate::{config::Template, Success};

#[async_trait]
pub trait AbstractDispatcher: std::marker::Sync + Send {
    /// Attempt one delivery of `template` to every recipient
    ///
    /// A single best-effort attempt per recipient, no retries. Whether a
    /// failure reaches the caller is the caller's policy: code issuance
    /// propagates it, lifecycle notifications log and move on.
    async fn send(&self, to: &[String], template: &Template, variables: Value) -> Success;
}
