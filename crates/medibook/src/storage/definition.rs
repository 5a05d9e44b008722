use crate::Result;

use super::Attachment;

#[async_trait]
pub trait AbstractFileStore: std::marker::Sync {
    /// Persist an attachment and return its public URL
    ///
    /// Callers must validate the attachment and invoke this before any
    /// state mutation is committed, so a failed upload aborts cleanly.
    async fn store(&self, attachment: &Attachment) -> Result<String>;
}
