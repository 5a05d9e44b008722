use futures::lock::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::Result;

use super::{definition::AbstractFileStore, Attachment};

/// File store keeping everything in memory
#[derive(Default, Clone)]
pub struct DummyFileStore {
    pub files: Arc<Mutex<HashMap<String, Attachment>>>,
}

#[async_trait]
impl AbstractFileStore for DummyFileStore {
    /// Keep the attachment in memory under an opaque URL
    async fn store(&self, attachment: &Attachment) -> Result<String> {
        let url = format!("memory://files/{}", ulid::Ulid::new());

        let mut files = self.files.lock().await;
        files.insert(url.clone(), attachment.clone());

        Ok(url)
    }
}
