use futures::lock::Mutex;
use serde_json::Value;
use std::sync::Arc;

use crate::{config::Template, Success};

use super::definition::AbstractDispatcher;

/// A recorded delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub variables: Value,
}

/// Dispatcher which records every attempt instead of delivering
#[derive(Default, Clone)]
pub struct DummyDispatcher {
    pub outbox: Arc<Mutex<Vec<Mail>>>,
}

#[async_trait]
impl AbstractDispatcher for DummyDispatcher {
    /// Record one attempt per recipient
    async fn send(&self, to: &[String], template: &Template, variables: Value) -> Success {
        let mut outbox = self.outbox.lock().await;
        for recipient in to {
            outbox.push(Mail {
                to: recipient.clone(),
                subject: template.title.clone(),
                variables: variables.clone(),
            });
        }

        Ok(())
    }
}
