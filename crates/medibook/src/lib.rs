#[macro_use]
extern crate serde;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate nanoid;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_json;

#[cfg(feature = "database-mongodb")]
#[macro_use]
extern crate bson;

mod result;
pub use result::*;

pub mod config;
pub mod database;
pub mod dispatcher;
pub mod events;
pub mod guard;
pub mod r#impl;
pub mod models;
pub mod storage;
pub mod util;

#[cfg(test)]
pub mod test;

pub use config::Config;
pub use database::{Database, Migration};
pub use dispatcher::Dispatcher;
pub use events::MedibookEvent;
pub use guard::Identity;
pub use storage::FileStore;

use async_std::channel::Sender;
use config::Template;
use serde_json::Value;

/// Medibook state
#[derive(Default, Clone)]
pub struct Medibook {
    pub config: Config,
    pub database: Database,
    pub dispatcher: Dispatcher,
    pub storage: FileStore,
    pub event_channel: Option<Sender<MedibookEvent>>,
}

impl Medibook {
    pub async fn publish_event(&self, event: MedibookEvent) {
        if let Some(sender) = &self.event_channel {
            if let Err(err) = sender.send(event).await {
                error!("Failed to publish a Medibook event: {:?}", err);
            }
        }
    }

    /// Fire-and-forget notification dispatch
    ///
    /// Delivery runs on its own task; failure is logged and never reaches
    /// the caller, and nothing is retried. Code issuance deliberately does
    /// not go through here, it awaits the dispatcher and surfaces failure.
    pub async fn notify(&self, to: Vec<String>, template: &Template, variables: Value) {
        let dispatcher = self.dispatcher.clone();
        let template = template.clone();

        async_std::task::spawn(async move {
            if let Err(err) = dispatcher.send(&to, &template, variables).await {
                error!("Failed to dispatch a notification: {:?}", err);
            }
        });
    }
}
