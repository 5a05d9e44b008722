use std::ops::Deref;

use self::definition::AbstractDispatcher;

pub mod definition;

mod dummy;
mod smtp;

pub use dummy::{DummyDispatcher, Mail};
pub use smtp::{SmtpDispatcher, SmtpSettings};

#[derive(Clone)]
pub enum Dispatcher {
    Dummy(DummyDispatcher),
    Smtp(smtp::SmtpDispatcher),
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::Dummy(DummyDispatcher::default())
    }
}

impl Deref for Dispatcher {
    type Target = dyn AbstractDispatcher;

    fn deref(&self) -> &Self::Target {
        match self {
            Dispatcher::Dummy(dummy) => dummy,
            Dispatcher::Smtp(smtp) => smtp,
        }
    }
}
