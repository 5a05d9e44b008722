mod account;
mod appointment;
mod listing;
mod session;
mod verification;

pub use account::*;
pub use appointment::*;
pub use listing::*;
pub use session::*;
pub use verification::*;
