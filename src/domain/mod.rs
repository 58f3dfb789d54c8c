//! src/domain/mod.rs
mod address;
pub use address::{Address, Error as AddressError};

mod content;
pub use content::{Body, ContentError, Subject};

mod sender;
pub use sender::{NameError, Sender, SenderError, SenderName};
