//! Document models shared by the repositories, services and HTTP layer.

pub mod buyer;
pub mod chat;
pub mod crop;
pub mod farm;
pub mod macros;

pub use buyer::*;
pub use chat::*;
pub use crop::*;
pub use farm::*;
