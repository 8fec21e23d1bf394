//! Identity and error primitives shared by the stockroom crates.
//!
//! Nothing in here touches files or the clock.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{IdAllocator, ItemId};
