//! Document lifecycle events and the triggers that react to them.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RecipeEvent`] -- a recipe document was created or deleted.
//! - [`CountTrigger`] -- background subscriber maintaining the denormalized
//!   collection count.

pub mod bus;
pub mod triggers;

pub use bus::{EventBus, RecipeEvent, RecipeEventKind};
pub use triggers::CountTrigger;
