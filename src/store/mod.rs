//! The synchronized store: index, write-back mutations, change fan-out.

mod error;
mod events;
mod task_store;

pub use error::{StoreError, StoreResult};
pub use events::ChangeBroadcaster;
pub use task_store::TaskStore;
