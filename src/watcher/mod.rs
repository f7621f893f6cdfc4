//! Filesystem watch with debounced wholesale reload.
//!
//! ```text
//! notify thread -> mpsc channel -> watch task
//!                                    |  qualifying event: reset Debouncer
//!                                    |  burst quiesced: store.load() + publish
//! ```

mod debouncer;
mod error;
mod watch;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use watch::WatchHandle;
