//! Receiver/sender orchestration for the Tightbeam optical link (spec.md
//! §4.5, §4.7).
//!
//! Ties `tightbeam-core`'s fountain code and `tightbeam-proto`'s wire
//! framing into the two operations an embedding application actually needs:
//! [`session::prepare_broadcast`] turns a payload into a playback list of
//! wire frames, and [`Session`] is the stateful receiver a capture pipeline
//! feeds one observed frame at a time.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod session;
pub mod status;
pub mod sync;

pub use error::SessionError;
pub use session::{prepare_broadcast, BroadcastPackage, BroadcastStats, Session, SessionOptions};
pub use status::Status;
pub use sync::{SyncConfig, SyncController, SyncEvent, SyncState};
