//! Wire framing for the Tightbeam optical link (spec.md §4.4, §6).
//!
//! Three frame kinds (`Meta`, `Sync`, `Symbol`), each rendering to a
//! single ASCII string sized for one QR code. This crate only knows how
//! to turn a [`Frame`] into a string and back; sync-lock discipline lives
//! in `tightbeam-session`, and the fountain code itself lives in
//! `tightbeam-core`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod frame;

pub use error::FrameError;
pub use frame::Frame;
