//! Workflow stages for one document conversion.
//!
//! Each submodule implements exactly one step of the protocol and is driven
//! in order by [`crate::convert::Converter`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ poll ──▶ resolve
//! (bytes)   (slot,PUT, (GET     (artifact or
//!            register)  /task)   inline text)
//! ```
//!
//! 1. [`input`]: read a local file or buffer, infer its MIME type, enforce
//!    size limits
//! 2. [`upload`]: request a storage slot, PUT the bytes, register the task
//! 3. [`poll`]: fixed-cadence status checks until the task is terminal
//! 4. [`resolve`]: fetch the persisted artifact, falling back to the inline
//!    result

pub mod input;
pub mod poll;
pub mod resolve;
pub mod upload;
