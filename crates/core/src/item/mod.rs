//! Upload items and their local preview handles.
//!
//! An [`UploadItem`] is the per-file unit of work tracked by the pipeline.
//! Its [`ItemStatus`] carries the data that only exists in a given state
//! (the remote key/URL once completed, the error message once errored), so
//! the "present iff" rules of the item lifecycle hold by construction.
//!
//! Legal transitions:
//!
//! ```text
//! Queued -> Uploading -> Completed
//!                     -> Errored -> Queued (explicit retry only)
//! ```

mod preview;
mod types;

pub use preview::{PreviewHandle, PreviewRegistry};
pub use types::{ExistingImage, ItemId, ItemStatus, UploadItem};
