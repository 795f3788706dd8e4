//! Subtitle retrieval for streaming platforms.
//!
//! The crate is split into the collaborator seams shared by every platform
//! (HTTP session, credential store, file transport, converter) and the
//! platform adapters themselves. Viki is the only adapter so far.

pub mod convert;
pub mod credentials;
pub mod error;
pub mod language;
pub mod options;
pub mod session;
pub mod subtitle;
pub mod transport;
pub mod utils;
pub mod viki;

pub use convert::SubtitleFormat;
pub use error::SubtitleError;
pub use language::RequestedLanguages;
pub use options::DownloadOptions;
