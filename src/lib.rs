#![warn(missing_docs)]
//! GenStudio - prompt-to-image generation with a bounded local history.
//!
//! A [`Session`] takes a prompt, a [`StyleDescriptor`] and an [`AspectRatio`],
//! asks an [`ImageProvider`] for an image, and keeps the last
//! [`HISTORY_CAPACITY`] results in a persisted [`History`].
//!
//! # Quick Start
//!
//! ```no_run
//! use genstudio::{find_style, AspectRatio, GeminiProvider, JsonFileStore, Session};
//!
//! #[tokio::main]
//! async fn main() -> genstudio::Result<()> {
//!     let provider = GeminiProvider::builder().build()?;
//!     let store = JsonFileStore::open_default()?;
//!     let mut session = Session::new(provider, store);
//!
//!     let style = find_style("oil-painting").expect("built-in style");
//!     session
//!         .submit("a red fox in snow", style, AspectRatio::Landscape)
//!         .await;
//!
//!     if let Some(image) = session.current() {
//!         session.download(image, image.download_filename()).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `genstudio` command-line front end.

pub mod catalog;
mod error;
pub mod history;
pub mod image;
pub mod session;

#[cfg(feature = "cli")]
#[doc(hidden)]
pub mod shell;

// Re-export error types at crate root
pub use error::{FailureKind, Result, StudioError};

pub use catalog::{default_style, find_style, StyleDescriptor, EXAMPLE_PROMPT, STYLES};
pub use history::{
    GeneratedImageRecord, History, HistoryPersistence, JsonFileStore, MemoryStore,
    HISTORY_CAPACITY,
};
pub use image::providers::{extract_image, GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use image::{AspectRatio, GenerationRequest, ImageFormat, ImageProvider, ImageResource};
pub use session::{GenerationTicket, Session, SessionState, SubmitOutcome};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{default_style, find_style, StyleDescriptor};
    pub use crate::error::{FailureKind, Result, StudioError};
    pub use crate::history::{GeneratedImageRecord, HistoryPersistence, JsonFileStore};
    pub use crate::image::providers::GeminiProvider;
    pub use crate::image::{AspectRatio, ImageProvider, ImageResource};
    pub use crate::session::{Session, SessionState, SubmitOutcome};
}
