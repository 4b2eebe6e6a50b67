//! Cargan - CAR/GAN container reading and extraction library.
//!
//! This crate provides a unified interface to the Cargan crates.
//!
//! # Crates
//!
//! - [`cargan_common`] - Common utilities (bounded binary reading, alignment)
//! - [`cargan_container`] - Container parsing, content cipher, extraction
//!
//! # Example
//!
//! ```no_run
//! use cargan::prelude::*;
//!
//! let container = Container::open("assets.gan")?;
//! let summary = extract_all(&container, "out", &ExtractOptions::default(), |event| {
//!     println!("{}", event.path().display());
//! })?;
//! println!("{} files written", summary.written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use cargan_common as common;
pub use cargan_container as container;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use cargan_common::BinaryReader;
    pub use cargan_container::{
        cipher, extract_all, Container, ExtractEvent, ExtractOptions, ExtractSummary,
        IndexTable, OutputRecord, RecordInfo, Variant,
    };
    #[cfg(feature = "parallel")]
    pub use cargan_container::extract_parallel;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
