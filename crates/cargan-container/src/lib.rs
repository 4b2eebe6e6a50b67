//! Reader and extractor for CAR/GAN chunked containers.
//!
//! A container packs several named payloads into one file:
//!
//! - a 16-byte header whose magic selects the variant (`CAR` plain, `GAN`
//!   ciphered) and declares the index entry count
//! - an index table mapping data chunk offsets to file names
//! - a data section of length-prefixed payloads, ended by a sentinel tag or
//!   by end of input
//!
//! All integers are little-endian and every variable-length field is padded
//! to a 4-byte boundary. Payloads of the ciphered variant are XORed with a
//! fixed key whose phase depends on the byte's position within the payload.
//!
//! # Example
//!
//! ```no_run
//! use cargan_container::Container;
//!
//! let container = Container::open("assets.gan")?;
//! println!("{} container", container.variant());
//!
//! for record in container.parse()? {
//!     let record = record?;
//!     println!("{}: {} bytes", record.name, record.data.len());
//! }
//! # Ok::<(), cargan_container::Error>(())
//! ```

pub mod chunk;
pub mod cipher;
mod container;
mod error;
pub mod extract;
mod header;
mod index;
mod record;

pub use container::{Container, Records};
pub use error::{Error, Result};
pub use extract::{extract_all, ExtractEvent, ExtractOptions, ExtractSummary};
#[cfg(feature = "parallel")]
pub use extract::extract_parallel;
pub use header::{ContainerHeader, Variant, HEADER_SIZE, MAGIC_CAR, MAGIC_GAN};
pub use index::{synthesized_name, IndexEntry, IndexTable};
pub use record::{OutputRecord, RecordInfo};
