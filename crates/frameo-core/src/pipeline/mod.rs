//! Photo processing pipeline components.
//!
//! - **ignore**: `.frameoignore` rules
//! - **discovery**: Find photos in the input tree
//! - **channel**: Bounded queue between discovery and workers
//! - **decode** / **metadata**: Load pixels and EXIF from sources
//! - **geometry**: Auto-orient and fit to the frame
//! - **naming**: FAT32-safe output names
//! - **encode** / **embed**: Produce output bytes with curated EXIF
//! - **processor**: The per-file transform
//! - **pool**: Worker tasks draining the queue

pub mod channel;
pub mod decode;
pub mod discovery;
pub mod embed;
pub mod encode;
pub mod geometry;
pub mod ignore;
pub mod metadata;
pub mod naming;
pub mod pool;
pub mod processor;

// Re-exports for convenient access
pub use channel::{bounded_channel, WorkQueue};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{FileDescriptor, FileDiscovery};
pub use encode::OutputEncoder;
pub use ignore::IgnoreMatcher;
pub use metadata::SourceMetadata;
pub use pool::WorkerPool;
pub use processor::ImageTransformer;
