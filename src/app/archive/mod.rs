//! Zip bundle codec
//!
//! Outgoing bundles are built from a workspace minus the paths matched by the
//! exercise's exclusion patterns; incoming bundles are expanded into a folder
//! or a temporary staging directory. Both sides work on plain `std::fs` since
//! every call happens between two awaited network requests.

pub mod extractor;
pub mod filter;
pub mod packager;

pub use extractor::{extract_bundle, ExtractTarget};
pub use filter::{posix_path, PathFilter};
pub use packager::{format_size, pack_directory, BundleOutput, PackReport};
