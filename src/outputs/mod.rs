//! Output generation for a [`NewsDigest`](crate::models::NewsDigest).
//!
//! # Submodules
//!
//! - [`markdown`]: Renders the digest for the terminal
//! - [`json`]: Writes the digest to a dated JSON file
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── technology.json
//!     └── climate-change.json
//! ```

pub mod json;
pub mod markdown;
