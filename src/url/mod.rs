//! URL handling module for sitevault
//!
//! This module provides frontier URL normalization, crawl scope filtering,
//! and deterministic archive path naming.

mod normalize;
mod safe_path;
mod scope;

pub use normalize::{normalize_url, resolve_and_normalize};
pub use safe_path::safe_path_for;
pub use scope::in_scope;
