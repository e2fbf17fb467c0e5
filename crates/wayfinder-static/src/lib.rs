//! Static site builder for wayfinder documentation.
//!
//! Compiles page sources through layout templates, annotates every page's
//! headings and sidebar, and emits the stylesheet and runtime script assets.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
