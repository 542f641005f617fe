//! Browser implementations of the page capability traits

pub mod chromium;
#[cfg(test)]
pub(crate) mod fake;

pub use chromium::{ChromiumLauncher, ChromiumPage};
