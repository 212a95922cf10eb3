//! Pipeline entry points.
//!
//! - `fetch_all`: bounded concurrent extraction with completion-order results
//! - `run_pipeline`: the full discover → filter → dispatch → drain loop

pub mod fetch;
pub mod run;

pub use fetch::fetch_all;
pub use run::{RunStats, run_pipeline};
