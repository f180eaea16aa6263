// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod cli;
pub mod config;
pub mod driver;
pub mod export;
pub mod extract;
pub mod listings;
pub mod logger;
pub mod navigate;
pub mod pacing;
pub mod record;
pub mod run;
pub mod session;
pub mod sheets;

pub use driver::PageDriver;
pub use logger::{RunLogger, VerbosityLevel};
pub use record::{AgencyRecord, ReviewEntry, SearchParameters};
