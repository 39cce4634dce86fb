// HTTP routes
pub mod jobs;

pub use jobs::*;
