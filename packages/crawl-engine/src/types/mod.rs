pub mod job;
pub mod page;

pub use job::{Job, JobStatus};
pub use page::{CrawledPage, FetchedPage};
