pub mod error;
pub mod merge;
pub mod report;
pub mod scoring;
pub mod sink;
pub mod sources;
pub mod summary;
