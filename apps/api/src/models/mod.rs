pub mod job;
pub mod matching;
pub mod resume;
pub mod sentinel;
