pub mod observability;
pub mod persistence;
pub mod queue;
pub mod storage;
