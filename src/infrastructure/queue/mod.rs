mod memory_queue;
mod pg_queue;
mod queue_factory;

pub use memory_queue::InMemoryWorkQueue;
pub use pg_queue::PgWorkQueue;
pub use queue_factory::WorkQueueFactory;
