//! Application services.

mod alert_queue;

pub use alert_queue::AlertQueue;
