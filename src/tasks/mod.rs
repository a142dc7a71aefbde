//! Background Tasks Module

pub mod cleanup;

pub use cleanup::spawn_cleanup_task;
