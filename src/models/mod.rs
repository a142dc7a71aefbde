//! Models Module
//!
//! Domain entity and response DTOs for the demo API.

mod responses;
mod student;

pub use responses::{
    ClearResponse, CounterResponse, HealthResponse, InvalidateResponse, StatsResponse,
};
pub use student::Student;
