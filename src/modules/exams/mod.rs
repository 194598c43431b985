pub mod controller;
pub mod filter;
pub mod router;
pub mod service;

pub use router::init_exams_router;
