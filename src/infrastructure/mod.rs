pub mod clock;
pub mod config;
pub mod error;
pub mod session_repository;
pub mod storage;
