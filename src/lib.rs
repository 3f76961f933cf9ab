pub mod db;
pub mod error;
pub mod models;
pub mod operations;
pub mod session;
