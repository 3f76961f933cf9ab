pub mod transaction;
pub mod user;
