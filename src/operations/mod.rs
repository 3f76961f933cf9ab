pub mod add;
pub mod analysis;
pub mod balance;
pub mod category;
pub mod chart;
pub mod import;
pub mod limit;
pub mod remove;
pub mod search;
pub mod sort;
