pub mod expenses;
pub mod manage;
