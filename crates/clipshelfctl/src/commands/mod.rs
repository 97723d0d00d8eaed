pub mod add;
pub mod clear;
pub mod delete;
pub mod list;
