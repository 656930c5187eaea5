pub mod context;
pub mod records;
pub mod render;
