pub mod analysis;
pub mod backend;
pub mod resume;
