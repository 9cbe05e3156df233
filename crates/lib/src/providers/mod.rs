pub mod metadata;
pub mod vision;
