// Utility modules

pub mod fetch;
pub mod resize;
pub mod temp_files;
