pub mod config;
pub mod paths;
pub mod plan;
pub mod report;
pub mod scan;
pub mod script;
pub mod timestamp;
