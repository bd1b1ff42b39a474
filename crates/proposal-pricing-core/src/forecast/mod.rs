pub mod model;
pub mod projection;
pub mod scenarios;
pub mod summary;
