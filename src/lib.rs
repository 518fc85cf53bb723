#[cfg(feature = "desktop")]
pub mod camera;
pub mod config;
pub mod math;
pub mod pose;
pub mod pose3d;
pub mod server;
pub mod tracker;
pub mod vmt;
