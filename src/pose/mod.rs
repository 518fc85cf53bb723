#[cfg(feature = "desktop")]
pub mod detector;
pub mod keypoint;
#[cfg(feature = "desktop")]
pub mod pipeline;
#[cfg(feature = "desktop")]
pub mod preprocess;

#[cfg(feature = "desktop")]
pub use detector::PoseDetector;
pub use keypoint::{best_candidate, CocoPart, Keypoint, PoseCandidate};
#[cfg(feature = "desktop")]
pub use pipeline::CameraPipeline;
#[cfg(feature = "desktop")]
pub use preprocess::preprocess_frame;
