pub mod state;

pub use state::{PoseSink, TrackerSet, TrackerSnapshot, TrackerState, TrackingStatus};
