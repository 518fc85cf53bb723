pub mod joint;
pub mod reconstruct;

pub use joint::{proportions, Joint, JOINT_PAIRS};
pub use reconstruct::{Pose3D, RelDepthOrder, REL_ORDER_LEN};
