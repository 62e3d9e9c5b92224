// ── Domain model ──
//
// Canonical types shared by the loops, the control path and consumers.

pub mod profile_name;
pub mod sample;
pub mod state;

pub use profile_name::{MAX_PROFILE_NAME_LEN, ProfileName};
pub use sample::{MonitorUpdate, NetworkSample, Status, UNKNOWN_MARKER};
pub use state::ConnectionState;
