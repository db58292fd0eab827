//! cview types - cluster summary data model
//!
//! Entities served by the dashboard backend for the controller, the agent
//! fleet, feature gates and inter-node latency, plus the small display
//! helpers every presentation surface shares.

pub mod display;
pub mod list;
pub mod refs;
pub mod types;

pub use display::*;
pub use list::ResourceList;
pub use refs::K8sRef;
pub use types::*;
