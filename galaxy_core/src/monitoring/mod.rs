pub mod system;

pub use system::{SystemMonitor, SystemSnapshot};
