//! Network module - device inference from hardware addresses

mod vendor;

pub use vendor::{guess_device, oui_prefix, UNKNOWN_DEVICE};
