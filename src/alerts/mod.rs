//! Security anomaly detection

pub mod detector;

pub use detector::{
    capture_modem_address, detect_gateway_spoofing, is_gateway_ip, is_spoofing_gateway,
    spoofing_suspects,
};
