// Adapters layer: concrete implementations for external systems (local files, gzip framing).

pub mod gzip;
pub mod storage;
