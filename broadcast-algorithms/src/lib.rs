pub const BUILD_TIME_PATH: &str = env!("CARGO_MANIFEST_DIR");

pub mod station_network;
pub use station_network as c001;
