pub const BUILD_TIME_PATH: &str = env!("CARGO_MANIFEST_DIR");
pub const QUALITY_PRECISION: i32 = 1_000_000;

mod union_find;
pub use union_find::UnionFind;
pub mod station_network;
pub use station_network as c001;
