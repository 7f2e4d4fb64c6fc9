pub mod nearest_station;
