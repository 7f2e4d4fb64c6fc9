pub mod shrink_search;
pub use shrink_search::solve_challenge;
