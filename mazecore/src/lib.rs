pub mod algorithms;
pub mod dims;
pub mod disjoint_set;
pub mod driver;
pub mod grid;
pub mod progress;
