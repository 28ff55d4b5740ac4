pub mod neighbor_index;
pub mod point_set;
pub mod zero_mean;
