pub mod due;
pub mod enqueue;
pub mod preview;
pub mod remove;
pub mod review;
pub mod stats;
