pub mod capture;
pub mod color;
pub mod detector;
pub mod filter;
pub mod params;
pub mod pipeline;
pub mod region;
pub mod sink;
