pub mod aoi;
pub mod handler;
pub mod planner;
pub mod ranker;
pub mod renderer;
pub mod stac;
