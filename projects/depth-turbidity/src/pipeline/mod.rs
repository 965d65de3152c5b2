// Depth profiling pipeline: planning, per-frame analysis, series and viewer drivers

pub mod analyzer;
pub mod planner;
pub mod series;
pub mod viewer;
