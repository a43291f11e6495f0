pub mod aggregator;
pub mod collector;
pub mod github;
pub mod pagination;
pub mod renderer;
pub mod resolver;
