pub mod advisor;

pub use advisor::ShardKeyAdvisor;
