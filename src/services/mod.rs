pub mod bulk;
pub mod chart;
pub mod logger;
pub mod normalizer;
pub mod pipeline;
pub mod tool_executor;
pub mod upstream;
pub mod validation;
