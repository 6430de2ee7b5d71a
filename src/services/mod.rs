pub mod ai;
pub mod ai_types;
pub mod pipeline;
pub mod plan;
pub mod prompt;
pub mod rename;
pub mod sanitize;
pub mod scan;
pub mod settings;
pub mod worker;
