pub mod cli;
pub mod config;
pub mod gate;
pub mod generator;
pub mod llm;
pub mod media;

// Re-export commonly used types
pub use config::Config;
pub use gate::ResourceGate;
pub use generator::workflow::launch;
