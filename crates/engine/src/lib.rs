pub mod config;
pub mod construct;
pub mod construct_pad;
pub mod determinism;
pub mod engine;
pub mod mistakes;
pub mod normalize;
pub mod quality;
pub mod sanitize;
pub mod sentences;
pub mod stopwords;
pub mod translation;
pub mod vocabulary;

pub use config::EngineConfig;
pub use engine::Engine;
