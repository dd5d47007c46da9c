pub mod email;
pub mod runtime_config;
pub mod sandbox;
