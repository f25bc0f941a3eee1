// Configuration loading
//
// Settings are resolved once at startup from secret files and environment
// variables.

pub mod settings;

pub use settings::{SecretResolver, Settings};
