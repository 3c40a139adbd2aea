//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

use crate::constants::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "PICSTORY_DEBUG")]
    /// Enable debug logging. Env: PICSTORY_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "PICSTORY_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: PICSTORY_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "PICSTORY_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: PICSTORY_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, required = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    /// Gemini API key, read once at startup.
    /// Env: GEMINI_API_KEY
    pub gemini_api_key: String,
    #[clap(long, default_value = DEFAULT_GEMINI_MODEL, env = "GEMINI_MODEL")]
    /// Gemini model used for both description and generation calls.
    /// Env: GEMINI_MODEL
    pub gemini_model: String,
    #[clap(long, default_value = DEFAULT_GEMINI_API_BASE, env = "GEMINI_API_BASE")]
    /// Base URL for the Gemini API, override for testing.
    /// Env: GEMINI_API_BASE
    pub gemini_api_base: String,
}
