//! Shared constants for things
//!

/// Default base URL for the Gemini REST API.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default model used for both the description and generation calls.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

/// Sampling temperature for the description-extraction call.
pub const DESCRIPTION_TEMPERATURE: f32 = 0.2;

/// Token cap for the description-extraction call.
pub const DESCRIPTION_MAX_TOKENS: u32 = 800;

/// Sampling temperature for the styled-generation call.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Token cap for the styled-generation call.
pub const GENERATION_MAX_TOKENS: u32 = 1500;

/// Filename offered for the CSV history download.
pub const CSV_DOWNLOAD_FILENAME: &str = "image_text_results.csv";
