//! Image generation providers.

mod gemini;

pub use gemini::{
    extract_image, GeminiModel, GeminiProvider, GeminiProviderBuilder, InlineData, ResponsePart,
    API_KEY_ENV_VARS, DEFAULT_BASE_URL,
};
