pub mod gemini;

pub use gemini::{GeminiClient, FALLBACK_MESSAGE};
