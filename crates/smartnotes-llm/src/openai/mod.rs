// OpenAI-compatible chat completions (OpenAI, Groq, and other compatible hosts)

mod client;

pub use client::{OpenAIClient, OpenAIClientBuilder, GROQ_API_BASE, OPENAI_API_BASE};
