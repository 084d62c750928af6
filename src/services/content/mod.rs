pub mod fallback;
pub mod normalizer;
pub mod prompts;
pub mod validator;
