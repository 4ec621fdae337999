//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - the chat history sent by the web client on every request
//! - openai style messages/tools, sent from the agent to the LLM
//! - the normalized articles returned to the client and fed back to the LLM
//!
//! We always immediately convert those data models into the internal structs
//! using to/from helpers, so the internal models do not exactly match any of them.
pub mod article;
pub mod message;
pub mod role;
pub mod tool;
