//! Lingo core library: LINE webhook relay that translates incoming text through a hosted
//! LLM and replies with the result. Used by the `lingo` CLI.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod llm;
pub mod signature;
pub mod translate;
