//! `stockpilot-ai`
//!
//! **Responsibility:** the completion boundary and the stock analyst.
//!
//! The completion endpoint is an opaque text-completion function behind
//! [`CompletionClient`]. The analyst grounds every question in a fresh
//! aggregate snapshot, never lets the model answer from thin air, and
//! leaves an immutable audit record per invocation.

pub mod analyst;
pub mod chat;
pub mod client;

pub use analyst::{AnalystError, StockAnalyst, DAILY_SUMMARY_QUESTION};
pub use chat::{ChatMessage, Role};
pub use client::{CompletionClient, CompletionError, OpenAiChatClient};
