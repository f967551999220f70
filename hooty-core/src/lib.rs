//! # hooty-core
//!
//! Core types and traits for the Hooty bot: [`Bot`], [`Handler`], message and user types,
//! error types and tracing initialization. Transport-agnostic; used by handler-chain,
//! hooty-handlers and hooty-bot.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{HootyError, Result};
pub use logger::init_tracing;
pub use types::{Chat, Handler, HandlerResponse, Message, ToCoreMessage, ToCoreUser, User};
