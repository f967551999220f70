//! # hooty-handlers
//!
//! Handlers for the Hooty bot: [`HootyHandler`] (the `/hooty` image command),
//! [`DispatchGuard`] (drops redelivered messages) and [`LoggingHandler`].

mod dispatch_guard;
mod hooty_handler;
mod logging;

pub use dispatch_guard::{DedupKey, DispatchGuard, InMemoryDispatchGuard, DEFAULT_RETENTION};
pub use hooty_handler::{
    parse_command, HootyHandler, COMMAND, MSG_GENERATING, MSG_GENERATION_FAILED, MSG_USAGE,
    PROMPT_PREFIX,
};
pub use logging::LoggingHandler;
