//! Update dispatching: converts teloxide messages to core messages and runs the HandlerChain
//! for each one in its own task. Updates arrive by long polling or, when a webhook URL is
//! configured, through an axum route served next to the health endpoint.

use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use hooty_core::{Bot as CoreBot, HandlerResponse, Message as CoreMessage, ToCoreMessage};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::dispatching::ShutdownToken;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;
use crate::config::UpdateMode;
use crate::health;

/// Shared state handed to every update: the handler chain and the transport used for replies.
#[derive(Clone)]
pub struct UpdateContext {
    pub chain: HandlerChain,
    pub bot: Arc<dyn CoreBot>,
}

impl UpdateContext {
    pub fn new(chain: HandlerChain, bot: Arc<dyn CoreBot>) -> Self {
        Self { chain, bot }
    }
}

/// Runs the handler chain for one message. A `Reply` response is sent back to the chat;
/// chain and send errors are logged, never propagated.
#[instrument(skip(ctx, message), fields(chat_id = message.chat.id, message_id = %message.id))]
pub async fn handle_core_message(ctx: UpdateContext, message: CoreMessage) {
    debug!("step: processing message (handler chain started)");
    match ctx.chain.handle(&message).await {
        Ok(HandlerResponse::Reply(text)) => {
            if let Err(e) = ctx.bot.reply_to(&message, &text).await {
                error!(error = %e, "Failed to send reply");
            }
        }
        Ok(_) => {}
        Err(e) => {
            error!(error = %e, user_id = message.user.id, "Handler chain failed");
        }
    }
}

async fn on_message(msg: Message, ctx: UpdateContext) -> ResponseResult<()> {
    let core_msg = TelegramMessageWrapper(&msg).to_core();
    // Return right away so a long generation never blocks the next update.
    tokio::spawn(handle_core_message(ctx, core_msg));
    Ok(())
}

/// Starts the health server on `port` and dispatches updates until SIGINT/SIGTERM.
///
/// In webhook mode the webhook is registered with Telegram and its route shares the health
/// listener. The health server is shut down after the dispatcher has stopped.
#[instrument(skip(bot, ctx))]
pub async fn run_dispatcher(
    bot: teloxide::Bot,
    ctx: UpdateContext,
    mode: UpdateMode,
    port: u16,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;
    info!(%addr, "Health server listening");

    let handler = Update::filter_message().endpoint(on_message);
    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![ctx])
        .default_handler(|upd| async move {
            debug!(update_id = ?upd.id, "Unhandled update");
        })
        .build();
    spawn_shutdown_on_signal(dispatcher.shutdown_token());

    match mode {
        UpdateMode::Polling => {
            let (stop_tx, stop_rx) = oneshot::channel::<()>();
            let server = tokio::spawn(serve(listener, health::router(), async move {
                let _ = stop_rx.await;
            }));

            info!("step: starting long polling");
            dispatcher.dispatch().await;

            let _ = stop_tx.send(());
            server.await.context("Health server task panicked")??;
        }
        UpdateMode::Webhook { url } => {
            info!(%url, "step: registering webhook");
            let (update_listener, stop_flag, webhook_router) =
                webhooks::axum_to_router(bot, webhooks::Options::new(addr, url))
                    .await
                    .context("Failed to register webhook with Telegram")?;
            let app = health::router().merge(webhook_router);
            let server = tokio::spawn(serve(listener, app, stop_flag));

            dispatcher
                .dispatch_with_listener(
                    update_listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;

            server.await.context("HTTP server task panicked")??;
        }
    }

    info!("Bot stopped");
    Ok(())
}

async fn serve(
    listener: TcpListener,
    app: axum::Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;
    info!("HTTP server stopped");
    Ok(())
}

fn spawn_shutdown_on_signal(token: ShutdownToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        match token.shutdown() {
            Ok(stopped) => {
                stopped.await;
                info!("Dispatcher shut down");
            }
            Err(e) => warn!(error = %e, "Dispatcher was not running at shutdown"),
        }
    });
}

/// Waits for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
