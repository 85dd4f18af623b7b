use std::sync::Arc;

use expense_bot::auth::AccessGuard;
use expense_bot::config::Config;
use expense_bot::extract::GeminiClient;
use expense_bot::ledger::SheetsLedger;
use expense_bot::pipeline::Processor;
use expense_bot::server::{WebhookState, webhook_routes};
use expense_bot::telegram::TelegramApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("💸 Expense Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.gemini_model);
    eprintln!(
        "   Webhook: http://0.0.0.0:{}/webhook/telegram",
        config.port
    );
    if config.allowed_users.is_empty() {
        eprintln!("   Warning: ALLOWED_USERS is empty — every update will be dropped");
    }

    let telegram = Arc::new(TelegramApi::new(config.telegram_token.clone()));
    let model = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let ledger = Arc::new(SheetsLedger::new(
        config.sheet_id.clone(),
        config.sheets_token.clone(),
    ));
    let guard = AccessGuard::new(config.allowed_users.clone());

    let processor = Arc::new(Processor::new(
        guard,
        model,
        ledger,
        telegram.clone(),
        telegram,
    ));

    let app = webhook_routes(WebhookState { processor });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
