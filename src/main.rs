use std::sync::Arc;

use estate_pro::config::{init_db, Config, NotifierConfig};
use estate_pro::modules::property::crud::PropertyCrud;
use estate_pro::services::jwt::JwtService;
use estate_pro::services::metrics::MetricsRegistry;
use estate_pro::services::notify::{
    EmailNotifier, LogNotifier, Notifier, Outbox, RetryConfig, VoiceNotifier,
};
use estate_pro::services::reminder::ReminderPoller;
use estate_pro::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OUTBOX_CAPACITY: usize = 1024;

fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    let transport: Arc<dyn Notifier> = match &config.notifier {
        NotifierConfig::Log => Arc::new(LogNotifier),
        NotifierConfig::Email {
            relay_url,
            api_key,
            from,
        } => Arc::new(EmailNotifier::new(relay_url.clone(), api_key.clone(), from.clone())),
        NotifierConfig::Voice {
            api_base,
            account_sid,
            auth_token,
            from_number,
            default_country_code,
        } => Arc::new(VoiceNotifier::new(
            api_base.clone(),
            account_sid.clone(),
            auth_token.clone(),
            from_number.clone(),
            default_country_code.clone(),
        )),
    };

    if config.notify_max_attempts <= 1 {
        return transport;
    }

    let retry = RetryConfig::new(config.notify_max_attempts, config.notify_retry_base_secs);
    let (outbox, _worker) = Outbox::spawn(transport, retry, OUTBOX_CAPACITY);
    tracing::info!(max_attempts = config.notify_max_attempts, "Notification outbox enabled");
    Arc::new(outbox)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_pro=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = init_db(&config.database_url).await?;
    tracing::info!("Connected to MySQL, migrations applied");

    let metrics = MetricsRegistry::new()?;
    let notifier = build_notifier(&config);
    tracing::info!(channel = %notifier.channel(), "Notifier ready");

    if config.reminder.enabled {
        let poller = ReminderPoller::new(
            Arc::new(PropertyCrud::new(db.clone())),
            notifier.clone(),
            config.reminder.clone(),
        )
        .with_metrics(metrics.clone());

        tokio::spawn(async move {
            poller.run().await;
        });
    } else {
        tracing::warn!("Verification reminder poller disabled");
    }

    let jwt_service = JwtService::new(config.jwt_secret.clone())
        .with_access_token_duration(chrono::Duration::hours(config.jwt_ttl_hours));

    let state = Arc::new(AppState {
        db,
        jwt_service,
        notifier,
        metrics,
        otp: config.otp.clone(),
        require_verified_login: config.require_verified_login,
        auth_rate_burst: config.auth_rate_burst,
    });

    let app = estate_pro::create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
