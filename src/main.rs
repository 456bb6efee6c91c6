use bias_sniper::config::{load_config, AppConfig, SecurityConfig, DEFAULT_CONFIG_PATH};
use bias_sniper::model::AssessmentRecord;
use bias_sniper::notifier::{self, Notifier};
use bias_sniper::provider::JsonFileProvider;
use bias_sniper::session::AnalysisSession;
use bias_sniper::storage::SqliteStorage;
use chrono::{Local, NaiveDate, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Bias-ratio samples echoed to the debug log for each security.
const LOG_TAIL_DAYS: usize = 5;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bias_sniper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let provider = JsonFileProvider::new(config.data_dir.clone());

    let storage = match SqliteStorage::new(&config.db_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    let notifier: Option<Box<dyn Notifier>> = match &config.notifier {
        Some(cfg) => match notifier::from_config(cfg) {
            Ok(n) => Some(n),
            Err(e) => {
                error!("Failed to initialize notifier: {:?}", e);
                return;
            }
        },
        None => None,
    };

    info!(
        "Watching {} securities from {} (monitor: {})",
        config.securities.len(),
        provider.data_dir().display(),
        config.monitor
    );

    loop {
        let today = Local::now().date_naive();
        let tasks: Vec<_> = config
            .securities
            .iter()
            .map(|sec| {
                process_security(
                    sec,
                    &provider,
                    storage.clone(),
                    notifier.as_deref(),
                    config.monitor,
                    today,
                )
            })
            .collect();
        join_all(tasks).await;

        let Some(interval) = config.check_interval_seconds else {
            info!("Single run finished.");
            break;
        };
        info!("Waiting {}s for the next check...", interval);
        sleep(Duration::from_secs(interval)).await;
    }
}

/// Loads one security, assesses its latest trading day, records the outcome
/// and alerts when monitoring is on. Failures are logged and swallowed so one
/// bad security never stops the others.
async fn process_security(
    sec: &SecurityConfig,
    provider: &JsonFileProvider,
    storage: Arc<Mutex<SqliteStorage>>,
    notifier: Option<&dyn Notifier>,
    monitor: bool,
    today: NaiveDate,
) {
    let label = sec.label();
    info!("Processing {}", label);

    let session = match AnalysisSession::load(provider, &sec.sid, sec.params(), today).await {
        Ok(s) => s,
        Err(e) => {
            warn!("{}: {}", label, e);
            return;
        }
    };
    let trade_date = session.trade_date();

    if let Ok(Some(prev)) = storage.lock().await.get_last_assessment(&sec.sid) {
        debug!(
            "{}: previous assessment {} on {} ({})",
            label, prev.direction, prev.trade_date, prev.reasons
        );
    }

    debug!("{}: closes {:?}", label, session.price_series(LOG_TAIL_DAYS));
    match session.configured_moving_average(LOG_TAIL_DAYS) {
        Ok(points) => debug!("{}: MA{} {:?}", label, sec.ma_window, points),
        Err(e) => warn!("{}: moving average unavailable: {}", label, e),
    }
    match session.bias_ratio_series(LOG_TAIL_DAYS) {
        Ok(points) => debug!("{}: bias ratios {:?}", label, points),
        Err(e) => warn!("{}: bias ratio unavailable: {}", label, e),
    }
    match session.evaluate() {
        Ok(checks) => debug!("{}: {:?}", label, checks),
        Err(e) => warn!("{}: rule evaluation failed: {}", label, e),
    }

    let result = match session.run_assessment() {
        Ok(r) => r,
        Err(e) => {
            warn!("{}: assessment failed: {}", label, e);
            return;
        }
    };
    let bias_ratio = match session.current_bias_ratio() {
        Ok(v) => v,
        Err(e) => {
            warn!("{}: {}", label, e);
            return;
        }
    };
    info!(
        "{} {}: {} (bias {:.2}%) {}",
        label,
        trade_date,
        result.direction,
        bias_ratio,
        result.reason_text()
    );

    let record = AssessmentRecord {
        sid: sec.sid.clone(),
        trade_date,
        direction: result.direction,
        reasons: result.reason_text(),
        bias_ratio,
        created_at: Utc::now(),
    };
    if let Err(e) = storage.lock().await.save_assessment(&record) {
        warn!("{}: DB save error: {:?}", label, e);
    }

    if !result.is_actionable() {
        return;
    }

    match session.best_four_point() {
        Ok(bfp) => info!(
            "{}: best four point {} {}",
            label,
            bfp.direction,
            bfp.reason_text()
        ),
        Err(e) => debug!("{}: best four point skipped: {}", label, e),
    }

    if !monitor {
        return;
    }
    let Some(notifier) = notifier else {
        return;
    };

    match storage.lock().await.is_notified(&sec.sid, trade_date) {
        Ok(true) => {
            info!("{}: already notified for {}", label, trade_date);
            return;
        }
        Ok(false) => {}
        Err(e) => {
            warn!("{}: notify check failed: {:?}", label, e);
            return;
        }
    }

    let Some(text) = result.alert_text(&label, trade_date) else {
        return;
    };
    if let Err(e) = notifier.notify(&text).await {
        warn!("{}: notification failed: {}", label, e);
    } else if let Err(e) = storage.lock().await.mark_notified(&sec.sid, trade_date) {
        warn!("{}: mark notified failed: {:?}", label, e);
    } else {
        info!("{}: notified and marked.", label);
    }
}
