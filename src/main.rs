use clap::Parser;
use log::{error, info, LevelFilter};
use pool_notifier::bot::DEFAULT_EVENT_CAPACITY;
use pool_notifier::{
    forward_json_lines, parse_address, Command, NotificationHandle, NotifierError, Opt, Settings,
    SledSubscriptionRegistry, SubscriptionRegistry, TelegramService,
};
use std::process;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Info by default, RUST_LOG can still override per module
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt).await {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn open_service(settings: &Settings) -> Result<TelegramService, NotifierError> {
    let registry = SledSubscriptionRegistry::open(&settings.database_path)?;
    TelegramService::from_mode(settings.bot_mode(), Arc::new(registry))
}

async fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(opt.config.as_deref())?;

    match opt.command {
        Command::Run { events_stdin } => {
            let service = open_service(&settings)?;
            if !service.is_enabled() {
                return Ok(());
            }

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let poller = tokio::spawn({
                let service = service.clone();
                async move { service.run_polling(shutdown_rx).await }
            });

            if events_stdin {
                let (handle, receiver) = NotificationHandle::channel(DEFAULT_EVENT_CAPACITY);
                tokio::spawn({
                    let service = service.clone();
                    async move { service.run_events(receiver).await }
                });
                tokio::spawn(async move {
                    let stdin = BufReader::new(tokio::io::stdin());
                    match forward_json_lines(stdin, &handle).await {
                        Ok(count) => info!("Event input closed after {count} event(s)"),
                        Err(e) => error!("Failed to read events from stdin: {e}"),
                    }
                });
            }

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            let _ = shutdown_tx.send(true);
            poller.await?;
        }
        Command::NotifyBlock {
            address,
            height,
            message,
            block_hash,
        } => {
            let service = open_service(&settings)?;
            // a one-shot process has to wait, or exiting would cancel the sends
            let report = service
                .notify_block_found(&address, height, block_hash.as_deref(), &message)
                .await
                .settle()
                .await;
            println!(
                "Delivered: {}, failed: {}",
                report.delivered, report.failed
            );
        }
        Command::NotifyBestDiff {
            address,
            difficulty,
        } => {
            let service = open_service(&settings)?;
            let report = service
                .notify_best_difficulty(&address, difficulty)
                .await
                .settle()
                .await;
            println!(
                "Delivered: {}, failed: {}",
                report.delivered, report.failed
            );
        }
        Command::Subscriptions { address } => {
            let registry = SledSubscriptionRegistry::open(&settings.database_path)?;
            let subscriptions = registry.get_subscriptions(&address).await?;
            if subscriptions.is_empty() {
                println!("No subscriptions for {address}");
            }
            for subscription in subscriptions {
                println!(
                    "chat {} (since {})",
                    subscription.get_subscriber_id(),
                    subscription.get_created_at()
                );
            }
        }
        Command::Validate { address } => match parse_address(&address) {
            Some((network, kind)) => println!("{address}: {kind:?} on {network:?}"),
            None => return Err(NotifierError::InvalidAddress(address).into()),
        },
    }
    Ok(())
}
