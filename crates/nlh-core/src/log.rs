//! Dual terminal + file logging, initialized once at process start.

/// Initializes combined terminal (info) and file (debug) logging under `logs/`.
#[cfg(feature = "server")]
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Spawns a task that exits the process immediately on Ctrl+C.
///
/// Used by the hosting binary, which does not have long-running batches to
/// flush; the scheduler's pending timers are simply dropped.
#[cfg(feature = "server")]
pub fn shutdown_on_ctrlc() {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        log::warn!("interrupt received, shutting down");
        std::process::exit(0);
    });
}
