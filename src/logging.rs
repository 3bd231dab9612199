use anyhow::{Context, Result};
use chrono::Local;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

// Console + timestamped file log, returns the log file path.
pub fn init_logging(log_dir: &Path, stem: &str) -> Result<PathBuf> {
    create_dir_all(log_dir)
        .with_context(|| format!("creating log dir {}", log_dir.display()))?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("{stem}_{ts}.log"));

    let config = ConfigBuilder::new().build();
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Info,
            config,
            File::create(&log_path)
                .with_context(|| format!("creating log file {}", log_path.display()))?,
        ),
    ])?;

    Ok(log_path)
}
