use clap::ValueEnum;
use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

struct StderrLogger;

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug | Level::Trace => "debug",
    }
}

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!(
            "[isaacpool] {}: {}",
            level_tag(record.level()),
            record.args()
        );
    }

    fn flush(&self) {}
}

pub fn init(level: LogLevel) {
    let _ = log::set_boxed_logger(Box::new(StderrLogger));
    log::set_max_level(level.to_level_filter());
}
