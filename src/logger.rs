use log::{Record, Level, Metadata, LevelFilter, SetLoggerError};
#[macro_use]
pub mod macros {
    #[doc(alias = "log::error")]
    #[macro_export]
    macro_rules! log_error {
        ($($arg:tt)*) => {
            ::log::error!(target: ::deskio_core::LOG_TARGET, $($arg)*)
        };
    }
    #[doc(alias = "log::warn")]
    #[macro_export]
    macro_rules! log_warn {
        ($($arg:tt)*) => {
            ::log::warn!(target: ::deskio_core::LOG_TARGET, $($arg)*)
        };
    }
    #[doc(alias = "log::info")]
    #[macro_export]
    macro_rules! log_info {
        ($($arg:tt)*) => {
            ::log::info!(target: ::deskio_core::LOG_TARGET, $($arg)*)
        };
    }
    #[doc(alias = "log::debug")]
    #[macro_export]
    macro_rules! log_debug {
        ($($arg:tt)*) => {
            ::log::debug!(target: ::deskio_core::LOG_TARGET, $($arg)*)
        };
    }
}

struct SimpleLogger;

impl log::Log for SimpleLogger {
    #[inline]
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target() == deskio_core::LOG_TARGET
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = format!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
            if record.level() <= Level::Warn {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    }
    #[inline]
    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

/// Installe le logger de l'application.
///
/// En debug ou avec la feature `verbose`, tous les niveaux sont affichés.
/// Sinon, `level` est utilisé.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let level = if cfg!(debug_assertions) || cfg!(feature = "verbose") {
        LevelFilter::Trace
    } else {
        level
    };
    log::set_logger(&LOGGER).map(|_| log::set_max_level(level))
}
