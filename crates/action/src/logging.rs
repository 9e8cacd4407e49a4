//! Per-contract log prefixing and debug promotion.

use crate::config::Config;
use crate::provider::LogLevel;

/// Logs through the configured [`Logger`](crate::Logger) as `[Name] message`.
///
/// Debug lines are emitted at info when the contract is a debug target.
#[derive(Clone, Copy)]
pub(crate) struct ContractLog<'a> {
    name: &'a str,
    config: &'a Config,
}

impl<'a> ContractLog<'a> {
    pub(crate) fn new(name: &'a str, config: &'a Config) -> Self {
        Self { name, config }
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        let level = match level {
            LogLevel::Debug if self.config.is_debug_target(self.name) => LogLevel::Info,
            other => other,
        };
        self.config
            .logger()
            .log(level, &format!("[{}] {message}", self.name));
    }

    pub(crate) fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub(crate) fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub(crate) fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::provider::CaptureLogger;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefixes_with_contract_name() {
        let logger = Arc::new(CaptureLogger::new());
        let config = Config::new().with_logger(logger.clone());
        ContractLog::new("Greet", &config).warn("careful");

        assert_eq!(logger.lines(), vec![(LogLevel::Warn, "[Greet] careful".to_owned())]);
    }

    #[test]
    fn promotes_debug_for_targets() {
        let logger = Arc::new(CaptureLogger::new());
        let config = Config::new()
            .with_logger(logger.clone())
            .with_global_debug_logging(true);
        let log = ContractLog::new("Greet", &config);
        log.debug("detail");
        log.info("plain");

        assert_eq!(logger.messages_at(LogLevel::Info), vec!["[Greet] detail", "[Greet] plain"]);
        assert!(logger.messages_at(LogLevel::Debug).is_empty());
    }

    #[test]
    fn promotes_only_listed_targets() {
        let logger = Arc::new(CaptureLogger::new());
        let config = Config::new()
            .with_logger(logger.clone())
            .with_debug_targets(["Charge"]);
        ContractLog::new("Charge", &config).debug("listed");
        ContractLog::new("Greet", &config).debug("unlisted");

        assert_eq!(logger.messages_at(LogLevel::Info), vec!["[Charge] listed"]);
        assert_eq!(logger.messages_at(LogLevel::Debug), vec!["[Greet] unlisted"]);
    }
}
