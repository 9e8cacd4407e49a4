//! Runtime configuration.
//!
//! A process-wide [`Config`] lives behind an [`ArcSwap`]: reads are
//! lock-free, and [`configure`] replaces the whole value. A contract may pin
//! its own `Arc<Config>`, which then takes precedence for its invocations.

use std::fmt;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use axn_validator::BoxError;

use crate::context::Fields;
use crate::error::Exception;
use crate::provider::{Logger, TracingLogger};

/// Environment variable listing contract names whose debug lines are
/// promoted to info (comma separated). Read once, when a default [`Config`]
/// is built.
pub const DEBUG_TARGETS_ENV: &str = "AXN_DEBUG_TARGETS";

/// Hook receiving every intercepted exception and a filtered field snapshot.
pub type ExceptionHook = dyn Fn(&Exception, &Fields) -> Result<(), BoxError> + Send + Sync;

/// Hook wrapping every invocation; must call the closure to run the pipeline.
pub type AroundHook = dyn Fn(&str, &mut dyn FnMut()) + Send + Sync;

static GLOBAL: LazyLock<ArcSwap<Config>> = LazyLock::new(|| ArcSwap::from_pointee(Config::default()));

/// Collaborators and switches shared by invocations.
#[derive(Clone)]
pub struct Config {
    global_debug_logging: bool,
    debug_targets: Vec<String>,
    on_exception: Option<Arc<ExceptionHook>>,
    logger: Arc<dyn Logger>,
    around: Option<Arc<AroundHook>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global_debug_logging: false,
            debug_targets: std::env::var(DEBUG_TARGETS_ENV)
                .map(|targets| parse_targets(&targets))
                .unwrap_or_default(),
            on_exception: None,
            logger: Arc::new(TracingLogger),
            around: None,
        }
    }
}

impl Config {
    /// Default configuration: `tracing` logger, no hooks, debug targets
    /// taken from [`DEBUG_TARGETS_ENV`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote every debug line to info.
    pub fn with_global_debug_logging(mut self, enabled: bool) -> Self {
        self.global_debug_logging = enabled;
        self
    }

    /// Replace the contract names whose debug lines are promoted to info.
    pub fn with_debug_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.debug_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the exception hook. Its errors are logged and ignored.
    pub fn with_on_exception<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Exception, &Fields) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_exception = Some(Arc::new(hook));
        self
    }

    /// Set the logger.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Wrap every invocation, e.g. for metrics or spans.
    pub fn with_around<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &mut dyn FnMut()) + Send + Sync + 'static,
    {
        self.around = Some(Arc::new(hook));
        self
    }

    /// Whether every debug line is promoted.
    pub fn global_debug_logging(&self) -> bool {
        self.global_debug_logging
    }

    /// Contract names whose debug lines are promoted.
    pub fn debug_targets(&self) -> &[String] {
        &self.debug_targets
    }

    /// The exception hook, if set.
    pub fn on_exception(&self) -> Option<&ExceptionHook> {
        self.on_exception.as_deref()
    }

    /// The logger.
    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// The around hook, if set.
    pub fn around(&self) -> Option<&AroundHook> {
        self.around.as_deref()
    }

    /// Whether debug lines for `contract` are promoted to info.
    pub fn is_debug_target(&self, contract: &str) -> bool {
        self.global_debug_logging || self.debug_targets.iter().any(|t| t == contract)
    }
}

fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("global_debug_logging", &self.global_debug_logging)
            .field("debug_targets", &self.debug_targets)
            .field("on_exception", &self.on_exception.is_some())
            .field("around", &self.around.is_some())
            .finish()
    }
}

/// The current global configuration.
pub fn config() -> Arc<Config> {
    GLOBAL.load_full()
}

/// Update the global configuration.
///
/// `update` receives a copy of the current value; the result replaces it.
///
/// ```
/// axn::configure(|cfg| *cfg = cfg.clone().with_global_debug_logging(false));
/// assert!(!axn::config().global_debug_logging());
/// ```
pub fn configure(update: impl FnOnce(&mut Config)) {
    let mut next = Config::clone(&GLOBAL.load());
    update(&mut next);
    GLOBAL.store(Arc::new(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CaptureLogger;

    #[test]
    fn defaults() {
        let cfg = Config::new();
        assert!(!cfg.global_debug_logging());
        assert!(cfg.on_exception().is_none());
        assert!(cfg.around().is_none());
    }

    #[test]
    fn global_debug_promotes_everything() {
        let cfg = Config::new().with_global_debug_logging(true);
        assert!(cfg.is_debug_target("Anything"));
    }

    #[test]
    fn listed_targets_are_promoted() {
        let cfg = Config::new().with_debug_targets(["Charge", "Refund"]);
        assert!(cfg.is_debug_target("Charge"));
        assert!(cfg.is_debug_target("Refund"));
        assert!(!cfg.is_debug_target("Greet"));
        assert_eq!(cfg.debug_targets(), ["Charge", "Refund"]);
    }

    #[test]
    fn env_targets_are_trimmed() {
        assert_eq!(parse_targets(" Charge, Refund ,,"), vec!["Charge", "Refund"]);
        assert!(parse_targets("").is_empty());
    }

    #[test]
    fn builder_sets_collaborators() {
        let logger = Arc::new(CaptureLogger::new());
        let cfg = Config::new()
            .with_logger(logger.clone())
            .with_on_exception(|_, _| Ok(()))
            .with_around(|_, run| run());

        cfg.logger().log(crate::LogLevel::Info, "hello");
        assert_eq!(logger.lines().len(), 1);
        assert!(cfg.on_exception().is_some());
        assert!(format!("{cfg:?}").contains("around: true"));
    }

    #[test]
    fn configure_replaces_global() {
        let before = config();
        configure(|cfg| *cfg = cfg.clone().with_global_debug_logging(true));
        assert!(config().global_debug_logging());
        configure(|cfg| *cfg = Config::clone(&before));
        assert!(!config().global_debug_logging());
    }
}
