//! Tracing setup
//!
//! The subscriber is installed before configuration is resolved so that the
//! resolution's own warnings are logged. The `[logging]` level from the
//! config file is swapped in afterwards through a reload handle.

use hrp_common::config::defaults;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Build the subscriber and the handle that can replace its filter later
pub fn subscriber<W>(
    cli_level: Option<&str>,
    writer: W,
) -> (impl tracing::Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(initial_filter(cli_level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// Install the global subscriber; stdout carries command output, logs go to stderr
pub fn init(cli_level: Option<&str>) -> FilterHandle {
    let (subscriber, handle) = subscriber(cli_level, std::io::stderr);
    subscriber.init();
    handle
}

/// Priority: --log-level, then RUST_LOG, then the compiled default
fn initial_filter(cli_level: Option<&str>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(defaults::LOG_LEVEL)),
    }
}

/// The configured level only wins when neither --log-level nor RUST_LOG set one
pub fn configured_level<'a>(
    cli_level: Option<&str>,
    env_filter_set: bool,
    config_level: &'a str,
) -> Option<&'a str> {
    if cli_level.is_some() || env_filter_set {
        None
    } else {
        Some(config_level)
    }
}

/// Swap in the `[logging]` level once the config file has been read
pub fn apply_configured_level(handle: &FilterHandle, cli_level: Option<&str>, config_level: &str) {
    let env_filter_set = EnvFilter::try_from_default_env().is_ok();
    let Some(level) = configured_level(cli_level, env_filter_set, config_level) else {
        return;
    };

    match handle.reload(EnvFilter::new(level)) {
        Ok(()) => tracing::debug!("Log level set to {} from configuration", level),
        Err(e) => tracing::warn!("Could not apply configured log level {}: {}", level, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrp_common::config::{ConfigOverrides, TomlConfig};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_config_load_warning_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let captured = Captured::default();
        let (subscriber, _handle) = subscriber(Some("warn"), captured.clone());

        let config = tracing::subscriber::with_default(subscriber, || {
            TomlConfig::resolve(&ConfigOverrides {
                config_path: Some(path.clone()),
                ..Default::default()
            })
        });

        assert_eq!(config.logging.level, defaults::LOG_LEVEL);
        let output = captured.text();
        assert!(output.contains("Could not load config file"), "log was: {}", output);
        assert!(output.contains("using defaults"));
    }

    #[test]
    fn test_reloaded_level_takes_effect() {
        let captured = Captured::default();
        let (subscriber, handle) = subscriber(Some("warn"), captured.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("before reload");
            handle.reload(EnvFilter::new("debug")).unwrap();
            tracing::debug!("after reload");
        });

        let output = captured.text();
        assert!(!output.contains("before reload"));
        assert!(output.contains("after reload"));
    }

    #[test]
    fn test_configured_level_precedence() {
        assert_eq!(configured_level(None, false, "debug"), Some("debug"));
        assert_eq!(configured_level(Some("trace"), false, "debug"), None);
        assert_eq!(configured_level(None, true, "debug"), None);
    }
}
