use crate::constants::env_keys;
use crate::services::env::Env;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    error: u64,
    warn: u64,
    info: u64,
    debug: u64,
}

/// Context-scoped stderr logger. Children share the parent's counters.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    counters: Arc<Mutex<Counters>>,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        let level = std::env::var(env_keys::LOG_LEVEL)
            .map(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Info);
        Self::with_level(context, level)
    }

    /// Reads the threshold from `env` instead of the live process environment.
    pub fn from_env(context: &str, env: &dyn Env) -> Self {
        let level = env
            .get(env_keys::LOG_LEVEL)
            .map(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Info);
        Self::with_level(context, level)
    }

    pub fn with_level(context: &str, level: LogLevel) -> Self {
        Self {
            context: context.to_string(),
            level,
            counters: Arc::new(Mutex::new(Counters::default())),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self {
            context,
            level: self.level,
            counters: self.counters.clone(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&serde_json::Value>) {
        if !self.enabled(level) {
            return;
        }
        {
            let mut counters = self.counters.lock().unwrap_or_else(|err| err.into_inner());
            match level {
                LogLevel::Error => counters.error += 1,
                LogLevel::Warn => counters.warn += 1,
                LogLevel::Info => counters.info += 1,
                LogLevel::Debug => counters.debug += 1,
            }
        }
        let meta_suffix = meta
            .filter(|m| !m.is_null())
            .map(|m| format!(" {}", m))
            .unwrap_or_default();
        eprintln!(
            "[{}] {} [{}] {}{}",
            chrono::Utc::now().to_rfc3339(),
            level.label(),
            self.context,
            message,
            meta_suffix
        );
    }

    pub fn error(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Debug, message, meta);
    }

    pub fn stats(&self) -> serde_json::Value {
        let counters = self.counters.lock().unwrap_or_else(|err| err.into_inner());
        serde_json::json!({
            "level": format!("{:?}", self.level).to_lowercase(),
            "context": self.context,
            "error": counters.error,
            "warn": counters.warn,
            "info": counters.info,
            "debug": counters.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{LogLevel, Logger};
    use crate::services::env::MapEnv;

    #[test]
    fn threshold_filters_and_children_share_counters() {
        let root = Logger::with_level("lfsapi", LogLevel::Warn);
        let child = root.child("client");
        child.warn("shown", None);
        child.debug("hidden", None);
        root.error("shown", Some(&serde_json::json!({"host": "a"})));

        let stats = root.stats();
        assert_eq!(stats["warn"], 1);
        assert_eq!(stats["error"], 1);
        assert_eq!(stats["debug"], 0);
        assert_eq!(child.stats()["context"], "lfsapi:client");
    }

    #[test]
    fn level_comes_from_env_source() {
        let env = MapEnv::new().with("LFS_LOG_LEVEL", "DEBUG");
        assert_eq!(Logger::from_env("x", &env).level(), LogLevel::Debug);
        assert_eq!(Logger::from_env("x", &MapEnv::new()).level(), LogLevel::Info);
        assert_eq!(LogLevel::parse("nonsense"), LogLevel::Info);
    }
}
