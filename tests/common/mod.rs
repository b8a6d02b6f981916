#![allow(dead_code)]

use lfsapi::services::logger::{LogLevel, Logger};
use lfsapi::{Client, Env, MapEnv};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn env(pairs: &[(&str, &str)]) -> Arc<dyn Env> {
    Arc::new(pairs.iter().copied().collect::<MapEnv>())
}

pub fn client(os: &[(&str, &str)], git: &[(&str, &str)]) -> Client {
    Client::with_logger(env(os), env(git), Logger::with_level("test", LogLevel::Error))
        .expect("client")
}
