// Server configuration, loaded from environment variables and CLI flags.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file.
    pub database_path: String,
    pub host: String,
    pub port: u16,
    /// Wall-clock limit for one grading run. Overruns are internal faults.
    pub grading_timeout: Duration,
}

impl Config {
    /// Environment variables:
    /// - `DATABASE_PATH` (default: `alien-invasion.db`)
    /// - `HOST` (default: `0.0.0.0`)
    /// - `PORT` (default: 3001)
    /// - `GRADING_TIMEOUT_MS` (default: 2000)
    ///
    /// CLI flags:
    /// - `--port <PORT>` overrides `PORT`
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = env("DATABASE_PATH").unwrap_or_else(|| "alien-invasion.db".into());
        let host = env("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(3001);

        let grading_timeout = env("GRADING_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(2));

        Config {
            database_path,
            host,
            port,
            grading_timeout,
        }
    }

    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
