use clap::Parser;
use cf_core::source::{DEFAULT_COUNTRY, DEFAULT_KEYWORDS};
use cf_core::SearchQuery;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

const DURATION_TOO_LARGE: &str = "Duration is too large";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit_seconds = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit_seconds)
                    .and_then(|seconds| total_seconds.checked_add(seconds))
                    .ok_or_else(|| DURATION_TOO_LARGE.to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| DURATION_TOO_LARGE.to_string())?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageKind {
    Memory,
    Sqlite,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Memory => "memory",
            StorageKind::Sqlite => "sqlite",
        }
    }
}

/// Polls the Currents API for cybersecurity news and serves the stored articles.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Address the HTTP server binds to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Article store backend
    #[arg(long, env = "STORAGE", value_enum, default_value_t = StorageKind::Sqlite)]
    pub storage: StorageKind,

    /// Connection string for the sqlite backend (default sqlite://articles.db)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Currents API key, sent as the Authorization header
    #[arg(long, env = "CURRENTS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base url of the Currents API
    #[arg(long, env = "CURRENTS_ENDPOINT", default_value = cf_ingest::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value = DEFAULT_KEYWORDS)]
    pub keywords: String,

    #[arg(long, default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Time between ingestion cycles (e.g. 1d, 12h, 1h30m, 90)
    #[arg(long, env = "REFRESH_INTERVAL", default_value = "24h")]
    pub interval: HumanDuration,

    /// Upper bound on each upstream request; unbounded when unset
    #[arg(long)]
    pub fetch_timeout: Option<HumanDuration>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Run a single ingestion cycle, print its report and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            keywords: self.keywords.clone(),
            country: self.country.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("24h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert_eq!("1d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert_eq!("1h30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(5400));
        assert_eq!("1h 15m 30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
    }

    #[test]
    fn test_human_duration_rejects_garbage() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
        assert!("1h!".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_rejects_overflow() {
        assert!("999999999999999999d".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s1m".parse::<HumanDuration>().is_err());
        assert!("18446744073709551615s 1".parse::<HumanDuration>().is_err());
        assert_eq!(
            "18446744073709551615".parse::<HumanDuration>().unwrap().0,
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "cyberfeed",
            "--api-key", "key",
            "--port", "5000",
            "--interval", "24h",
            "--endpoint", cf_ingest::DEFAULT_ENDPOINT,
        ])
        .unwrap();

        assert_eq!(cli.storage, StorageKind::Sqlite);
        assert_eq!(cli.interval.0, Duration::from_secs(86400));
        assert_eq!(cli.search_query(), SearchQuery::default());
        assert_eq!(cli.listen_addr().port(), 5000);
        assert!(!cli.once);
        assert!(cli.fetch_timeout.is_none());
    }

    #[test]
    fn test_cli_sqlite_once() {
        let cli = Cli::try_parse_from([
            "cyberfeed",
            "--api-key", "key",
            "--storage", "sqlite",
            "--database-url", "sqlite://news.db",
            "--fetch-timeout", "30s",
            "--once",
        ])
        .unwrap();

        assert_eq!(cli.storage.as_str(), "sqlite");
        assert_eq!(cli.database_url.as_deref(), Some("sqlite://news.db"));
        assert_eq!(cli.fetch_timeout, Some(HumanDuration(Duration::from_secs(30))));
        assert!(cli.once);
    }

    #[test]
    fn test_cli_memory_storage_is_opt_in() {
        let cli = Cli::try_parse_from(["cyberfeed", "--api-key", "key", "--storage", "memory"]).unwrap();
        assert_eq!(cli.storage, StorageKind::Memory);
        assert_eq!(cli.storage.as_str(), "memory");
    }

    #[test]
    fn test_cli_rejects_unknown_storage() {
        let result = Cli::try_parse_from(["cyberfeed", "--api-key", "key", "--storage", "mongo"]);
        assert!(result.is_err());
    }
}
