//! Startup configuration from environment variables.
//!
//! | Variable     | Default   | Meaning                                   |
//! |--------------|-----------|-------------------------------------------|
//! | `HOST`       | `0.0.0.0` | IP address to bind                        |
//! | `PORT`       | `8080`    | TCP port to bind                          |
//! | `ACCESS_LOG` | `true`    | install the [`Logger`](crate::middleware::Logger) layer |
//!
//! `ACCESS_LOG` takes `true/false`, `yes/no`, `on/off` or `1/0`.
//! Read once at startup. Nothing in the dispatch path looks at it again.

use std::net::{IpAddr, SocketAddr};

use config::{ConfigError, Environment};
use serde::Deserialize;

use crate::error::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub access_log: bool,
}

/// The shape read from the environment, before the address is assembled.
#[derive(Debug, Deserialize)]
struct Settings {
    host: String,
    port: u16,
    access_log: bool,
}

impl Config {
    /// Reads `HOST`, `PORT` and `ACCESS_LOG` from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::load(Environment::default())
    }

    /// Same as [`from_env`](Config::from_env), but reads the given variables
    /// instead of the process environment.
    ///
    /// ```rust
    /// use switchyard::Config;
    ///
    /// let config = Config::from_vars([("PORT", "3000")]).unwrap();
    /// assert_eq!(config.addr.to_string(), "0.0.0.0:3000");
    /// ```
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self, Error>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(env: Environment) -> Result<Self, Error> {
        let settings: Settings = config::Config::builder()
            .add_source(env)
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("access_log", true)?
            .build()?
            .try_deserialize()?;

        let ip: IpAddr = settings.host.trim().parse().map_err(|e| {
            ConfigError::Message(format!("invalid HOST {:?}: {e}", settings.host))
        })?;

        Ok(Self {
            addr: SocketAddr::new(ip, settings.port),
            access_log: settings.access_log,
        })
    }
}
