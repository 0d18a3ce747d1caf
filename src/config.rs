use log::LevelFilter;
use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

#[derive(Debug)]
pub struct Config {
    host: IpAddr,
    port: u16,
    log_level: LevelFilter,
}

mod trace_env {
    pub const HOST: &str = "REQUEST_TRACE_HOST";
    pub const PORT: &str = "REQUEST_TRACE_PORT";
    pub const LOG_LEVEL: &str = "REQUEST_TRACE_LOG_LEVEL";

    pub const REQUIRED_PARAMS: [&str; 2] = [HOST, PORT];
}

impl Config {
    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn from_env() -> Result<Self, ConfigParsingError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigParsingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw_config = HashMap::new();
        for &param_name in trace_env::REQUIRED_PARAMS.iter() {
            let param_value = lookup(param_name)
                .ok_or_else(|| ConfigParsingError::MissingParameter(param_name.to_string()))?;
            raw_config.insert(param_name, param_value);
        }

        let host = parse_param(&raw_config[trace_env::HOST], trace_env::HOST, "ip address")?;
        let port = parse_param(&raw_config[trace_env::PORT], trace_env::PORT, "u16")?;
        let log_level = match lookup(trace_env::LOG_LEVEL) {
            Some(level) => parse_param(&level, trace_env::LOG_LEVEL, "log level")?,
            None => LevelFilter::Trace,
        };

        Ok(Config {
            host,
            port,
            log_level,
        })
    }
}

fn parse_param<T: std::str::FromStr>(
    value: &str,
    param_name: &str,
    expected: &str,
) -> Result<T, ConfigParsingError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigParsingError::InvalidParameterType {
            param_name: param_name.to_string(),
            expected: expected.to_string(),
        })
}

#[derive(Error, Debug)]
pub enum ConfigParsingError {
    #[error("invalid type of parameter {param_name:?}, expected {expected:?}")]
    InvalidParameterType {
        param_name: String,
        expected: String,
    },

    #[error("missing parameter {0:?}")]
    MissingParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_from_lookup() {
        let vars = [
            ("REQUEST_TRACE_HOST", "127.0.0.1"),
            ("REQUEST_TRACE_PORT", "3000"),
            ("REQUEST_TRACE_LOG_LEVEL", "debug"),
        ];
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level(), LevelFilter::Debug);

        let config = Config::from_lookup(lookup(&vars[..2])).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Trace);
    }

    #[test]
    fn test_from_lookup_errors() {
        let missing_port = [("REQUEST_TRACE_HOST", "127.0.0.1")];
        let err = Config::from_lookup(lookup(&missing_port)).unwrap_err();
        assert_eq!(err.to_string(), "missing parameter \"REQUEST_TRACE_PORT\"");

        let bad_port = [
            ("REQUEST_TRACE_HOST", "127.0.0.1"),
            ("REQUEST_TRACE_PORT", "99999"),
        ];
        let err = Config::from_lookup(lookup(&bad_port)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid type of parameter \"REQUEST_TRACE_PORT\", expected \"u16\""
        );

        let bad_host = [
            ("REQUEST_TRACE_HOST", "localhost"),
            ("REQUEST_TRACE_PORT", "3000"),
        ];
        assert!(matches!(
            Config::from_lookup(lookup(&bad_host)),
            Err(ConfigParsingError::InvalidParameterType { .. })
        ));
    }
}
