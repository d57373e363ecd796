//! Client configuration.
//!
//! Values come from environment variables first, then command-line flags override them:
//!
//! | Env               | Flag             | Default                                 |
//! |-------------------|------------------|-----------------------------------------|
//! | `DBLP_NODES`      | `--node` (repeat)| `localhost:10000` .. `localhost:10005`  |
//! | `DBLP_TIMEOUT_MS` | `--timeout-ms`   | `10000`                                 |
//! | `DBLP_FRAMING`    | `--framing`      | `length` (`raw` for legacy nodes)       |
//! | `DBLP_TOTAL_CHUNKS` | `--total-chunks` | `117`                                 |
//! |                   | `--verbose`      | off                                     |

use std::time::Duration;

use crate::error::ConfigError;
use crate::query::dispatcher::DEFAULT_TOTAL_CHUNKS;
use crate::transport::Framing;
use crate::transport::connection::DEFAULT_REQUEST_TIMEOUT;
use crate::transport::Transport;

pub const DEFAULT_NODES: [&str; 6] = [
    "localhost:10000",
    "localhost:10001",
    "localhost:10002",
    "localhost:10003",
    "localhost:10004",
    "localhost:10005",
];

pub const USAGE: &str = "Usage: dblp_client [--node <host:port>]... [--timeout-ms <ms>] \
[--framing length|raw] [--total-chunks <n>] [--verbose]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Candidate storage nodes, in connection order.
    pub nodes: Vec<String>,
    /// Deadline for connecting and for every request/response exchange.
    pub request_timeout: Duration,
    pub framing: Framing,
    /// Number of chunks in the whole dataset.
    pub total_chunks: usize,
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: DEFAULT_NODES.iter().map(|a| a.to_string()).collect(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            framing: Framing::default(),
            total_chunks: DEFAULT_TOTAL_CHUNKS,
            verbose: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env_and_args() -> Result<Self, ConfigError> {
        Self::load(std::env::vars(), std::env::args().skip(1))
    }

    pub fn load<E, A>(env: E, args: A) -> Result<Self, ConfigError>
    where
        E: IntoIterator<Item = (String, String)>,
        A: IntoIterator<Item = String>,
    {
        let mut config = Self::default();

        for (key, value) in env {
            match key.as_str() {
                "DBLP_NODES" => config.nodes = split_nodes(&value),
                "DBLP_TIMEOUT_MS" => config.request_timeout = parse_timeout(&key, &value)?,
                "DBLP_FRAMING" => config.framing = parse_value(&key, &value)?,
                "DBLP_TOTAL_CHUNKS" => config.total_chunks = parse_value(&key, &value)?,
                _ => {}
            }
        }

        let mut cli_nodes: Vec<String> = Vec::new();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--verbose" | "-v" => config.verbose = true,
                "--node" | "--timeout-ms" | "--framing" | "--total-chunks" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(flag.clone()))?;
                    match flag.as_str() {
                        "--node" => cli_nodes.extend(split_nodes(&value)),
                        "--timeout-ms" => config.request_timeout = parse_timeout(&flag, &value)?,
                        "--framing" => config.framing = parse_value(&flag, &value)?,
                        _ => config.total_chunks = parse_value(&flag, &value)?,
                    }
                }
                _ => return Err(ConfigError::UnknownFlag(flag)),
            }
        }

        if !cli_nodes.is_empty() {
            config.nodes = cli_nodes;
        }
        if config.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }

        Ok(config)
    }

    pub fn transport(&self) -> Transport {
        Transport::new(self.framing, self.request_timeout)
    }
}

fn split_nodes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_timeout(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let millis: u64 = parse_value(key, value)?;
    if millis == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_defaults_match_the_six_local_nodes() {
        let config = ClientConfig::load(env(&[]), args(&[])).unwrap();

        assert_eq!(config.nodes.len(), 6);
        assert_eq!(config.nodes[0], "localhost:10000");
        assert_eq!(config.nodes[5], "localhost:10005");
        assert_eq!(config.total_chunks, 117);
        assert_eq!(config.framing, Framing::LengthPrefixed);
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = ClientConfig::load(
            env(&[
                ("DBLP_NODES", "10.0.0.1:7000, 10.0.0.2:7000"),
                ("DBLP_TIMEOUT_MS", "250"),
                ("DBLP_FRAMING", "raw"),
                ("DBLP_TOTAL_CHUNKS", "42"),
                ("UNRELATED", "ignored"),
            ]),
            args(&[]),
        )
        .unwrap();

        assert_eq!(config.nodes, vec!["10.0.0.1:7000", "10.0.0.2:7000"]);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.framing, Framing::Raw);
        assert_eq!(config.total_chunks, 42);
    }

    #[test]
    fn test_flags_override_env() {
        let config = ClientConfig::load(
            env(&[("DBLP_NODES", "10.0.0.1:7000"), ("DBLP_FRAMING", "raw")]),
            args(&[
                "--node",
                "127.0.0.1:1",
                "--node",
                "127.0.0.1:2",
                "--framing",
                "length",
                "--verbose",
            ]),
        )
        .unwrap();

        assert_eq!(config.nodes, vec!["127.0.0.1:1", "127.0.0.1:2"]);
        assert_eq!(config.framing, Framing::LengthPrefixed);
        assert!(config.verbose);
    }

    #[test]
    fn test_missing_flag_value_is_an_error() {
        let result = ClientConfig::load(env(&[]), args(&["--timeout-ms"]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingValue("--timeout-ms".to_string())
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            ClientConfig::load(env(&[]), args(&["--timeout-ms", "soon"])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ClientConfig::load(env(&[]), args(&["--timeout-ms", "0"])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            ClientConfig::load(env(&[("DBLP_FRAMING", "carrier-pigeon")]), args(&[])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_flag_and_empty_node_list() {
        assert_eq!(
            ClientConfig::load(env(&[]), args(&["--bind"])).unwrap_err(),
            ConfigError::UnknownFlag("--bind".to_string())
        );
        assert_eq!(
            ClientConfig::load(env(&[("DBLP_NODES", " , ")]), args(&[])).unwrap_err(),
            ConfigError::NoNodes
        );
    }
}
