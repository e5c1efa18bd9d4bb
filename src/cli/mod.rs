//! CLI argument parsing

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::ccv3::{Params, Query, QueryKey, RequestParams};
use crate::config::defaults;
use crate::error::{CcError, Result};

pub use commands::run;

/// Issue named Cloud Controller V3 requests
#[derive(Parser, Debug)]
#[command(name = "cfapi")]
#[command(version)]
#[command(about = "Issue named Cloud Controller V3 requests", long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Settings file (defaults to $CF_HOME/.cf/config.json)
    #[arg(long, global = true, env = "CFAPI_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue one named request and print the JSON result
    Request(RequestArgs),
    /// List the registered request names
    Routes,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Request name, e.g. GetRoles
    pub name: String,

    /// URI parameter, e.g. -p role_guid=abc
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Query parameter, e.g. -q space_guids=a,b
    #[arg(
        short = 'q',
        long = "query",
        value_parser = parse_key_value,
        conflicts_with = "raw"
    )]
    pub query: Vec<(String, String)>,

    /// JSON request body
    #[arg(short = 'd', long, conflicts_with = "raw")]
    pub data: Option<String>,

    /// Follow pagination and print every resource
    #[arg(long, conflicts_with = "raw")]
    pub list: bool,

    /// Print the undecoded body, requested with this Accept type
    #[arg(long, value_name = "ACCEPT")]
    pub raw: Option<String>,
}

impl RequestArgs {
    pub fn uri_params(&self) -> Params {
        self.params.iter().cloned().collect()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.query
            .iter()
            .map(|(key, values)| Query::new(QueryKey::from(key.as_str()), values.split(',')))
            .collect()
    }

    /// Request descriptor for these arguments; the body must be valid JSON
    pub fn request_params(&self) -> Result<RequestParams> {
        let params = RequestParams {
            request_name: self.name.clone(),
            uri_params: self.uri_params(),
            query: self.queries(),
            body: None,
        };

        match &self.data {
            Some(data) => {
                let body: serde_json::Value = serde_json::from_str(data)
                    .map_err(|e| CcError::Encode(format!("--data is not valid JSON: {}", e)))?;
                params.body(&body)
            }
            None => Ok(params),
        }
    }
}

/// Parse `key=value`
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}
