//! Command execution

use log::{debug, info};
use serde_json::{json, Value};
use std::io::Write;

use crate::ccv3::{Client, Router};
use crate::error::{CcError, Result, WarnedError, Warnings};
use crate::settings::{self, SettingsStore};

use super::{Cli, Command, RequestArgs};

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Routes => {
            run_routes_command();
            Ok(())
        }
        Command::Request(args) => {
            let store = match cli.config {
                Some(path) => SettingsStore::with_path(path),
                None => SettingsStore::new(),
            };
            run_request_command(&args, store).await
        }
    }
}

fn run_routes_command() {
    for name in Router::default().names() {
        println!("{}", name);
    }
}

async fn run_request_command(args: &RequestArgs, store: SettingsStore) -> Result<()> {
    let params = args.request_params()?;

    // Fail on a bad request name or missing parameter before touching settings
    Router::default().resolve(&params.request_name, &params.uri_params)?;

    debug!("Loading settings from {}", store.path().display());
    let mut loaded = store.load()?;
    loaded.apply_env(|key| std::env::var(key).ok());
    let client = settings::connect(store, &loaded)?;

    if let Some(accept) = &args.raw {
        let bytes = unwrap_warned(
            client
                .make_request_receive_raw(&params.request_name, &params.uri_params, accept)
                .await,
        )?;
        return std::io::stdout()
            .write_all(&bytes)
            .map_err(|e| CcError::Config(format!("Failed to write output: {}", e)));
    }

    let value = if args.list {
        list_request(&client, &params).await?
    } else {
        unwrap_warned(client.make_request::<Value>(&params).await)?
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    info!("Request {} completed", params.request_name);
    Ok(())
}

async fn list_request(client: &Client, params: &crate::ccv3::RequestParams) -> Result<Value> {
    let (resources, included) = unwrap_warned(client.list_all::<Value>(params).await)?;

    let mut output = json!({ "resources": resources });
    if !included.is_empty() {
        output["included"] = serde_json::to_value(included)?;
    }
    Ok(output)
}

/// Print warnings to stderr and drop them from the result
fn unwrap_warned<T>(result: std::result::Result<(T, Warnings), WarnedError>) -> Result<T> {
    match result {
        Ok((value, warnings)) => {
            print_warnings(&warnings);
            Ok(value)
        }
        Err(WarnedError { error, warnings }) => {
            print_warnings(&warnings);
            Err(error)
        }
    }
}

fn print_warnings(warnings: &Warnings) {
    for warning in warnings {
        eprintln!("{}", warning);
    }
}
