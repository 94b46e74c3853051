mod cli;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::Value;

use sumcoin_rpc::{Client, ClientError, Config, ErrorReporter};

fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let reporter = ErrorReporter::new();

    let config = build_config(&args).map_err(|err| {
        reporter.report(&err);
        eyre!(err).wrap_err("invalid connection settings")
    })?;
    let client = Client::new(config).map_err(|err| {
        reporter.report(&err);
        eyre!(err).wrap_err("while creating the RPC client")
    })?;

    let params: Vec<Value> = args.params.iter().map(|p| parse_param(p)).collect();
    tracing::debug!(method = %args.method, params = params.len(), "calling daemon");

    let response = client.request(&args.method, params).map_err(|err| {
        reporter.report(&err);
        let message = format_rpc_call_error(&args.rpc_url, &err);
        eyre!(message).wrap_err(format!("while calling `{}`", args.method))
    })?;

    let rendered =
        serde_json::to_string_pretty(response.result()).context("render result as JSON")?;
    println!("{rendered}");

    Ok(())
}

fn build_config(args: &cli::Cli) -> Result<Config, ClientError> {
    let mut config = Config::from_url(&args.rpc_url)?;
    if args.rpc_user.is_some() || args.rpc_pass.is_some() {
        config.user = args.rpc_user.clone();
        config.password = args.rpc_pass.clone();
    }
    if config.user.is_none() {
        config.cookie_file = args.rpc_cookie_file.clone();
    }
    if let Some(wallet) = &args.wallet {
        config.wallet = Some(wallet.clone());
    }
    config.preserve_case = args.preserve_case;
    config.validate()?;
    Ok(config)
}

/// JSON if it parses, otherwise the raw text as a string.
fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn format_rpc_call_error(rpc_url: &str, err: &ClientError) -> String {
    let mut lines = vec![format!("{} error (code {}): {err}", err.kind(), err.code())];

    match err {
        ClientError::Connection { code: 401 | 403, .. } => lines.push(
            "hint: authentication failed; verify --rpc-user/--rpc-pass or the cookie file".into(),
        ),
        ClientError::Connection { code: 404, .. } => lines.push(
            "hint: endpoint path not found; verify the wallet name is loaded on the daemon".into(),
        ),
        ClientError::Client { .. } => lines.push(format!(
            "hint: could not reach `{rpc_url}`; verify the daemon is running and the URL is correct"
        )),
        _ => {}
    }

    lines.join("\n")
}
