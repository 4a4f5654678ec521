// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;
mod session;

use anyhow::{Context, Result, bail};
use armory_app::{AppCommand, AppState};
use armory_feed::FeedClient;
use config::Config;
use runtime::{FeedRuntime, FeedSource};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `armory --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let session_path = session::default_path(&options.config_path);

    if options.sign_out {
        if session::clear(&session_path)? {
            println!("signed out");
        } else {
            println!("no active session");
        }
        return Ok(());
    }

    if let Some(user) = &options.sign_in {
        let session = session::save(&session_path, user)?;
        println!("signed in as {}", session.user);
        return Ok(());
    }

    let source = if options.demo {
        FeedSource::Demo
    } else {
        match config.feed_url() {
            Some(url) => {
                let client = FeedClient::new(&url, config.feed_timeout()?).with_context(|| {
                    format!("invalid feed URL in {}", options.config_path.display())
                })?;
                FeedSource::Client(client)
            }
            None => FeedSource::Unconfigured(
                "feed URL is not configured; set [feed].url or ARMORY_FEED_URL".to_owned(),
            ),
        }
    };

    if options.check_only {
        if matches!(source, FeedSource::Unconfigured(_)) {
            bail!(
                "feed URL is not configured; set [feed].url in {} or ARMORY_FEED_URL",
                options.config_path.display()
            );
        }
        return Ok(());
    }

    let mut state = AppState::default();
    state.active_tab = config.start_tab();
    if options.demo {
        state.dispatch(AppCommand::SignIn("demo".to_owned()));
    } else if let Some(session) = session::load(&session_path)? {
        state.dispatch(AppCommand::SignIn(session.user));
    }

    let mut runtime = FeedRuntime::new(source, session_path);
    armory_tui::run_app(&mut state, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    demo: bool,
    check_only: bool,
    sign_in: Option<String>,
    sign_out: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        demo: false,
        check_only: false,
        sign_in: None,
        sign_out: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--sign-in" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sign-in requires a name"))?;
                options.sign_in = Some(value.as_ref().to_owned());
            }
            "--sign-out" => {
                options.sign_out = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("armory");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with built-in demo records (no network)");
    println!("  --check                  Validate config and feed URL, then exit");
    println!("  --sign-in <name>         Write the local session and exit");
    println!("  --sign-out               Remove the local session and exit");
    println!("  --help                   Show this help");
}
