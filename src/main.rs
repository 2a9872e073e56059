// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use fleetmod::{
    cli::Cli,
    config::Config,
    executor::{EngineError, ExecutionMode, ModuleArgs, ModuleSpec, Runner, RunnerConfig},
    inventory::Inventory,
    session::Credentials,
    ssh::{auth::prompt_password, SshConnector},
    ui::OutputFormatter,
    utils::init_logging,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DARK_HOSTS: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load_with_priority(cli.config.as_deref()).await?;
    let inventory_path = config.inventory(cli.inventory.as_deref());

    if cli.list_hosts {
        let inventory = Inventory::load(&inventory_path)?;
        let hosts = inventory.match_hosts(&cli.pattern);
        print!("{}", OutputFormatter::format_host_list(&cli.pattern, &hosts));
        return Ok(if hosts.is_empty() {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        });
    }

    let user = config.user(cli.user.as_deref());
    let password = if cli.ask_pass {
        let prompt_user = user.clone();
        let password = tokio::task::spawn_blocking(move || prompt_password(&prompt_user))
            .await
            .context("Password prompt task failed")??;
        Some(password)
    } else {
        None
    };

    let credentials = Credentials::new(user)
        .with_port(config.port(cli.port))
        .with_password(password)
        .with_key_path(config.ssh_key(cli.key.as_deref()))
        .with_agent(config.use_agent(cli.use_agent));

    let module_args: Vec<String> = config
        .module_args(cli.module_args.as_deref())
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let module = ModuleSpec::new(
        config.module_name(cli.module_name.as_deref()),
        config.module_path(cli.module_path.as_deref()),
    )
    .with_args(ModuleArgs::List(module_args));

    let mode = if cli.background {
        ExecutionMode::Background
    } else {
        ExecutionMode::Normal
    };

    let runner_config = RunnerConfig::new(inventory_path, cli.pattern.clone(), module, credentials)
        .with_forks(config.forks(cli.forks))
        .with_timeout(Duration::from_secs(config.timeout(cli.timeout)))
        .with_mode(mode)
        .with_log_tag(config.log_tag(cli.log_tag.as_deref()));

    let strict_mode = config.strict_host_key_checking(cli.strict_host_key_checking);
    let connector = Arc::new(SshConnector::new(strict_mode));
    let runner = Runner::new(runner_config, connector)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received interrupt, stopping workers");
            interrupt.cancel();
        }
    });

    let results = match runner.run(&cancel).await {
        Ok(results) => results,
        Err(EngineError::Interrupted) => {
            eprintln!("{}", "Interrupted".yellow().bold());
            return Ok(EXIT_INTERRUPTED);
        }
        Err(e) => return Err(e.into()),
    };

    if results.no_hosts_matched() {
        eprintln!("{}", "No hosts matched".yellow());
        return Ok(EXIT_FAILURE);
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("Failed to serialize results")?
        );
    } else {
        print!("{}", OutputFormatter::format_report(&results));
    }

    Ok(if results.has_dark_hosts() {
        EXIT_DARK_HOSTS
    } else {
        EXIT_SUCCESS
    })
}
