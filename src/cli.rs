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

use clap::Parser;
use std::path::PathBuf;

use crate::ssh::StrictHostKeyChecking;

#[derive(Parser, Debug)]
#[command(
    name = "fleetmod",
    version,
    about = "Run a module on every inventory host matching a pattern",
    long_about = "fleetmod copies a self-contained module executable to each host selected by a\nhost pattern, runs it over SSH with the given arguments, and collects the JSON\nit prints. Hosts that cannot be reached or whose module fails are reported as\ndark together with a diagnostic.",
    after_help = "EXAMPLES:\n  Ping every host:                fleetmod all\n  Run a module on a group:        fleetmod webservers -m uptime\n  Union of groups, glob on names: fleetmod 'webservers:db*' -m facts -a 'detail=full'\n  Preview the selected hosts:     fleetmod 'web*' --list-hosts\n\nEXIT CODES:\n  0    every host returned a structured result\n  1    fatal error, or no host matched the pattern\n  2    at least one host is dark\n  130  interrupted"
)]
pub struct Cli {
    #[arg(help = "Host pattern: 'all', '*', group names, host names or globs joined by ':' or ';'")]
    pub pattern: String,

    #[arg(
        short = 'i',
        long,
        env = "FLEETMOD_INVENTORY",
        help = "Inventory file [default: /etc/fleetmod/hosts]"
    )]
    pub inventory: Option<PathBuf>,

    #[arg(short = 'm', long = "module", help = "Module name [default: ping]")]
    pub module_name: Option<String>,

    #[arg(
        short = 'M',
        long,
        help = "Directory holding module executables [default: /usr/share/fleetmod]"
    )]
    pub module_path: Option<PathBuf>,

    #[arg(
        short = 'a',
        long = "args",
        help = "Module arguments, split on whitespace"
    )]
    pub module_args: Option<String>,

    #[arg(short = 'u', long, help = "Remote user [default: root]")]
    pub user: Option<String>,

    #[arg(
        short = 'k',
        long,
        help = "Prompt for the SSH password once and use it for every host"
    )]
    pub ask_pass: bool,

    #[arg(
        long = "key",
        help = "SSH private key file (prompts for passphrase if encrypted)\nFalls back to the agent, then ~/.ssh/id_ed25519, id_rsa, id_ecdsa"
    )]
    pub key: Option<PathBuf>,

    #[arg(long, help = "Use the SSH agent (on by default when SSH_AUTH_SOCK is set)")]
    pub use_agent: bool,

    #[arg(short = 'f', long, help = "Number of parallel workers [default: 5]")]
    pub forks: Option<usize>,

    #[arg(
        short = 'T',
        long,
        help = "Connection and per-operation timeout in seconds [default: 10]"
    )]
    pub timeout: Option<u64>,

    #[arg(short = 'p', long, help = "SSH port for hosts without one [default: 22]")]
    pub port: Option<u16>,

    #[arg(
        short = 'B',
        long,
        help = "Run the module in the background (not supported; aborts the run)"
    )]
    pub background: bool,

    #[arg(
        long,
        value_parser = clap::value_parser!(StrictHostKeyChecking),
        help = "Host key checking mode [default: no]\n  yes        - Strict checking against known_hosts\n  no         - Accept all host keys\n  accept-new - Accept new hosts, reject changed keys"
    )]
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,

    #[arg(long, help = "Tag for the remote syslog side channel [default: fleetmod]")]
    pub log_tag: Option<String>,

    #[arg(long, help = "Print the results as JSON")]
    pub json: bool,

    #[arg(long, help = "Print the matched hosts and exit without connecting")]
    pub list_hosts: bool,

    #[arg(
        long,
        env = "FLEETMOD_CONFIG",
        help = "Configuration file [default: ~/.config/fleetmod/config.yaml]\nConfig loading priority:\n  1. This flag (the file must exist)\n  2. $XDG_CONFIG_HOME/fleetmod/config.yaml\n  3. ~/.config/fleetmod/config.yaml\n  4. Built-in defaults"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}
