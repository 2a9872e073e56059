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

use owo_colors::OwoColorize;

use crate::executor::{Payload, ResultSet};

/// Renders run results for the terminal.
pub struct OutputFormatter;

impl OutputFormatter {
    /// `host | success >> {pretty json}`
    pub fn format_contacted(host: &str, payload: &Payload) -> String {
        let body = serde_json::to_string_pretty(payload).unwrap_or_else(|_| format!("{payload:?}"));
        format!(
            "{} | {} >> {}",
            host.bold(),
            "success".green(),
            body
        )
    }

    /// `host => diagnostic`
    pub fn format_dark(host: &str, diagnostic: &str) -> String {
        format!("{} => {}", host.bold(), diagnostic.red())
    }

    /// Full report: contacted hosts first, then the dark section.
    pub fn format_report(results: &ResultSet) -> String {
        let mut output = String::new();

        for (host, payload) in &results.contacted {
            output.push_str(&Self::format_contacted(host, payload));
            output.push('\n');
        }

        if results.has_dark_hosts() {
            if !results.contacted.is_empty() {
                output.push('\n');
            }
            output.push_str(&format!("{}\n", "Unreachable or failed hosts:".red().bold()));
            for (host, diagnostic) in &results.dark {
                output.push_str(&Self::format_dark(host, diagnostic));
                output.push('\n');
            }
        }

        output.push_str(&Self::format_summary(
            results.contacted.len(),
            results.dark.len(),
        ));
        output
    }

    pub fn format_summary(contacted: usize, dark: usize) -> String {
        let mut parts = vec![format!(
            "{} hosts",
            (contacted + dark).to_string().bold()
        )];

        if contacted > 0 {
            parts.push(format!(
                "{} {}",
                contacted.to_string().green().bold(),
                "contacted".green()
            ));
        }

        if dark > 0 {
            parts.push(format!("{} {}", dark.to_string().red().bold(), "dark".red()));
        }

        format!("\n{}\n", format!(" Summary: {} ", parts.join(" • ")).bold())
    }

    /// Hosts a pattern selects, one per line, for `--list-hosts`.
    pub fn format_host_list(pattern: &str, hosts: &[String]) -> String {
        let mut output = format!(
            "{} {} {} matched by '{}':\n",
            "►".cyan().bold(),
            hosts.len().to_string().bold(),
            if hosts.len() == 1 { "host" } else { "hosts" },
            pattern
        );
        for host in hosts {
            output.push_str(&format!("  {host}\n"));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::HostOutcome;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_format_contacted() {
        let line = OutputFormatter::format_contacted("web1", &payload(json!({"ping": "pong"})));
        assert!(line.contains("web1"));
        assert!(line.contains("success"));
        assert!(line.contains("\"ping\": \"pong\""));
    }

    #[test]
    fn test_format_report_lists_dark_hosts_after_contacted() {
        let results = ResultSet::aggregate(vec![
            HostOutcome::contacted("web1", payload(json!({"ok": true}))),
            HostOutcome::dark("db1", "connect error: connection refused"),
        ]);

        let report = OutputFormatter::format_report(&results);
        let contacted_at = report.find("web1").unwrap();
        let dark_at = report.find("db1").unwrap();
        assert!(contacted_at < dark_at);
        assert!(report.contains("connection refused"));
        assert!(report.contains("Summary"));
    }

    #[test]
    fn test_format_report_without_dark_hosts() {
        let results = ResultSet::aggregate(vec![HostOutcome::contacted(
            "web1",
            payload(json!({})),
        )]);
        let report = OutputFormatter::format_report(&results);
        assert!(!report.contains("Unreachable"));
    }

    #[test]
    fn test_format_host_list() {
        let hosts = vec!["web1".to_string(), "web2".to_string()];
        let listing = OutputFormatter::format_host_list("web*", &hosts);
        assert!(listing.contains("  web1\n"));
        assert!(listing.contains("  web2\n"));
        assert!(listing.contains("web*"));
    }
}
