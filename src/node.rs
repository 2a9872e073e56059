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

use anyhow::{bail, Context, Result};
use std::fmt;

/// A resolved SSH target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub host: String,
    pub port: u16,
    pub username: String,
}

impl Node {
    pub fn new(host: String, port: u16, username: String) -> Self {
        Self {
            host,
            port,
            username,
        }
    }

    /// Parse an inventory host name into a connection target.
    ///
    /// Accepted forms are `host`, `host:port`, `user@host`, `user@host:port`
    /// and bracketed IPv6 literals such as `[::1]:2222`. A bare IPv6 address
    /// is taken as-is with the default port.
    pub fn parse(target: &str, default_user: &str, default_port: u16) -> Result<Self> {
        let (user_part, host_part) = match target.rsplit_once('@') {
            Some((user, rest)) => (Some(user), rest),
            None => (None, target),
        };

        let (host, port) = if let Some(bracketed) = host_part.strip_prefix('[') {
            let Some((host, rest)) = bracketed.split_once(']') else {
                bail!("Unterminated IPv6 literal in '{target}'");
            };
            match rest.strip_prefix(':') {
                Some(port) => (host, parse_port(port)?),
                None if rest.is_empty() => (host, default_port),
                None => bail!("Unexpected trailing characters in '{target}'"),
            }
        } else if host_part.matches(':').count() == 1 {
            let (host, port) = host_part
                .split_once(':')
                .context("Invalid host:port form")?;
            (host, parse_port(port)?)
        } else {
            (host_part, default_port)
        };

        if host.is_empty() {
            bail!("Empty host name in '{target}'");
        }

        let username = match user_part {
            Some(user) if !user.is_empty() => user,
            _ => default_user,
        };

        Ok(Node::new(host.to_string(), port, username.to_string()))
    }

    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse::<u16>()
        .with_context(|| format!("Invalid port number: {port}"))
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_only() {
        let node = Node::parse("web1.example.com", "root", 22).unwrap();
        assert_eq!(node.host, "web1.example.com");
        assert_eq!(node.port, 22);
        assert_eq!(node.username, "root");
    }

    #[test]
    fn test_parse_host_with_port() {
        let node = Node::parse("web1:2222", "root", 22).unwrap();
        assert_eq!(node.host, "web1");
        assert_eq!(node.port, 2222);
    }

    #[test]
    fn test_parse_full_format() {
        let node = Node::parse("deploy@web1:2200", "root", 22).unwrap();
        assert_eq!(node.username, "deploy");
        assert_eq!(node.host, "web1");
        assert_eq!(node.port, 2200);
        assert_eq!(node.to_string(), "deploy@web1:2200");
    }

    #[test]
    fn test_parse_ipv6() {
        let node = Node::parse("[::1]:2222", "root", 22).unwrap();
        assert_eq!(node.host, "::1");
        assert_eq!(node.port, 2222);
        assert_eq!(node.address(), "[::1]:2222");

        let bare = Node::parse("fe80::1", "root", 2022).unwrap();
        assert_eq!(bare.host, "fe80::1");
        assert_eq!(bare.port, 2022);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Node::parse("web1:notaport", "root", 22).is_err());
        assert!(Node::parse("[::1", "root", 22).is_err());
        assert!(Node::parse("root@", "root", 22).is_err());
    }
}
