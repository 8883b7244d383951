//! Port mapping parser for the runtime's free-text `Ports` column.
//!
//! The column is a comma-separated list of clauses such as
//! `0.0.0.0:8080->80/tcp, :::8080->80/tcp, 53/udp`. Only clauses bound to
//! an IPv4 host address over TCP produce an [`Endpoint`]; IPv6 bindings,
//! UDP mappings, port ranges and unpublished container ports are skipped.
//! The binding IP is discarded: links point at whatever host the catalog
//! is being viewed from.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Endpoint;

/// Anchored per clause, so a binding like `::ffff:1.2.3.4:80->80/tcp` is
/// skipped rather than matched on its IPv4 tail.
static TCP_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\d+\.\d+\.\d+):(\d+)->(\d+)/tcp$").expect("static pattern")
});

/// A single clause that matched the mapping grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortClause<'a> {
    pub host_ip: &'a str,
    pub host_port: &'a str,
    pub container_port: &'a str,
}

/// Parse one clause. `None` means the clause is outside the supported form.
pub fn parse_clause(clause: &str) -> Option<PortClause<'_>> {
    let caps = TCP_CLAUSE.captures(clause.trim())?;
    Some(PortClause {
        host_ip: caps.get(1)?.as_str(),
        host_port: caps.get(2)?.as_str(),
        container_port: caps.get(3)?.as_str(),
    })
}

/// Extract every browsable endpoint from a `Ports` value.
///
/// `client_host` is the host name the requesting browser used to reach
/// the catalog, without a port.
pub fn extract_ports(raw: &str, client_host: &str) -> Vec<Endpoint> {
    raw.split(',')
        .filter_map(parse_clause)
        .map(|clause| Endpoint {
            host_port: clause.host_port.to_string(),
            container_port: clause.container_port.to_string(),
            url: format!("//{client_host}:{}", clause.host_port),
        })
        .collect()
}

/// Reduce a `Host` header value to the bare host name.
///
/// `example.com:5000` becomes `example.com`; bracketed IPv6 literals such
/// as `[::1]:5000` keep their brackets. An empty value falls back to
/// `localhost`.
pub fn client_host(host_header: Option<&str>) -> String {
    let raw = host_header.map(str::trim).unwrap_or_default();
    let host = if raw.starts_with('[') {
        match raw.find(']') {
            Some(end) => &raw[..=end],
            None => raw,
        }
    } else {
        raw.split(':').next().unwrap_or_default()
    };
    if host.is_empty() {
        "localhost".to_string()
    } else {
        host.to_string()
    }
}
