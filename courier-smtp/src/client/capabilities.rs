//! Service extensions advertised in an EHLO reply.

use std::collections::HashMap;

use super::response::Response;

/// The extensions a server advertised, keyed by upper-cased keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    domain: String,
    extensions: HashMap<String, String>,
}

impl Capabilities {
    /// Reads an EHLO reply. The first line names the server; every further
    /// line is `KEYWORD [parameters]`.
    #[must_use]
    pub fn from_ehlo(response: &Response) -> Self {
        let mut lines = response.lines.iter();
        let domain = lines
            .next()
            .and_then(|greeting| greeting.split_whitespace().next())
            .unwrap_or_default()
            .to_string();

        let extensions = lines
            .filter_map(|line| {
                let mut parts = line.trim().splitn(2, ' ');
                let keyword = parts.next().filter(|k| !k.is_empty())?;
                let params = parts.next().unwrap_or_default().trim();
                Some((keyword.to_ascii_uppercase(), params.to_string()))
            })
            .collect();

        Self { domain, extensions }
    }

    /// The name the server gave for itself.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether `keyword` was advertised (case-insensitive).
    #[must_use]
    pub fn supports(&self, keyword: &str) -> bool {
        self.extensions.contains_key(&keyword.to_ascii_uppercase())
    }

    /// The parameters advertised with `keyword`.
    #[must_use]
    pub fn params(&self, keyword: &str) -> Option<&str> {
        self.extensions
            .get(&keyword.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// SASL mechanisms listed after `AUTH`, upper-cased.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<String> {
        self.params("AUTH")
            .map(|params| {
                params
                    .split_whitespace()
                    .map(str::to_ascii_uppercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
