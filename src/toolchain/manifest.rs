//! Parsers for the files a toolchain channel is read from

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::ParseError;

const TOOLCHAIN_TABLE: &str = "toolchain";
const CHANNEL_KEY: &str = "channel";

static STABLE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"stable_version=(\d+\.\d+\.\d+)").expect("valid regex"));

/// Extract `[toolchain].channel` from a `rust-toolchain.toml`
///
/// Returns `Ok(None)` when the document parses but declares no channel.
pub fn parse_toolchain_channel(content: &str) -> Result<Option<String>, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_toml_ng::LANGUAGE;
    parser.set_language(&language.into()).map_err(|e| {
        warn!("Failed to set TOML language for tree-sitter: {}", e);
        ParseError::TreeSitter(e.to_string())
    })?;

    let tree = parser.parse(content, None).ok_or_else(|| {
        warn!("Failed to parse TOML content");
        ParseError::ParseFailed("Failed to parse TOML".to_string())
    })?;

    let root = tree.root_node();
    let mut cursor = root.walk();

    for child in root.children(&mut cursor) {
        let channel = match child.kind() {
            // toolchain.channel = "1.75.0"
            "pair" => match pair_key(child, content) {
                Some(key) if key == format!("{TOOLCHAIN_TABLE}.{CHANNEL_KEY}") => {
                    pair_string_value(child, content)
                }
                _ => None,
            },
            // [toolchain]
            // channel = "1.75.0"
            "table" if table_name(child, content) == Some(TOOLCHAIN_TABLE) => {
                table_channel(child, content)
            }
            _ => None,
        };

        if channel.is_some() {
            return Ok(channel);
        }
    }

    Ok(None)
}

/// Extract the `stable_version=<x.y.z>` assignment from `ci/rust-version.sh`
pub fn parse_ci_stable_version(script: &str) -> Option<String> {
    STABLE_VERSION_RE
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn table_name<'a>(table_node: tree_sitter::Node, content: &'a str) -> Option<&'a str> {
    let mut cursor = table_node.walk();
    table_node
        .children(&mut cursor)
        .find(|child| child.kind() == "bare_key" || child.kind() == "dotted_key")
        .map(|child| &content[child.byte_range()])
}

fn table_channel(table_node: tree_sitter::Node, content: &str) -> Option<String> {
    let mut cursor = table_node.walk();
    table_node
        .children(&mut cursor)
        .filter(|child| child.kind() == "pair")
        .find(|pair| pair_key(*pair, content).as_deref() == Some(CHANNEL_KEY))
        .and_then(|pair| pair_string_value(pair, content))
}

fn pair_key(pair_node: tree_sitter::Node, content: &str) -> Option<String> {
    let mut cursor = pair_node.walk();
    pair_node
        .children(&mut cursor)
        .find(|child| child.kind() == "bare_key" || child.kind() == "dotted_key")
        .map(|child| {
            content[child.byte_range()]
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".")
        })
}

fn pair_string_value(pair_node: tree_sitter::Node, content: &str) -> Option<String> {
    let mut cursor = pair_node.walk();
    pair_node
        .children(&mut cursor)
        .find(|child| child.kind() == "string")
        .map(|child| {
            content[child.byte_range()]
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string()
        })
        .filter(|value| !value.is_empty())
}
