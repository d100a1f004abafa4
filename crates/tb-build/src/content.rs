//! Parsing free-form command content such as
//! `dbt run --select tag:daily --vars '{"day": "{{ ds }}"}'`
//!
//! Tokenizing happens in two passes. The first splits the content into
//! quote-aware tokens that keep their byte spans, then groups them into flag
//! segments. The second only looks at the `--vars` segment: its raw text is
//! expanded against the pipeline variables and parsed as JSON.

use crate::error::{BuildError, BuildResult};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;
use tb_core::Variables;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid regex"))
}

const VARS_FLAG: &str = "--vars";

/// Verb, arguments and variables carried by free-form content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContent {
    /// Leading non-flag token, e.g. `run`
    pub verb: Option<String>,
    /// Remaining tokens, unquoted, without the `--vars` segment
    pub args: Vec<String>,
    /// `--vars` value after placeholder expansion and quote stripping
    pub vars_fragment: Option<String>,
    /// Parsed `vars_fragment`
    pub vars: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    start: usize,
    end: usize,
}

impl Token {
    fn is_flag(&self) -> bool {
        self.text.starts_with('-')
    }

    /// A flag ends the `--vars` value; a negative number such as `-1` does not
    fn ends_vars_value(&self) -> bool {
        self.is_flag() && serde_json::from_str::<Value>(&self.text).is_err()
    }
}

/// Parse command content against the effective variables
pub fn parse_content(content: &str, variables: &Variables) -> BuildResult<ParsedContent> {
    let mut tokens = tokenize(content)?;

    if tokens.first().is_some_and(|t| t.text == "dbt") {
        tokens.remove(0);
    }
    let verb = match tokens.first() {
        Some(first) if !first.is_flag() => Some(tokens.remove(0).text),
        _ => None,
    };

    let mut args = Vec::new();
    let mut vars_span: Option<(usize, usize)> = None;

    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if token.text != VARS_FLAG {
            args.push(token.text);
            continue;
        }
        if vars_span.is_some() {
            return Err(BuildError::InvalidCommand(format!(
                "{} given more than once",
                VARS_FLAG
            )));
        }

        let mut span: Option<(usize, usize)> = None;
        while let Some(value) = iter.next_if(|t| !t.ends_vars_value()) {
            span = Some(match span {
                Some((start, _)) => (start, value.end),
                None => (value.start, value.end),
            });
        }
        match span {
            Some(span) => vars_span = Some(span),
            None => {
                return Err(BuildError::InvalidCommand(format!(
                    "{} has no value",
                    VARS_FLAG
                )))
            }
        }
    }

    let (vars_fragment, vars) = match vars_span {
        Some((start, end)) => {
            let fragment = expand_vars_fragment(&content[start..end], variables);
            let parsed = serde_json::from_str::<Value>(&fragment).map_err(|e| {
                BuildError::InvalidCommand(format!(
                    "{} is not valid JSON ({}): {}",
                    VARS_FLAG, e, fragment
                ))
            })?;
            (Some(fragment), Some(parsed))
        }
        None => (None, None),
    };

    Ok(ParsedContent {
        verb,
        args,
        vars_fragment,
        vars,
    })
}

/// Replace `{{ name }}` placeholders with the JSON encoding of the variable,
/// or of the placeholder text itself when unresolved, then strip one pair of
/// surrounding single quotes.
fn expand_vars_fragment(raw: &str, variables: &Variables) -> String {
    let expanded = placeholder_regex().replace_all(raw, |caps: &Captures| {
        let name = caps[1].trim();
        match variables.get(name).filter(|v| !v.is_null()) {
            Some(value) => value.to_string(),
            None => Value::String(caps[0].to_string()).to_string(),
        }
    });

    let trimmed = expanded.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(trimmed)
        .to_string()
}

/// Whitespace-separated tokens honouring single and double quotes.
///
/// Quote characters are removed from the token text but kept inside the
/// byte span.
fn tokenize(content: &str) -> BuildResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current: Option<Token> = None;
    let mut quote: Option<char> = None;

    for (idx, ch) in content.char_indices() {
        let next = idx + ch.len_utf8();

        if quote.is_none() && ch.is_whitespace() {
            if let Some(token) = current.take() {
                tokens.push(token);
            }
            continue;
        }

        let token = current.get_or_insert_with(|| Token {
            text: String::new(),
            start: idx,
            end: idx,
        });
        token.end = next;

        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), c) if c == open => quote = None,
            _ => token.text.push(ch),
        }
    }

    if let Some(open) = quote {
        return Err(BuildError::InvalidCommand(format!(
            "unbalanced {} quote",
            open
        )));
    }
    if let Some(token) = current {
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Variables {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_vars_placeholder_is_json_encoded() {
        let parsed = parse_content(
            "dbt run --vars '{{env}}' --exclude foo",
            &vars(json!({"env": "prod"})),
        )
        .unwrap();

        assert_eq!(parsed.verb.as_deref(), Some("run"));
        assert_eq!(parsed.vars_fragment.as_deref(), Some("\"prod\""));
        assert_eq!(parsed.vars, Some(json!("prod")));
        assert_eq!(parsed.args, vec!["--exclude", "foo"]);
    }

    #[test]
    fn test_vars_object_with_spaces() {
        let parsed = parse_content(
            r#"run --select tag:daily --vars '{"day": {{ ds }}, "n": 3}' --full-refresh"#,
            &vars(json!({"ds": "2024-01-02"})),
        )
        .unwrap();

        assert_eq!(parsed.vars, Some(json!({"day": "2024-01-02", "n": 3})));
        assert_eq!(parsed.args, vec!["--select", "tag:daily", "--full-refresh"]);
    }

    #[test]
    fn test_unresolved_placeholder_keeps_literal() {
        let parsed = parse_content("run --vars '{\"a\": {{ missing }}}'", &Variables::new()).unwrap();
        assert_eq!(parsed.vars, Some(json!({"a": "{{ missing }}"})));
    }

    #[test]
    fn test_unquoted_vars_spanning_tokens() {
        let parsed = parse_content(r#"test --vars {"a": 1} --store-failures"#, &Variables::new())
            .unwrap();
        assert_eq!(parsed.vars, Some(json!({"a": 1})));
        assert_eq!(parsed.args, vec!["--store-failures"]);
    }

    #[test]
    fn test_short_flag_ends_vars_value() {
        let parsed = parse_content(r#"run --vars '{"a": 1}' -s my_model"#, &Variables::new())
            .unwrap();
        assert_eq!(parsed.vars, Some(json!({"a": 1})));
        assert_eq!(parsed.args, vec!["-s", "my_model"]);

        let parsed = parse_content("run --vars -1 -x", &Variables::new()).unwrap();
        assert_eq!(parsed.vars, Some(json!(-1)));
        assert_eq!(parsed.args, vec!["-x"]);
    }

    #[test]
    fn test_no_vars_and_no_verb() {
        let parsed = parse_content("--select \"my model\"", &Variables::new()).unwrap();
        assert_eq!(parsed.verb, None);
        assert_eq!(parsed.args, vec!["--select", "my model"]);
        assert!(parsed.vars.is_none());
    }

    #[test]
    fn test_ambiguous_content_is_rejected() {
        let empty = Variables::new();
        for content in [
            "run --vars '{}' --vars '{}'",
            "run --vars --select x",
            "run --vars",
            "run --select 'unterminated",
            "run --vars '{not json'",
        ] {
            let err = parse_content(content, &empty).unwrap_err();
            assert!(matches!(err, BuildError::InvalidCommand(_)), "{}", content);
        }
    }
}
