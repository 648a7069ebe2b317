use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::filters::{append_js_extension, strip_js_extension};
use crate::error::ConfigError;

/// Normalisation applied to a reference before lookup or to a lookup result before reassembly.
pub type PathFilter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A single reference-matching rule.
///
/// The matcher must expose exactly one capture group holding the reference substring.
/// Nothing checks this: a matcher without the group leaves its matches untouched, and a
/// matcher with more groups only ever has its first group rewritten.
#[derive(Clone)]
pub struct Pattern {
    matcher: Regex,
    description: String,
    filter_in: Option<PathFilter>,
    filter_out: Option<PathFilter>,
}

impl Pattern {
    /// Build a rule from an already compiled matcher.
    pub fn new(matcher: Regex, description: impl Into<String>) -> Self {
        Self {
            matcher,
            description: description.into(),
            filter_in: None,
            filter_out: None,
        }
    }

    /// Compile `source` into a rule.
    pub fn compile(source: &str, description: impl Into<String>) -> Result<Self, ConfigError> {
        let matcher = Regex::new(source).map_err(|source_err| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self::new(matcher, description))
    }

    /// Normalise captured references before they reach the finder.
    pub fn with_filter_in<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filter_in = Some(Arc::new(filter));
        self
    }

    /// Normalise finder results before the reference is reassembled.
    pub fn with_filter_out<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filter_out = Some(Arc::new(filter));
        self
    }

    /// Regex locating the references this rule rewrites.
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Human readable summary reported to the log sink.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Apply the inbound filter, or return the reference unchanged.
    pub fn filter_in(&self, reference: &str) -> String {
        match &self.filter_in {
            Some(filter) => filter(reference),
            None => reference.to_string(),
        }
    }

    /// Apply the outbound filter, or return the resolved path unchanged.
    pub fn filter_out(&self, resolved: &str) -> String {
        match &self.filter_out {
            Some(filter) => filter(resolved),
            None => resolved.to_string(),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("matcher", &self.matcher.as_str())
            .field("description", &self.description)
            .field("filter_in", &self.filter_in.is_some())
            .field("filter_out", &self.filter_out.is_some())
            .finish()
    }
}

/// Built-in rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Markup references: scripts, stylesheets, images, data attributes, inline styles.
    Html,
    /// Stylesheet references: `src=` and `url(...)`.
    Css,
}

impl Preset {
    /// Name used to select the preset.
    pub fn name(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
        }
    }

    /// The preset's rules, in application order.
    pub fn patterns(self) -> &'static [Pattern] {
        static HTML: OnceLock<Vec<Pattern>> = OnceLock::new();
        static CSS: OnceLock<Vec<Pattern>> = OnceLock::new();

        match self {
            Self::Html => HTML.get_or_init(html_patterns),
            Self::Css => CSS.get_or_init(css_patterns),
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            other => Err(ConfigError::UnsupportedPreset(other.to_string())),
        }
    }
}

fn preset_rule(source: &str, description: &str) -> Pattern {
    Pattern::new(
        Regex::new(source).expect("invalid preset regex"),
        description,
    )
}

fn html_patterns() -> Vec<Pattern> {
    vec![
        preset_rule(
            r#"<script.+src=['"]([^"']+)["']"#,
            "Update the HTML to reference our concat/min/revved script files",
        ),
        preset_rule(
            r#"<link[^>]+href=['"]([^"']+)["']"#,
            "Update the HTML with the new css filenames",
        ),
        preset_rule(
            r#"<img[^>]+src=['"]([^"']+)["']"#,
            "Update the HTML with the new img filenames",
        ),
        preset_rule(
            r#"data-main\s*=['"]([^"']+)['"]"#,
            "Update the HTML with data-main tags",
        )
        .with_filter_in(append_js_extension)
        .with_filter_out(strip_js_extension),
        // Attribute names of two or more characters that do not start with `main`.
        preset_rule(
            r#"data-(?:[^m=][^=]+|m(?:[^a=][^=]*|a(?:[^i=][^=]*|i(?:[^n=][^=]*)?)?))=['"]([^'"]+)['"]"#,
            "Update the HTML with data-* tags",
        ),
        preset_rule(
            r#"url\(\s*['"]([^"']+)["']\s*\)"#,
            "Update the HTML with background imgs, case there is some inline style",
        ),
        preset_rule(
            r#"<a[^>]+href=['"]([^"']+)["']"#,
            "Update the HTML with anchors images",
        ),
        preset_rule(
            r#"<input[^>]+src=['"]([^"']+)["']"#,
            "Update the HTML with reference in input",
        ),
    ]
}

fn css_patterns() -> Vec<Pattern> {
    vec![preset_rule(
        r#"(?:src=|url\(\s*)['"]?([^'"\)]+)['"]?\s*\)?"#,
        "Update the CSS to reference our revved images",
    )]
}

/// Either a preset name or a caller-built rule list.
#[derive(Debug, Clone)]
pub enum PatternSelector {
    /// Name of a built-in preset, validated on resolution.
    Preset(String),
    /// Rules supplied verbatim by the caller.
    Custom(Vec<Pattern>),
}

impl From<&str> for PatternSelector {
    fn from(value: &str) -> Self {
        Self::Preset(value.to_string())
    }
}

impl From<String> for PatternSelector {
    fn from(value: String) -> Self {
        Self::Preset(value)
    }
}

impl From<Preset> for PatternSelector {
    fn from(value: Preset) -> Self {
        Self::Preset(value.name().to_string())
    }
}

impl From<Vec<Pattern>> for PatternSelector {
    fn from(value: Vec<Pattern>) -> Self {
        Self::Custom(value)
    }
}

/// Ordered rules applied to one kind of document.
///
/// Each rule runs over the output of the rule before it, so order is significant.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Cow<'static, [Pattern]>,
}

impl PatternCatalog {
    /// Resolve a selector into a catalogue.
    ///
    /// Custom rule lists are accepted as-is; only preset names are validated.
    pub fn resolve(selector: impl Into<PatternSelector>) -> Result<Self, ConfigError> {
        let patterns = match selector.into() {
            PatternSelector::Preset(name) => Cow::Borrowed(name.parse::<Preset>()?.patterns()),
            PatternSelector::Custom(patterns) => Cow::Owned(patterns),
        };
        Ok(Self { patterns })
    }

    /// Rules in application order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}
