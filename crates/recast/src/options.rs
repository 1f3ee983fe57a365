//! Typed rule options and their validation.
//!
//! A rule declares the options it accepts as [`OptionSpec`]s. Validation is
//! a pure function of the specs and the supplied [`RuleOptions`]; it runs
//! before any matching so a misconfigured rule never sees a tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// The type an option value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OptionKind {
    /// Free text.
    Text,
    /// A signed integer.
    Integer,
    /// `true` or `false`.
    Boolean,
}

/// A supplied option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A text value.
    Text(String),
}

impl OptionValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        match self {
            Self::Boolean(_) => OptionKind::Boolean,
            Self::Integer(_) => OptionKind::Integer,
            Self::Text(_) => OptionKind::Text,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Declaration of one option a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    name: &'static str,
    kind: OptionKind,
    required: bool,
    description: &'static str,
}

impl OptionSpec {
    /// Declares a required option.
    #[must_use]
    pub const fn required(name: &'static str, kind: OptionKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    /// Declares an optional option.
    #[must_use]
    pub const fn optional(name: &'static str, kind: OptionKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }

    /// Option name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Expected value kind.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Whether the option must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// One-line description for catalogue listings.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }
}

/// Option values supplied for one rule activation.
///
/// # Example
///
/// ```
/// use recast::{OptionKind, OptionSpec, RuleOptions, validate_options};
///
/// const SPECS: &[OptionSpec] = &[OptionSpec::required("pattern", OptionKind::Text, "what to find")];
///
/// let options = RuleOptions::new().with("pattern", "$X == null");
/// assert!(validate_options(SPECS, &options).is_empty());
/// assert_eq!(validate_options(SPECS, &RuleOptions::new()).len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleOptions {
    values: BTreeMap<String, OptionValue>,
}

impl RuleOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set with `name` bound to `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Binds `name` to `value`, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Returns the text value of `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::Text(text) => Some(text),
            OptionValue::Boolean(_) | OptionValue::Integer(_) => None,
        }
    }

    /// Returns the integer value of `name`.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(value) => Some(*value),
            OptionValue::Boolean(_) | OptionValue::Text(_) => None,
        }
    }

    /// Returns the boolean value of `name`.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Boolean(value) => Some(*value),
            OptionValue::Integer(_) | OptionValue::Text(_) => None,
        }
    }

    /// Iterates over supplied names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns `true` if no option was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Checks `options` against `specs`, returning every reason for rejection.
///
/// An empty result means the options are valid.
#[must_use]
pub fn validate_options(specs: &[OptionSpec], options: &RuleOptions) -> Vec<String> {
    let mut reasons: Vec<String> = options
        .names()
        .filter(|name| !specs.iter().any(|spec| spec.name == *name))
        .map(|name| format!("unknown option '{name}'"))
        .collect();

    for spec in specs {
        match options.get(spec.name) {
            None if spec.required => {
                reasons.push(format!("missing required option '{}'", spec.name));
            }
            Some(value) if value.kind() != spec.kind => reasons.push(format!(
                "option '{}' expects {}, got {}",
                spec.name,
                spec.kind,
                value.kind()
            )),
            _ => {}
        }
    }
    reasons
}
