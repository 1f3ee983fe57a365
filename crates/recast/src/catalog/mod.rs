//! Explicit rule catalogue.
//!
//! A [`Catalog`] maps stable rule names to [`RuleDescriptor`]s. Nothing is
//! discovered at run time: hosts construct the catalogue, then
//! [`Catalog::activate`] validates the requested options and builds the
//! active [`RuleSet`]. Rules whose options are invalid, and names the
//! catalogue does not know, are excluded before any matching starts.

use std::sync::Arc;

use recast_core::Diagnostic;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CatalogError, OptionValidationError};
use crate::options::{OptionSpec, RuleOptions, validate_options};
use crate::rule::{Rule, RuleSet};

const CATALOG_TARGET: &str = "recast::catalog";

/// Builds a configured rule from validated options.
///
/// Factories may add checks the declarative [`OptionSpec`]s cannot express,
/// such as compiling a pattern, and report them as reasons.
pub type RuleFactory = fn(&RuleOptions) -> Result<Box<dyn Rule>, Vec<String>>;

/// Registration entry for one rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    name: &'static str,
    description: &'static str,
    options: &'static [OptionSpec],
    factory: RuleFactory,
}

impl RuleDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(
        name: &'static str,
        description: &'static str,
        options: &'static [OptionSpec],
        factory: RuleFactory,
    ) -> Self {
        Self {
            name,
            description,
            options,
            factory,
        }
    }

    /// Stable rule name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// One-line description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// Options the rule accepts.
    #[must_use]
    pub const fn options(&self) -> &'static [OptionSpec] {
        self.options
    }

    /// Validates `options` and builds the rule.
    ///
    /// # Errors
    ///
    /// Returns [`OptionValidationError`] with every reason the options were
    /// rejected.
    pub fn build(&self, options: &RuleOptions) -> Result<Box<dyn Rule>, OptionValidationError> {
        let reasons = validate_options(self.options, options);
        if !reasons.is_empty() {
            return Err(OptionValidationError::new(self.name, reasons));
        }
        (self.factory)(options).map_err(|reasons| OptionValidationError::new(self.name, reasons))
    }

    /// Validates `options` without keeping the built rule.
    ///
    /// # Errors
    ///
    /// See [`RuleDescriptor::build`].
    pub fn validate(&self, options: &RuleOptions) -> Result<(), OptionValidationError> {
        self.build(options).map(drop)
    }
}

/// A request to activate one catalogued rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRequest {
    name: String,
    #[serde(default)]
    options: RuleOptions,
}

impl RuleRequest {
    /// Requests `name` with no options.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: RuleOptions::new(),
        }
    }

    /// Returns the request with `options` attached.
    #[must_use]
    pub fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }

    /// Requested rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested options.
    #[must_use]
    pub const fn options(&self) -> &RuleOptions {
        &self.options
    }
}

/// Result of [`Catalog::activate`].
#[derive(Debug, Default)]
pub struct Activation {
    rules: RuleSet,
    rejected: Vec<OptionValidationError>,
}

impl Activation {
    /// The active rules, in request order.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Consumes the activation, returning the active rules.
    #[must_use]
    pub fn into_rules(self) -> RuleSet {
        self.rules
    }

    /// Requests that were excluded.
    #[must_use]
    pub fn rejected(&self) -> &[OptionValidationError] {
        &self.rejected
    }

    /// Registration diagnostics for the excluded requests.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.rejected
            .iter()
            .map(OptionValidationError::to_diagnostic)
            .collect()
    }
}

/// Table of available rules keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    descriptors: Vec<RuleDescriptor>,
}

impl Catalog {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateRule`] if the name is taken.
    pub fn register(&mut self, descriptor: RuleDescriptor) -> Result<(), CatalogError> {
        if self.get(descriptor.name).is_some() {
            return Err(CatalogError::DuplicateRule {
                name: descriptor.name.to_owned(),
            });
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.name == name)
    }

    /// Iterates over descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.descriptors.iter()
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(RuleDescriptor::name).collect()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validates and builds every requested rule.
    ///
    /// The active set keeps request order. Each rejected request is logged
    /// and reported in [`Activation::rejected`]; the others are unaffected.
    #[must_use]
    pub fn activate(&self, requests: &[RuleRequest]) -> Activation {
        let mut activation = Activation::default();
        for request in requests {
            let built = self.get(&request.name).map_or_else(
                || {
                    Err(OptionValidationError::new(
                        request.name.as_str(),
                        vec![format!("no rule named '{}' is registered", request.name)],
                    ))
                },
                |descriptor| descriptor.build(&request.options),
            );
            match built {
                Ok(rule) => {
                    debug!(target: CATALOG_TARGET, rule = request.name(), "rule activated");
                    activation.rules.push(Arc::from(rule));
                }
                Err(error) => {
                    warn!(
                        target: CATALOG_TARGET,
                        rule = request.name(),
                        reasons = %error.reasons().join("; "),
                        "rule excluded from the active set"
                    );
                    activation.rejected.push(error);
                }
            }
        }
        activation
    }
}
