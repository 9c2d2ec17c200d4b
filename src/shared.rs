//! Per-request shared props.
//!
//! Middleware-like stages add props every page of the request should carry
//! (the current user, flash messages, validation errors). The store lives in
//! the request's extensions and is handed to the page builder, which merges
//! it under the page's own props.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::props::{Prop, Props};

/// Name of the error bag used when none is given.
pub const DEFAULT_ERROR_BAG: &str = "default";

/// Key of the validation errors prop.
pub const ERRORS_KEY: &str = "errors";

/// Validation errors grouped by bag, then field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    bags: BTreeMap<String, BTreeMap<String, String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error in the default bag.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.add_to(DEFAULT_ERROR_BAG, field, message);
    }

    /// Record an error in a named bag. The first message per field wins.
    pub fn add_to(
        &mut self,
        bag: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.bags
            .entry(bag.into())
            .or_default()
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.bags.values().all(BTreeMap::is_empty)
    }

    /// Shape the errors for the client.
    ///
    /// Default-bag errors are nested under the requested bag name when the
    /// client names one, flattened otherwise; without a default bag every
    /// bag is sent.
    pub fn to_value(&self, requested_bag: Option<&str>) -> Value {
        let as_object = |fields: &BTreeMap<String, String>| -> Value {
            Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            )
        };

        match (self.bags.get(DEFAULT_ERROR_BAG), requested_bag) {
            (Some(default), Some(bag)) => {
                let mut map = Map::new();
                map.insert(bag.to_string(), as_object(default));
                Value::Object(map)
            }
            (Some(default), None) => as_object(default),
            (None, _) => Value::Object(
                self.bags
                    .iter()
                    .map(|(bag, fields)| (bag.clone(), as_object(fields)))
                    .collect(),
            ),
        }
    }
}

/// Props and validation errors shared by every page of one request.
#[derive(Debug, Clone, Default)]
pub struct SharedProps {
    props: Props,
    errors: ValidationErrors,
}

impl SharedProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share one prop; a later share of the same key replaces it.
    pub fn share(&mut self, key: impl Into<String>, prop: impl Into<Prop>) -> &mut Self {
        self.props.insert(key, prop);
        self
    }

    /// Share several props at once.
    pub fn share_all(&mut self, props: Props) -> &mut Self {
        self.props.extend(props);
        self
    }

    pub fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    pub fn set_errors(&mut self, errors: ValidationErrors) -> &mut Self {
        self.errors = errors;
        self
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Shared props plus the always-included `errors` prop.
    pub(crate) fn into_props(self, requested_bag: Option<&str>) -> Props {
        let mut props = Props::new().with(
            ERRORS_KEY,
            Prop::value(self.errors.to_value(requested_bag)).always(),
        );
        props.extend(self.props);
        props
    }
}
