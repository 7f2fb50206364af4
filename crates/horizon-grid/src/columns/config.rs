//! Column definitions and the persisted per-column configuration.

use std::collections::BTreeMap;

use horizon_grid_core::logging::targets;
use serde::{Deserialize, Serialize};

use super::order::{initial_orders, validate_order_key};
use crate::error::{Error, Result};

/// Side a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnPinPosition {
    Left,
    Right,
}

/// Static definition of a configurable column.
///
/// The `is_*` flags are policy: user toggles never override them.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub key: String,
    pub caption: String,
    /// Pin side a fresh configuration starts with.
    pub fix: Option<ColumnPinPosition>,
    /// The column can not be hidden. Combined with `fix`, it can not be unpinned.
    pub is_always_visible: bool,
    pub is_hidden_by_default: bool,
    /// The column is not listed in the configuration UI.
    pub is_hidden_in_configuration: bool,
    pub width: Option<f32>,
}

impl DataColumn {
    /// A visible, unpinned column.
    pub fn new(key: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            caption: caption.into(),
            fix: None,
            is_always_visible: false,
            is_hidden_by_default: false,
            is_hidden_in_configuration: false,
            width: None,
        }
    }

    /// Sets the default pin side.
    pub fn with_fix(mut self, fix: ColumnPinPosition) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Marks the column as impossible to hide.
    pub fn always_visible(mut self) -> Self {
        self.is_always_visible = true;
        self
    }

    /// Hides the column in a fresh configuration.
    pub fn hidden_by_default(mut self) -> Self {
        self.is_hidden_by_default = true;
        self
    }

    /// Leaves the column out of the configuration UI.
    pub fn hidden_in_configuration(mut self) -> Self {
        self.is_hidden_in_configuration = true;
        self
    }

    /// Sets the default width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }
}

/// User settings for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<ColumnPinPosition>,
    /// Fractional order key, see [`order_between`](super::order_between).
    pub order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl ColumnConfig {
    /// The configuration a column starts with, at `order`.
    pub fn for_column(column: &DataColumn, order: impl Into<String>) -> Self {
        Self {
            is_visible: column.is_always_visible || !column.is_hidden_by_default,
            fix: column.fix,
            order: order.into(),
            width: column.width,
        }
    }
}

/// Column settings keyed by column key.
///
/// Serialized as a plain JSON object. Every change produces a new map; a
/// config is never edited in place by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnsConfig(BTreeMap<String, ColumnConfig>);

impl ColumnsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings for `columns`, ordered as given.
    pub fn from_columns(columns: &[DataColumn]) -> Self {
        let orders = initial_orders(columns.len());
        Self(
            columns
                .iter()
                .zip(orders)
                .map(|(column, order)| (column.key.clone(), ColumnConfig::for_column(column, order)))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&ColumnConfig> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnConfig)> {
        self.0.iter()
    }

    /// A copy with `key` set to `config`.
    pub fn with(&self, key: impl Into<String>, config: ColumnConfig) -> Self {
        let mut next = self.0.clone();
        next.insert(key.into(), config);
        Self(next)
    }

    /// Keys that are not defined by `columns`.
    pub fn unknown_keys<'a>(&'a self, columns: &'a [DataColumn]) -> impl Iterator<Item = &'a str> {
        self.0
            .keys()
            .filter(move |key| !columns.iter().any(|c| &c.key == *key))
            .map(String::as_str)
    }

    /// Fails on the first key that is not a column or order key that is malformed.
    pub fn validate(&self, columns: &[DataColumn]) -> Result<()> {
        if let Some(key) = self.unknown_keys(columns).next() {
            return Err(Error::unknown_column(key));
        }
        for config in self.0.values() {
            validate_order_key(&config.order)?;
        }
        Ok(())
    }

    /// Drops entries for keys that are not columns, logging each one.
    pub fn retain_known(&self, columns: &[DataColumn]) -> Self {
        for key in self.unknown_keys(columns) {
            tracing::warn!(target: targets::COLUMNS, key, "ignoring configuration for unknown column");
        }
        Self(
            self.0
                .iter()
                .filter(|(key, _)| columns.iter().any(|c| &c.key == *key))
                .map(|(key, config)| (key.clone(), config.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, ColumnConfig)> for ColumnsConfig {
    fn from_iter<I: IntoIterator<Item = (String, ColumnConfig)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<DataColumn> {
        vec![
            DataColumn::new("name", "Name").with_fix(ColumnPinPosition::Left).always_visible(),
            DataColumn::new("size", "Size").with_width(80.0),
            DataColumn::new("owner", "Owner").hidden_by_default(),
        ]
    }

    #[test]
    fn test_from_columns_defaults() {
        let config = ColumnsConfig::from_columns(&columns());

        let name = config.get("name").unwrap();
        assert!(name.is_visible);
        assert_eq!(name.fix, Some(ColumnPinPosition::Left));
        assert_eq!(config.get("size").unwrap().width, Some(80.0));
        assert!(!config.get("owner").unwrap().is_visible);

        let name_order = &name.order;
        let size_order = &config.get("size").unwrap().order;
        assert!(name_order < size_order);
        assert_eq!(config.validate(&columns()), Ok(()));
    }

    #[test]
    fn test_with_returns_new_map() {
        let config = ColumnsConfig::from_columns(&columns());
        let mut hidden = config.get("size").unwrap().clone();
        hidden.is_visible = false;

        let next = config.with("size", hidden);
        assert!(config.get("size").unwrap().is_visible);
        assert!(!next.get("size").unwrap().is_visible);
    }

    #[test]
    fn test_unknown_keys() {
        let config = ColumnsConfig::from_columns(&columns()).with(
            "legacy",
            ColumnConfig {
                is_visible: true,
                fix: None,
                order: "z".into(),
                width: None,
            },
        );

        assert_eq!(config.validate(&columns()), Err(Error::unknown_column("legacy")));
        let cleaned = config.retain_known(&columns());
        assert_eq!(cleaned.len(), 3);
        assert!(!cleaned.contains_key("legacy"));
    }

    #[test]
    fn test_invalid_order_key_rejected() {
        let mut size = ColumnsConfig::from_columns(&columns()).get("size").unwrap().clone();
        size.order = "Ba".into();
        let config = ColumnsConfig::from_columns(&columns()).with("size", size);
        assert_eq!(config.validate(&columns()), Err(Error::invalid_order_key("Ba")));
    }

    #[test]
    fn test_serde_camel_case() {
        let config = ColumnsConfig::from_columns(&columns());
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["name"]["isVisible"], true);
        assert_eq!(json["name"]["fix"], "left");
        assert!(json["size"].get("fix").is_none());

        let parsed: ColumnsConfig = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, config);
    }
}
