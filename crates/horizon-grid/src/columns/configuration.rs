//! Stateful controller behind a column settings dialog.

use std::sync::Arc;

use horizon_grid_core::Signal;
use horizon_grid_core::logging::targets;
use parking_lot::RwLock;

use super::actions::{
    move_column_relative_to_another_column, toggle_all_columns_visibility,
    toggle_single_column_pin, toggle_single_column_visibility,
};
use super::config::{ColumnPinPosition, ColumnsConfig, DataColumn};
use super::utils::{
    ColumnGroup, ColumnGroups, DndColumn, DropPosition, GroupedColumn, can_accept_drop,
    group_and_filter_sorted_columns, group_neighbours, is_column_always_hidden_in_configuration,
    sort_columns_and_add_group_key,
};

/// Type alias for the function returning the searchable text of a column.
pub type ColumnSearchFieldsFn = Arc<dyn Fn(&DataColumn) -> Vec<String> + Send + Sync>;

struct ConfigurationState {
    config: ColumnsConfig,
    search_value: Option<String>,
    sorted: Vec<GroupedColumn>,
}

/// Holds the working configuration while the user edits it.
///
/// Each edit replaces the whole configuration through the pure functions in
/// this module and emits [`config_changed`](Self::config_changed).
///
/// # Example
///
/// ```
/// use horizon_grid::columns::{ColumnsConfig, ColumnsConfiguration, DataColumn};
///
/// let columns = vec![DataColumn::new("name", "Name"), DataColumn::new("size", "Size")];
/// let settings = ColumnsConfiguration::new(columns.clone(), ColumnsConfig::from_columns(&columns));
///
/// settings.toggle_visibility("size");
/// assert!(!settings.columns_config().get("size").unwrap().is_visible);
///
/// settings.reset();
/// assert!(settings.columns_config().get("size").unwrap().is_visible);
/// ```
pub struct ColumnsConfiguration {
    columns: Vec<DataColumn>,
    default_config: ColumnsConfig,
    search_fields: Option<ColumnSearchFieldsFn>,
    state: RwLock<ConfigurationState>,
    /// Emitted with the new configuration after every replacement.
    pub config_changed: Signal<ColumnsConfig>,
}

impl ColumnsConfiguration {
    /// Starts from `default_config`.
    pub fn new(columns: Vec<DataColumn>, default_config: ColumnsConfig) -> Self {
        let sorted = sort_columns_and_add_group_key(&columns, &default_config);
        Self {
            state: RwLock::new(ConfigurationState {
                config: default_config.clone(),
                search_value: None,
                sorted,
            }),
            columns,
            default_config,
            search_fields: None,
            config_changed: Signal::new(),
        }
    }

    /// Starts from a previously saved configuration instead of the default.
    pub fn with_initial_config(self, config: ColumnsConfig) -> Self {
        {
            let mut state = self.state.write();
            state.sorted = sort_columns_and_add_group_key(&self.columns, &config);
            state.config = config;
        }
        self
    }

    /// Sets the text a search matches against. Defaults to the caption.
    pub fn with_search_fields<F>(mut self, fields: F) -> Self
    where
        F: Fn(&DataColumn) -> Vec<String> + Send + Sync + 'static,
    {
        self.search_fields = Some(Arc::new(fields));
        self
    }

    /// The column definitions.
    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    /// The working configuration.
    pub fn columns_config(&self) -> ColumnsConfig {
        self.state.read().config.clone()
    }

    pub fn search_value(&self) -> Option<String> {
        self.state.read().search_value.clone()
    }

    pub fn set_search_value(&self, value: Option<String>) {
        self.state.write().search_value = value;
    }

    /// Reordering is disabled while a search narrows the list.
    pub fn is_dnd_allowed(&self) -> bool {
        self.state
            .read()
            .search_value
            .as_deref()
            .is_none_or(|s| s.trim().is_empty())
    }

    /// All columns, grouped and sorted.
    pub fn sorted_columns(&self) -> Vec<GroupedColumn> {
        self.state.read().sorted.clone()
    }

    /// Columns listed in the dialog, grouped and filtered by the search value.
    pub fn grouped_columns(&self) -> ColumnGroups {
        let state = self.state.read();
        let search = state.search_value.as_deref();
        match &self.search_fields {
            Some(fields) => group_and_filter_sorted_columns(&state.sorted, search, |c| fields(c)),
            None => group_and_filter_sorted_columns(&state.sorted, search, |c| vec![c.caption.clone()]),
        }
    }

    /// Whether any column listed in the dialog is shown.
    pub fn has_any_selected_columns(&self) -> bool {
        self.state.read().sorted.iter().any(|c| {
            c.group != ColumnGroup::Hidden && !is_column_always_hidden_in_configuration(&c.column)
        })
    }

    pub fn toggle_visibility(&self, key: &str) {
        self.replace_with(|config, sorted| toggle_single_column_visibility(config, sorted, key));
    }

    pub fn toggle_pin(&self, key: &str, fix: Option<ColumnPinPosition>) {
        self.replace_with(|config, sorted| toggle_single_column_pin(config, sorted, key, fix));
    }

    pub fn check_all(&self) {
        self.replace_with(|config, sorted| toggle_all_columns_visibility(config, sorted, true));
    }

    pub fn uncheck_all(&self) {
        self.replace_with(|config, sorted| toggle_all_columns_visibility(config, sorted, false));
    }

    /// Restores the default configuration and clears the search.
    pub fn reset(&self) {
        self.state.write().search_value = None;
        let default_config = self.default_config.clone();
        self.replace_with(|_, _| default_config);
    }

    /// Drops `src` before or after the column `target_key`.
    ///
    /// Returns `false` without changing anything when reordering is disabled
    /// or the drop is not allowed.
    pub fn handle_drop(&self, src: &DndColumn, target_key: &str, position: DropPosition) -> bool {
        if !self.is_dnd_allowed() {
            tracing::debug!(target: targets::COLUMNS, "drop ignored while searching");
            return false;
        }

        let mut accepted = false;
        self.replace_with(|config, sorted| {
            let Some((prev, target, next)) = group_neighbours(sorted, target_key) else {
                return config.clone();
            };
            if !can_accept_drop(src, target) {
                return config.clone();
            }
            accepted = true;
            let moved = move_column_relative_to_another_column(
                &src.column_config,
                &target.config,
                prev.map(|c| &c.config),
                next.map(|c| &c.config),
                position,
            );
            config.with(src.column.key.clone(), moved)
        });
        accepted
    }

    fn replace_with<F>(&self, update: F)
    where
        F: FnOnce(&ColumnsConfig, &[GroupedColumn]) -> ColumnsConfig,
    {
        let next = {
            let mut state = self.state.write();
            let next = update(&state.config, &state.sorted);
            if next == state.config {
                return;
            }
            state.sorted = sort_columns_and_add_group_key(&self.columns, &next);
            state.config = next.clone();
            next
        };
        tracing::debug!(target: targets::COLUMNS, columns = next.len(), "column configuration replaced");
        self.config_changed.emit(next);
    }
}
