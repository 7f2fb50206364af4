//! Grouping, sorting and drop rules for configurable columns.

use std::fmt;

use horizon_grid_core::logging::targets;

use super::config::{ColumnConfig, ColumnPinPosition, ColumnsConfig, DataColumn};
use super::order::order_between;

/// Section of the configuration list a column is shown in.
///
/// Variants are declared in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnGroup {
    PinnedLeft,
    Visible,
    PinnedRight,
    Hidden,
}

impl ColumnGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PinnedLeft => "pinned-left",
            Self::Visible => "visible",
            Self::PinnedRight => "pinned-right",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ColumnGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column together with its effective configuration and group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedColumn {
    pub column: DataColumn,
    /// The stored configuration with policy applied.
    pub config: ColumnConfig,
    pub group: ColumnGroup,
    pub is_pinned_always: bool,
}

/// Drag payload: the column being dropped and its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DndColumn {
    pub column: DataColumn,
    pub column_config: ColumnConfig,
}

impl From<&GroupedColumn> for DndColumn {
    fn from(grouped: &GroupedColumn) -> Self {
        Self {
            column: grouped.column.clone(),
            column_config: grouped.config.clone(),
        }
    }
}

/// Where a dropped column lands relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropPosition {
    Before,
    After,
}

/// Columns split into their sections, each in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnGroups {
    pub pinned_left: Vec<GroupedColumn>,
    pub visible: Vec<GroupedColumn>,
    pub pinned_right: Vec<GroupedColumn>,
    pub hidden: Vec<GroupedColumn>,
}

impl ColumnGroups {
    pub fn get(&self, group: ColumnGroup) -> &[GroupedColumn] {
        match group {
            ColumnGroup::PinnedLeft => &self.pinned_left,
            ColumnGroup::Visible => &self.visible,
            ColumnGroup::PinnedRight => &self.pinned_right,
            ColumnGroup::Hidden => &self.hidden,
        }
    }

    fn get_mut(&mut self, group: ColumnGroup) -> &mut Vec<GroupedColumn> {
        match group {
            ColumnGroup::PinnedLeft => &mut self.pinned_left,
            ColumnGroup::Visible => &mut self.visible,
            ColumnGroup::PinnedRight => &mut self.pinned_right,
            ColumnGroup::Hidden => &mut self.hidden,
        }
    }

    /// All columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupedColumn> {
        self.pinned_left
            .iter()
            .chain(&self.visible)
            .chain(&self.pinned_right)
            .chain(&self.hidden)
    }

    pub fn len(&self) -> usize {
        self.pinned_left.len() + self.visible.len() + self.pinned_right.len() + self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The column can neither be hidden nor unpinned.
pub fn is_column_always_pinned(column: &DataColumn) -> bool {
    column.is_always_visible && column.fix.is_some()
}

pub fn is_column_always_hidden_in_configuration(column: &DataColumn) -> bool {
    column.is_hidden_in_configuration
}

/// Applies column policy to a stored configuration.
pub fn effective_config(column: &DataColumn, config: &ColumnConfig) -> ColumnConfig {
    let mut effective = config.clone();
    if column.is_always_visible {
        effective.is_visible = true;
    }
    if is_column_always_pinned(column) {
        effective.fix = config.fix.or(column.fix).or(Some(ColumnPinPosition::Left));
    }
    effective
}

/// The group an effective configuration places a column in.
pub fn column_group(config: &ColumnConfig) -> ColumnGroup {
    match (config.is_visible, config.fix) {
        (false, _) => ColumnGroup::Hidden,
        (true, Some(ColumnPinPosition::Left)) => ColumnGroup::PinnedLeft,
        (true, Some(ColumnPinPosition::Right)) => ColumnGroup::PinnedRight,
        (true, None) => ColumnGroup::Visible,
    }
}

/// Sorts `columns` by group, then by configured order, then by definition
/// order, and tags each with its group.
///
/// Columns missing from `config` get default settings ordered after every
/// configured column. Configuration for unknown keys is ignored.
pub fn sort_columns_and_add_group_key(
    columns: &[DataColumn],
    config: &ColumnsConfig,
) -> Vec<GroupedColumn> {
    for key in config.unknown_keys(columns) {
        tracing::warn!(target: targets::COLUMNS, key, "ignoring configuration for unknown column");
    }

    let mut last_order: Option<String> = columns
        .iter()
        .filter_map(|c| config.get(&c.key))
        .map(|c| c.order.clone())
        .max();

    let mut grouped: Vec<(usize, GroupedColumn)> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let stored = match config.get(&column.key) {
                Some(stored) => stored.clone(),
                None => {
                    let order = order_between(last_order.as_deref(), None);
                    last_order = Some(order.clone());
                    tracing::debug!(target: targets::COLUMNS, key = %column.key, "column has no configuration, using defaults");
                    ColumnConfig::for_column(column, order)
                }
            };
            let effective = effective_config(column, &stored);
            let grouped = GroupedColumn {
                column: column.clone(),
                group: column_group(&effective),
                config: effective,
                is_pinned_always: is_column_always_pinned(column),
            };
            (index, grouped)
        })
        .collect();

    grouped.sort_by(|(ia, a), (ib, b)| {
        a.group
            .cmp(&b.group)
            .then_with(|| a.config.order.cmp(&b.config.order))
            .then_with(|| ia.cmp(ib))
    });
    grouped.into_iter().map(|(_, column)| column).collect()
}

/// Splits sorted columns into groups, dropping columns hidden from the
/// configuration UI and, when `search` is not blank, columns whose search
/// fields do not contain it (case-insensitive).
pub fn group_and_filter_sorted_columns<F>(
    sorted: &[GroupedColumn],
    search: Option<&str>,
    search_fields: F,
) -> ColumnGroups
where
    F: Fn(&DataColumn) -> Vec<String>,
{
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut groups = ColumnGroups::default();
    for column in sorted {
        if is_column_always_hidden_in_configuration(&column.column) {
            continue;
        }
        if let Some(needle) = &needle {
            let matches = search_fields(&column.column)
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !matches {
                continue;
            }
        }
        groups.get_mut(column.group).push(column.clone());
    }
    groups
}

/// The neighbours of `key` inside its own group of `sorted`.
pub fn group_neighbours<'a>(
    sorted: &'a [GroupedColumn],
    key: &str,
) -> Option<(Option<&'a GroupedColumn>, &'a GroupedColumn, Option<&'a GroupedColumn>)> {
    let position = sorted.iter().position(|c| c.column.key == key)?;
    let target = &sorted[position];
    let prev = position
        .checked_sub(1)
        .and_then(|i| sorted.get(i))
        .filter(|c| c.group == target.group);
    let next = sorted.get(position + 1).filter(|c| c.group == target.group);
    Some((prev, target, next))
}

/// Whether `src` may be dropped next to `dst`.
///
/// Rejects dropping a column onto itself or onto an always-pinned column,
/// moving an always-pinned column out of its group, and moving an
/// always-visible column into the hidden group.
pub fn can_accept_drop(src: &DndColumn, dst: &GroupedColumn) -> bool {
    if src.column.key == dst.column.key {
        return false;
    }
    if is_column_always_pinned(&dst.column) {
        return false;
    }
    let src_group = column_group(&effective_config(&src.column, &src.column_config));
    if is_column_always_pinned(&src.column) && src_group != dst.group {
        return false;
    }
    if src.column.is_always_visible && dst.group == ColumnGroup::Hidden {
        return false;
    }
    true
}
