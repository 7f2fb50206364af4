//! Pure configuration transitions.
//!
//! Every function takes the previous configuration by reference and returns
//! a new one. Columns exempt by policy are left as they were.

use horizon_grid_core::logging::targets;

use super::config::{ColumnConfig, ColumnPinPosition, ColumnsConfig};
use super::order::order_between;
use super::utils::{DropPosition, GroupedColumn};

fn find<'a>(columns: &'a [GroupedColumn], key: &str) -> Option<&'a GroupedColumn> {
    let found = columns.iter().find(|c| c.column.key == key);
    if found.is_none() {
        tracing::warn!(target: targets::COLUMNS, key, "toggle requested for unknown column");
    }
    found
}

/// Flips the visibility of one column.
///
/// Only `is_visible` changes, so toggling twice restores the original
/// configuration. Always-visible columns are not affected.
pub fn toggle_single_column_visibility(
    prev: &ColumnsConfig,
    columns: &[GroupedColumn],
    key: &str,
) -> ColumnsConfig {
    let Some(column) = find(columns, key) else {
        return prev.clone();
    };
    if column.column.is_always_visible {
        return prev.clone();
    }

    let mut config = prev.get(key).cloned().unwrap_or_else(|| column.config.clone());
    config.is_visible = !config.is_visible;
    prev.with(key, config)
}

/// Pins one column to `fix`, or unpins it when it is already pinned there or
/// `fix` is `None`. Pinning makes the column visible.
///
/// Always-pinned columns are not affected.
pub fn toggle_single_column_pin(
    prev: &ColumnsConfig,
    columns: &[GroupedColumn],
    key: &str,
    fix: Option<ColumnPinPosition>,
) -> ColumnsConfig {
    let Some(column) = find(columns, key) else {
        return prev.clone();
    };
    if column.is_pinned_always {
        return prev.clone();
    }

    let mut config = prev.get(key).cloned().unwrap_or_else(|| column.config.clone());
    config.fix = if config.fix == fix { None } else { fix };
    if config.fix.is_some() {
        config.is_visible = true;
    }
    prev.with(key, config)
}

/// Shows or hides every column that is neither always visible nor hidden
/// from the configuration UI.
pub fn toggle_all_columns_visibility(
    prev: &ColumnsConfig,
    columns: &[GroupedColumn],
    value: bool,
) -> ColumnsConfig {
    columns
        .iter()
        .filter(|c| !c.column.is_always_visible && !c.column.is_hidden_in_configuration)
        .fold(prev.clone(), |next, column| {
            let mut config = next
                .get(&column.column.key)
                .cloned()
                .unwrap_or_else(|| column.config.clone());
            config.is_visible = value;
            next.with(column.column.key.clone(), config)
        })
}

/// Returns the configuration of a column dropped next to `target`.
///
/// The new order key sits between `target` and the neighbour on the drop
/// side; a missing neighbour means the start or end of the sequence. A
/// neighbour whose key ties with the target is treated as missing, so the key
/// always lands on the requested side of the target. The dropped column
/// adopts the target's visibility and pin side.
pub fn move_column_relative_to_another_column(
    column_config: &ColumnConfig,
    target: &ColumnConfig,
    target_prev: Option<&ColumnConfig>,
    target_next: Option<&ColumnConfig>,
    position: DropPosition,
) -> ColumnConfig {
    let target_order = target.order.as_str();
    let order = match position {
        DropPosition::Before => order_between(
            target_prev
                .map(|c| c.order.as_str())
                .filter(|prev| *prev < target_order),
            Some(target_order),
        ),
        DropPosition::After => order_between(
            Some(target_order),
            target_next
                .map(|c| c.order.as_str())
                .filter(|next| *next > target_order),
        ),
    };

    ColumnConfig {
        is_visible: target.is_visible,
        fix: target.fix,
        order,
        ..column_config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::config::DataColumn;
    use crate::columns::utils::sort_columns_and_add_group_key;

    fn columns() -> Vec<DataColumn> {
        vec![
            DataColumn::new("id", "Id").with_fix(ColumnPinPosition::Left).always_visible(),
            DataColumn::new("name", "Name"),
            DataColumn::new("size", "Size"),
            DataColumn::new("hidden", "Hidden").hidden_in_configuration(),
        ]
    }

    fn setup() -> (ColumnsConfig, Vec<GroupedColumn>) {
        let config = ColumnsConfig::from_columns(&columns());
        let sorted = sort_columns_and_add_group_key(&columns(), &config);
        (config, sorted)
    }

    #[test]
    fn test_toggle_visibility_twice_restores() {
        let (config, sorted) = setup();
        let once = toggle_single_column_visibility(&config, &sorted, "name");
        assert!(!once.get("name").unwrap().is_visible);
        assert!(config.get("name").unwrap().is_visible);

        let twice = toggle_single_column_visibility(&once, &sorted, "name");
        assert_eq!(twice, config);
    }

    #[test]
    fn test_toggle_visibility_respects_policy() {
        let (config, sorted) = setup();
        assert_eq!(toggle_single_column_visibility(&config, &sorted, "id"), config);
        assert_eq!(toggle_single_column_visibility(&config, &sorted, "nope"), config);
    }

    #[test]
    fn test_toggle_pin() {
        let (config, sorted) = setup();
        let pinned = toggle_single_column_pin(&config, &sorted, "size", Some(ColumnPinPosition::Right));
        assert_eq!(pinned.get("size").unwrap().fix, Some(ColumnPinPosition::Right));

        let unpinned = toggle_single_column_pin(&pinned, &sorted, "size", Some(ColumnPinPosition::Right));
        assert_eq!(unpinned, config);

        // Pinning a hidden column shows it.
        let hidden = toggle_single_column_visibility(&config, &sorted, "name");
        let pinned = toggle_single_column_pin(&hidden, &sorted, "name", Some(ColumnPinPosition::Left));
        assert!(pinned.get("name").unwrap().is_visible);
    }

    #[test]
    fn test_always_pinned_column_keeps_pin() {
        let (config, sorted) = setup();
        for fix in [None, Some(ColumnPinPosition::Left), Some(ColumnPinPosition::Right)] {
            let next = toggle_single_column_pin(&config, &sorted, "id", fix);
            assert_eq!(next.get("id"), config.get("id"));
        }
    }

    #[test]
    fn test_toggle_all_skips_exempt_columns() {
        let (config, sorted) = setup();
        let none = toggle_all_columns_visibility(&config, &sorted, false);
        assert!(none.get("id").unwrap().is_visible);
        assert!(none.get("hidden").unwrap().is_visible);
        assert!(!none.get("name").unwrap().is_visible);
        assert!(!none.get("size").unwrap().is_visible);

        let all = toggle_all_columns_visibility(&none, &sorted, true);
        assert_eq!(all, config);
    }

    #[test]
    fn test_move_adopts_target_group() {
        let (config, _) = setup();
        let size = config.get("size").unwrap();
        let target = ColumnConfig {
            is_visible: true,
            fix: Some(ColumnPinPosition::Right),
            order: "m".into(),
            width: None,
        };

        let moved = move_column_relative_to_another_column(size, &target, None, None, DropPosition::After);
        assert_eq!(moved.fix, Some(ColumnPinPosition::Right));
        assert!(moved.order.as_str() > "m");
        assert_eq!(moved.width, size.width);

        let moved = move_column_relative_to_another_column(size, &target, None, None, DropPosition::Before);
        assert!(moved.order.as_str() < "m");
    }

    #[test]
    fn test_move_next_to_tied_neighbour_keeps_side() {
        let (config, _) = setup();
        let size = config.get("size").unwrap();
        let tied = |order: &str| ColumnConfig {
            is_visible: true,
            fix: None,
            order: order.into(),
            width: None,
        };
        let target = tied("n");

        let before = move_column_relative_to_another_column(
            size,
            &target,
            Some(&tied("n")),
            Some(&tied("t")),
            DropPosition::Before,
        );
        assert!(before.order.as_str() < "n", "{}", before.order);

        let after = move_column_relative_to_another_column(
            size,
            &target,
            Some(&tied("g")),
            Some(&tied("n")),
            DropPosition::After,
        );
        assert!(after.order.as_str() > "n", "{}", after.order);
    }
}
