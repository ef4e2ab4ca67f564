// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use tabled::{settings::Style, Table, Tabled};

/// Renders `rows` as a rounded table, or `empty` when there are none.
pub(crate) fn render<T: Tabled>(rows: Vec<T>, empty: &str) -> String {
    if rows.is_empty() {
        empty.to_owned()
    } else {
        Table::new(rows).with(Style::rounded()).to_string()
    }
}

/// The rows of `items` that match `query`, or all of them without one.
pub(crate) fn filtered<'item, T>(
    items: &'item [T],
    query: Option<&str>,
    matches: impl Fn(&T, &str) -> bool,
) -> Vec<&'item T> {
    match query.map(str::trim).filter(|query| !query.is_empty()) {
        Some(query) => items.iter().filter(|item| matches(item, query)).collect(),
        None => items.iter().collect(),
    }
}
