use crate::models::PriceTable;

/// Rebase each column so its first valid value becomes 100
///
/// Disabled is the identity. A column whose first valid value is zero,
/// or which has no valid value, becomes entirely missing; that is a
/// defined "no normalizable data" state per column, not an error.
pub fn normalize(table: &PriceTable, enabled: bool) -> PriceTable {
    if !enabled {
        return table.clone();
    }

    let mut out = PriceTable::new(table.dates.clone());
    for column in &table.columns {
        let base = column.values.iter().flatten().next().copied();

        let values = match base {
            Some(v0) if v0 != 0.0 => column
                .values
                .iter()
                .map(|value| value.map(|v| v / v0 * 100.0))
                .collect(),
            _ => vec![None; column.values.len()],
        };

        out.push_column(column.symbol.clone(), values);
    }

    out
}
