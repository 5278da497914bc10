//! Cartesian product of matrix axes.

use std::collections::BTreeMap;

use crate::error::ExpandError;

/// One `(axis, value)` pair per axis, axes in name order.
pub type Combination<'a> = Vec<(&'a str, &'a str)>;

/// Every combination of axis values, last axis varying fastest. No axes gives
/// a single empty combination.
pub fn combinations(
    axes: &BTreeMap<String, Vec<String>>,
    limit: usize,
) -> Result<Vec<Combination<'_>>, ExpandError> {
    let mut count: usize = 1;
    for (axis, values) in axes {
        if values.is_empty() {
            return Err(ExpandError::EmptyEnumeration(format!("matrix axis {axis}")));
        }
        count = count.saturating_mul(values.len());
    }
    if count > limit {
        return Err(ExpandError::TooManyInstances { count, max: limit });
    }

    let mut out: Vec<Combination<'_>> = vec![Vec::new()];
    for (axis, values) in axes {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |value| {
                    let mut combo = prefix.clone();
                    combo.push((axis.as_str(), value.as_str()));
                    combo
                })
            })
            .collect();
    }
    Ok(out)
}
