//! Column width distribution

use crate::error::{LayoutError, Result};
use report_model::{ColumnSpec, TruncationPolicy};
use serde::Serialize;

/// Absolute placement of one visible column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnGeometry {
    /// Index of the column in the full column list (and in each row's cells)
    pub index: usize,
    pub key: String,
    pub header_label: String,
    /// Left edge
    pub x: f64,
    pub width: f64,
    pub truncation: TruncationPolicy,
}

impl ColumnGeometry {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Weight used for layout; anything that is not a positive number hides the column
fn effective_weight(column: &ColumnSpec) -> f64 {
    if column.weight.is_finite() && column.weight >= 0.0 {
        column.weight
    } else {
        tracing::warn!(
            "Column '{}' has unusable weight {}, hiding it",
            column.key,
            column.weight
        );
        0.0
    }
}

/// Split `width` among the visible columns in proportion to their weights
///
/// Edges are computed from cumulative weights and the last visible column
/// ends exactly at `left + width`, so the widths always add up to `width`.
pub fn distribute_columns(columns: &[ColumnSpec], left: f64, width: f64) -> Result<Vec<ColumnGeometry>> {
    let weights: Vec<f64> = columns.iter().map(effective_weight).collect();
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return Err(LayoutError::NoVisibleColumns);
    }

    let last_visible = weights.iter().rposition(|w| *w > 0.0);
    let mut geometry = Vec::new();
    let mut cumulative = 0.0;

    for (index, (column, weight)) in columns.iter().zip(&weights).enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        let x = left + width * cumulative / total;
        cumulative += weight;
        let right = if Some(index) == last_visible {
            left + width
        } else {
            left + width * cumulative / total
        };

        geometry.push(ColumnGeometry {
            index,
            key: column.key.clone(),
            header_label: column.header_label.clone(),
            x,
            width: right - x,
            truncation: column.truncation,
        });
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(key: &str, weight: f64) -> ColumnSpec {
        ColumnSpec::new(key, key.to_uppercase(), weight)
    }

    #[test]
    fn test_proportional_widths() {
        let columns = vec![spec("a", 1.0), spec("b", 3.0)];
        let geometry = distribute_columns(&columns, 40.0, 400.0).unwrap();
        assert_eq!(geometry.len(), 2);
        assert_eq!(geometry[0].x, 40.0);
        assert_eq!(geometry[0].width, 100.0);
        assert_eq!(geometry[1].x, 140.0);
        assert_eq!(geometry[1].right(), 440.0);
    }

    #[test]
    fn test_zero_weight_hides_column() {
        let columns = vec![spec("a", 1.0), spec("hidden", 0.0), spec("c", 1.0)];
        let geometry = distribute_columns(&columns, 0.0, 100.0).unwrap();
        let indices: Vec<usize> = geometry.iter().map(|g| g.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(geometry[1].width, 50.0);
    }

    #[test]
    fn test_invalid_weights_hide_column() {
        let columns = vec![spec("a", f64::NAN), spec("b", -2.0), spec("c", 1.0)];
        let geometry = distribute_columns(&columns, 0.0, 100.0).unwrap();
        assert_eq!(geometry.len(), 1);
        assert_eq!(geometry[0].key, "c");
        assert_eq!(geometry[0].width, 100.0);
    }

    #[test]
    fn test_no_visible_columns() {
        let columns = vec![spec("a", 0.0)];
        assert!(matches!(
            distribute_columns(&columns, 0.0, 100.0),
            Err(LayoutError::NoVisibleColumns)
        ));
        assert!(distribute_columns(&[], 0.0, 100.0).is_err());
    }

    #[test]
    fn test_widths_sum_exactly() {
        let columns = vec![spec("a", 0.7), spec("b", 1.3), spec("c", 2.9), spec("d", 0.1)];
        let geometry = distribute_columns(&columns, 36.0, 523.276).unwrap();
        let total: f64 = geometry.iter().map(|g| g.width).sum();
        assert!((total - 523.276).abs() < 1e-9);
        for pair in geometry.windows(2) {
            assert!((pair[0].right() - pair[1].x).abs() < 1e-9);
        }
    }
}
