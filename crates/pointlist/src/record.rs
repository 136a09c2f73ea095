//! Single point-list records.

use std::fmt;

use ndarray::{ArrayBase, Data, Ix2};

/// One `(x, y, value)` line of a point-list file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRecord<T> {
    pub x: f64,
    pub y: f64,
    pub value: T,
}

impl<T: fmt::Display> fmt::Display for PointRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.value)
    }
}

/// Iterate over the records of a field in file order: columns outer, rows
/// inner.
///
/// The field must have shape `(y.len(), x.len())`.
pub fn point_records<'a, T, S>(
    x: &'a [f64],
    y: &'a [f64],
    data: &'a ArrayBase<S, Ix2>,
) -> impl Iterator<Item = PointRecord<T>> + 'a
where
    T: Copy + 'a,
    S: Data<Elem = T> + 'a,
{
    x.iter().enumerate().flat_map(move |(j, &xj)| {
        y.iter().enumerate().map(move |(i, &yi)| PointRecord {
            x: xj,
            y: yi,
            value: data[[i, j]],
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_record_display() {
        let record = PointRecord {
            x: -205000.0,
            y: -2275000.5,
            value: 12.25_f32,
        };
        assert_eq!(record.to_string(), "-205000 -2275000.5 12.25");
    }

    #[test]
    fn test_records_are_column_major() {
        let data = array![[1, 2, 3], [4, 5, 6]];
        let x = [10.0, 20.0, 30.0];
        let y = [0.0, 1.0];

        let values: Vec<i32> = point_records(&x, &y, &data).map(|r| r.value).collect();
        assert_eq!(values, vec![1, 4, 2, 5, 3, 6]);

        let first_column: Vec<(f64, f64)> = point_records(&x, &y, &data)
            .take(2)
            .map(|r| (r.x, r.y))
            .collect();
        assert_eq!(first_column, vec![(10.0, 0.0), (10.0, 1.0)]);
    }
}
