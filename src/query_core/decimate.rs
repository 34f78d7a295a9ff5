//! Row-index decimation

/// Keep every `stride`-th row starting at index 0, preserving order.
///
/// This is decimation, not aggregation: bucket boundaries follow row indices,
/// not calendar time. A stride of 0 is treated as 1.
pub fn decimate<T>(rows: Vec<T>, stride: usize) -> Vec<T> {
    if stride <= 1 {
        return rows;
    }
    rows.into_iter().step_by(stride).collect()
}
