use anyhow::Result;
use itertools::Itertools;

use crate::prelude::{ModelActionType, QlError};

/// Dense value table for tabular Q-learning.
///
/// Logically a multi-dimensional array of shape `state_shape + [num_actions]`,
/// stored flattened in row-major order. The shape is fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    state_shape: Vec<usize>,
    num_actions: usize,
    strides: Vec<usize>,
    values: Vec<f32>,
}

impl QTable {
    /// Zero-initialized table
    pub fn new(
        state_shape: &[usize],
        num_actions: ModelActionType,
    ) -> Result<Self> {
        let num_actions = num_actions as usize;
        let len = checked_len(state_shape, num_actions)?;
        Ok(Self {
            state_shape: state_shape.to_vec(),
            num_actions,
            strides: row_strides(state_shape, num_actions),
            values: vec![0.0; len],
        })
    }

    /// Rebuilds a table from its raw parts (e.g. after deserialization)
    pub fn from_parts(
        state_shape: Vec<usize>,
        num_actions: usize,
        values: Vec<f32>,
    ) -> Result<Self> {
        let expected_len = checked_len(&state_shape, num_actions)?;
        if values.len() != expected_len {
            return Err(QlError(format!(
                "value table of shape {:?}x{} needs {} values, got {}",
                state_shape, num_actions, expected_len, values.len()
            )))?;
        }
        let strides = row_strides(&state_shape, num_actions);
        Ok(Self {
            state_shape,
            num_actions,
            strides,
            values,
        })
    }

    pub fn state_shape(&self) -> &[usize] { &self.state_shape }

    pub fn num_actions(&self) -> usize { self.num_actions }

    pub fn values(&self) -> &[f32] { &self.values }

    /// Checks that this table fits an environment with the given state shape and action space
    pub fn ensure_shape(
        &self,
        state_shape: &[usize],
        num_actions: ModelActionType,
    ) -> Result<()> {
        if self.state_shape != state_shape || self.num_actions != num_actions as usize {
            return Err(QlError(format!(
                "value table shape mismatch: table is {:?}x{}, environment requires {:?}x{}",
                self.state_shape, self.num_actions, state_shape, num_actions
            )))?;
        }
        Ok(())
    }

    /// Action values of one state
    ///
    /// # Panics
    /// When `state` does not fit the table's state shape.
    pub fn row(
        &self,
        state: &[usize],
    ) -> &[f32] {
        let offset = self.row_offset(state);
        &self.values[offset..offset + self.num_actions]
    }

    pub fn get(
        &self,
        state: &[usize],
        action: ModelActionType,
    ) -> f32 {
        self.values[self.cell_offset(state, action)]
    }

    pub fn set(
        &mut self,
        state: &[usize],
        action: ModelActionType,
        value: f32,
    ) {
        let offset = self.cell_offset(state, action);
        self.values[offset] = value;
    }

    pub fn max_value(
        &self,
        state: &[usize],
    ) -> f32 {
        self.row(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Action with the highest value; the first one wins on ties
    pub fn best_action(
        &self,
        state: &[usize],
    ) -> ModelActionType {
        let row = self.row(state);
        let best = row
            .iter()
            .enumerate()
            .fold(0, |best, (i, &v)| if v > row[best] { i } else { best });
        best as ModelActionType
    }

    fn row_offset(
        &self,
        state: &[usize],
    ) -> usize {
        assert_eq!(
            state.len(),
            self.state_shape.len(),
            "state {:?} does not match value table dimensions {:?}",
            state,
            self.state_shape
        );
        state
            .iter()
            .zip(self.state_shape.iter())
            .zip(self.strides.iter())
            .map(|((&idx, &dim), &stride)| {
                assert!(
                    idx < dim,
                    "state {:?} out of value table bounds {:?}",
                    state,
                    self.state_shape
                );
                idx * stride
            })
            .sum()
    }

    fn cell_offset(
        &self,
        state: &[usize],
        action: ModelActionType,
    ) -> usize {
        assert!(
            (action as usize) < self.num_actions,
            "action {} out of range (action space: {})",
            action,
            self.num_actions
        );
        self.row_offset(state) + action as usize
    }
}

/// Number of cells of a table with the given shape
fn checked_len(
    state_shape: &[usize],
    num_actions: usize,
) -> Result<usize> {
    let invalid = || QlError(format!("invalid value table shape [{}]x{}", state_shape.iter().join(","), num_actions));
    if state_shape.is_empty() || state_shape.contains(&0) || num_actions == 0 {
        return Err(invalid())?;
    }
    state_shape
        .iter()
        .try_fold(num_actions, |len, &dim| len.checked_mul(dim))
        .ok_or_else(|| invalid().into())
}

/// row-major strides of the state dimensions; the action dimension is the innermost one
fn row_strides(
    state_shape: &[usize],
    num_actions: usize,
) -> Vec<usize> {
    let mut strides = vec![0; state_shape.len()];
    let mut stride = num_actions;
    for (i, &dim) in state_shape.iter().enumerate().rev() {
        strides[i] = stride;
        stride *= dim;
    }
    strides
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_new_table_is_zero() -> Result<()> {
        let table = QTable::new(&[5, 5, 2, 2, 5], 3)?;
        assert_eq!(table.values().len(), 5 * 5 * 2 * 2 * 5 * 3);
        assert!(table.values().iter().all(|&v| v == 0.0));
        assert_eq!(table.row(&[4, 4, 1, 1, 4]), &[0.0, 0.0, 0.0]);
        Ok(())
    }

    #[rstest]
    #[case(&[], 3)]
    #[case(&[3, 0], 3)]
    #[case(&[3, 3], 0)]
    fn test_invalid_shape(
        #[case] shape: &[usize],
        #[case] num_actions: ModelActionType,
    ) {
        assert!(QTable::new(shape, num_actions).is_err());
    }

    #[test]
    fn test_cells_are_distinct() -> Result<()> {
        let mut table = QTable::new(&[2, 3], 2)?;
        let mut counter = 0.0;
        for x in 0..2 {
            for y in 0..3 {
                for a in 0..2 {
                    counter += 1.0;
                    table.set(&[x, y], a, counter);
                }
            }
        }
        // row-major: last state dimension and then the action vary fastest
        assert_eq!(table.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        assert_eq!(table.get(&[1, 0], 1), 8.0);
        assert_eq!(table.row(&[0, 2]), &[5.0, 6.0]);
        Ok(())
    }

    #[rstest]
    #[case(&[0.0, 0.0, 0.0], 0)]
    #[case(&[1.0, 3.0, 3.0], 1)]
    #[case(&[-1.0, -3.0, -0.5], 2)]
    fn test_best_action_first_max_wins(
        #[case] row: &[f32],
        #[case] expected: ModelActionType,
    ) -> Result<()> {
        let mut table = QTable::new(&[1], 3)?;
        for (a, &v) in row.iter().enumerate() {
            table.set(&[0], a as ModelActionType, v);
        }
        assert_eq!(table.best_action(&[0]), expected);
        Ok(())
    }

    #[test]
    fn test_max_value() -> Result<()> {
        let mut table = QTable::new(&[2], 3)?;
        table.set(&[1], 0, -4.0);
        table.set(&[1], 1, -2.0);
        table.set(&[1], 2, -3.0);
        assert_eq!(table.max_value(&[1]), -2.0);
        assert_eq!(table.max_value(&[0]), 0.0);
        Ok(())
    }

    #[test]
    #[should_panic(expected = "out of value table bounds")]
    fn test_out_of_bounds_state_is_fatal() {
        let table = QTable::new(&[5, 5], 3).unwrap();
        table.row(&[5, 0]);
    }

    #[test]
    #[should_panic(expected = "does not match value table dimensions")]
    fn test_wrong_dimension_count_is_fatal() {
        let table = QTable::new(&[5, 5], 3).unwrap();
        table.row(&[1, 1, 1]);
    }

    #[test]
    #[should_panic(expected = "action 3 out of range")]
    fn test_out_of_range_action_is_fatal() {
        let table = QTable::new(&[5], 3).unwrap();
        table.get(&[0], 3);
    }

    #[test]
    fn test_from_parts_checks_len() {
        assert!(QTable::from_parts(vec![2, 2], 3, vec![0.0; 12]).is_ok());
        assert!(QTable::from_parts(vec![2, 2], 3, vec![0.0; 11]).is_err());
    }

    #[test]
    fn test_from_parts_rejects_overflowing_shape() {
        assert!(QTable::from_parts(vec![1 << 33, 1 << 33], 3, vec![]).is_err());
        assert!(QTable::from_parts(vec![usize::MAX], 2, vec![]).is_err());
    }

    #[test]
    fn test_ensure_shape() -> Result<()> {
        let table = QTable::new(&[5, 5, 2, 2, 5], 3)?;
        assert!(table.ensure_shape(&[5, 5, 2, 2, 5], 3).is_ok());
        assert!(table.ensure_shape(&[8, 8, 2, 2, 8], 3).is_err());
        assert!(table.ensure_shape(&[5, 5, 2, 2, 5], 4).is_err());
        Ok(())
    }
}
