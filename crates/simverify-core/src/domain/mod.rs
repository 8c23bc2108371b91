pub mod errors;

pub use errors::{EvalResult, VerifyError, VerifyErrorCategory};

use serde::{Deserialize, Serialize};

/// An ordered sequence of `(x, y)` samples for one channel. The x domain is
/// whatever independent variable the channel was recorded against and is not
/// assumed monotonic; several evaluators tolerate negative or reversed
/// domains.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XySeries {
    points: Vec<[f64; 2]>,
}

impl XySeries {
    pub fn new(points: Vec<[f64; 2]>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<[f64; 2]> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<[f64; 2]> {
        self.points.last().copied()
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.points.push([x, y]);
    }

    pub fn extend_from(&mut self, other: &XySeries) {
        self.points.extend_from_slice(&other.points);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &[f64; 2]> {
        self.points.iter()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|point| point[0]).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|point| point[1]).collect()
    }
}

/// The comparable value a test evaluation produces. Serialized untagged so a
/// results artifact reads as a plain number, `[x, y]` pair, or list of pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComputedValue {
    Scalar(f64),
    Pair([f64; 2]),
    Table(Vec<[f64; 2]>),
}

#[cfg(test)]
mod tests {
    use super::{ComputedValue, XySeries};

    #[test]
    fn series_accessors_split_columns() {
        let series = XySeries::new(vec![[0.0, 1.0], [0.5, 2.0], [1.0, 4.0]]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.xs(), vec![0.0, 0.5, 1.0]);
        assert_eq!(series.ys(), vec![1.0, 2.0, 4.0]);
        assert_eq!(series.last(), Some([1.0, 4.0]));
    }

    #[test]
    fn computed_values_serialize_untagged() {
        let scalar = serde_json::to_string(&ComputedValue::Scalar(42.0)).unwrap();
        assert_eq!(scalar, "42.0");

        let pair = serde_json::to_string(&ComputedValue::Pair([0.5, 1.0])).unwrap();
        assert_eq!(pair, "[0.5,1.0]");

        let table =
            serde_json::to_string(&ComputedValue::Table(vec![[0.5, 1.0], [1.5, 3.0]])).unwrap();
        assert_eq!(table, "[[0.5,1.0],[1.5,3.0]]");
    }

    #[test]
    fn pair_deserializes_before_table() {
        let value: ComputedValue = serde_json::from_str("[0.5,1.0]").unwrap();
        assert_eq!(value, ComputedValue::Pair([0.5, 1.0]));
    }
}
