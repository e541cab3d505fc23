//! Transformer trait for per-item reshaping

use eyre::Result;

/// Transformer trait for transforming data items
///
/// Used for record-level reshaping between extraction and load, such as
/// flattening nested keys or stamping ingestion metadata.
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform multiple items, preserving order
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Negate;

    impl Transformer for Negate {
        type Input = i64;
        type Output = i64;

        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            Ok(-input)
        }
    }

    #[test]
    fn test_transform_many_preserves_order() {
        let output = Negate.transform_many(vec![1, 2, 3]).unwrap();
        assert_eq!(output, vec![-1, -2, -3]);
    }
}
