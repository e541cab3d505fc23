//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use brewery_etl::breweries::RawRowBuilder;
/// use brewery_etl::etl::Pipeline;
/// use brewery_etl::storage::NdjsonReader;
/// use brewery_etl::warehouse::{LoadMode, RawTableLoader};
///
/// # async fn example() -> eyre::Result<()> {
/// let pipeline = Pipeline::new(
///     NdjsonReader::new("data/raw/breweries_20240501_120000.jsonl"),
///     RawRowBuilder::now(),
///     RawTableLoader::new("data/breweries.db", "raw_breweries", LoadMode::Replace),
/// );
///
/// let count = pipeline.run().await?;
/// println!("Reloaded {} rows", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Extract, transform and load once, returning the number of items loaded
    ///
    /// An empty extraction still reaches the loader, so a destination that
    /// replaces its contents is emptied rather than left stale.
    ///
    /// # Errors
    /// The first failing stage aborts the run; later stages do not start
    pub async fn run(&self) -> Result<usize> {
        let items = self.extractor.extract().await?;
        log::debug!("Extracted {} item(s)", items.len());

        let transformed = self.transformer.transform_many(items)?;
        log::debug!("Transformed {} item(s)", transformed.len());

        let count = self.loader.load(transformed).await?;
        log::debug!("Loaded {} item(s)", count);

        Ok(count)
    }
}
