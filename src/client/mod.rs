//! Open Brewery DB API client
//!
//! [`PageSource`] is the seam between paging logic and HTTP: the
//! [`OpenBreweryClient`] implements it over reqwest, and tests substitute
//! canned pages.

mod openbrewerydb;

pub use openbrewerydb::OpenBreweryClient;

use crate::breweries::Record;
use crate::error::Result;

/// A source of numbered record pages
pub trait PageSource: Send + Sync {
    /// Fetch one page of records. Pages are 1-based; an empty page marks the
    /// end of the data set.
    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send;
}

impl<T: PageSource> PageSource for &T {
    fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Record>>> + Send {
        (**self).fetch_page(page, per_page)
    }
}
