//! Paginated extraction of every brewery

use super::Record;
use crate::client::PageSource;
use crate::config::FetchConfig;
use crate::error::Result;
use crate::etl::Extractor;

use std::time::Duration;

/// Pages through a [`PageSource`] until it returns an empty page
///
/// Pages are requested strictly in order starting at 1. Fetching stops at the
/// first empty page, or once `max_pages` pages have been read. Any failing
/// request aborts the whole extraction; records from earlier pages are
/// discarded with it.
pub struct BreweriesExtractor<S> {
    source: S,
    per_page: u32,
    max_pages: Option<u32>,
    delay: Duration,
}

impl<S: PageSource> BreweriesExtractor<S> {
    pub fn new(source: S, config: &FetchConfig) -> Self {
        Self {
            source,
            per_page: config.per_page,
            max_pages: config.max_pages,
            delay: config.delay,
        }
    }

    /// Fetch all pages and return their records in page order
    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            if self.max_pages.is_some_and(|max| page > max) {
                log::info!("Reached page cap of {}", page - 1);
                break;
            }

            let rows = self.source.fetch_page(page, self.per_page).await?;
            if rows.is_empty() {
                log::debug!("Page {} is empty, stopping", page);
                break;
            }

            log::info!("Page {}: {} record(s)", page, rows.len());
            records.extend(rows);
            page += 1;

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        Ok(records)
    }
}

impl<S: PageSource> Extractor for BreweriesExtractor<S> {
    type Item = Record;

    async fn extract(&self) -> eyre::Result<Vec<Self::Item>> {
        let records = self.fetch_all().await?;
        log::info!("Extracted {} brewery record(s)", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves `sizes[i]` records for page i+1 and records each request
    struct CannedPages {
        sizes: Vec<usize>,
        requests: Mutex<Vec<(u32, u32)>>,
        fail_on: Option<u32>,
    }

    impl CannedPages {
        fn new(sizes: Vec<usize>) -> Self {
            Self {
                sizes,
                requests: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn requested_pages(&self) -> Vec<u32> {
            self.requests.lock().unwrap().iter().map(|(p, _)| *p).collect()
        }
    }

    impl PageSource for CannedPages {
        async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Record>> {
            self.requests.lock().unwrap().push((page, per_page));
            if self.fail_on == Some(page) {
                return Err(EtlError::Shape("expected a list, got an object".into()));
            }
            let size = self.sizes.get(page as usize - 1).copied().unwrap_or(0);
            Ok((0..size)
                .map(|i| {
                    let mut record = Record::new();
                    record.insert("id".into(), json!(format!("{}-{}", page, i)));
                    record
                })
                .collect())
        }
    }

    fn config(per_page: u32, max_pages: Option<u32>) -> FetchConfig {
        FetchConfig {
            per_page,
            max_pages,
            delay: Duration::ZERO,
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_empty_page() {
        let source = CannedPages::new(vec![3, 3, 1, 0, 5]);
        let extractor = BreweriesExtractor::new(source, &config(3, None));

        let records = extractor.fetch_all().await.unwrap();

        assert_eq!(records.len(), 7);
        assert_eq!(extractor.source.requested_pages(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_preserves_page_order() {
        let source = CannedPages::new(vec![2, 1]);
        let extractor = BreweriesExtractor::new(source, &config(2, None));

        let ids: Vec<String> = extractor
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(ids, vec!["1-0", "1-1", "2-0"]);
    }

    #[tokio::test]
    async fn test_page_size_is_forwarded() {
        for per_page in [1, 7, 200] {
            let source = CannedPages::new(vec![1]);
            let extractor = BreweriesExtractor::new(source, &config(per_page, None));
            extractor.fetch_all().await.unwrap();
            let requests = extractor.source.requests.lock().unwrap().clone();
            assert!(requests.iter().all(|(_, p)| *p == per_page));
        }
    }

    #[tokio::test]
    async fn test_respects_page_cap() {
        let source = CannedPages::new(vec![5, 5, 5, 5]);
        let extractor = BreweriesExtractor::new(source, &config(5, Some(2)));

        let records = extractor.fetch_all().await.unwrap();

        assert_eq!(records.len(), 10);
        assert_eq!(extractor.source.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_zero_page_cap_requests_nothing() {
        let source = CannedPages::new(vec![5]);
        let extractor = BreweriesExtractor::new(source, &config(5, Some(0)));

        assert!(extractor.fetch_all().await.unwrap().is_empty());
        assert!(extractor.source.requested_pages().is_empty());
    }

    #[tokio::test]
    async fn test_error_aborts_fetch() {
        let mut source = CannedPages::new(vec![2, 2, 2]);
        source.fail_on = Some(2);
        let extractor = BreweriesExtractor::new(source, &config(2, None));

        let err = extractor.fetch_all().await.unwrap_err();

        assert!(matches!(err, EtlError::Shape(_)));
        assert_eq!(extractor.source.requested_pages(), vec![1, 2]);
    }
}
