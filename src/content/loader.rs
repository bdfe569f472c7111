//! Content loading policy: custom books are served from the local cache
//! when possible and written back after a gateway fetch; featured books
//! always come from the gateway. Cache trouble never fails a load.

use std::sync::Arc;
use tracing::{debug, warn};

use super::cache::ContentCache;
use super::{BookContent, BookType, ChapterContent};
use crate::error::{ReaderError, ReaderResult};
use crate::gateway::ContentGateway;

#[derive(Clone)]
pub struct ContentLoader {
    gateway: Arc<dyn ContentGateway>,
    cache: Option<Arc<ContentCache>>,
}

impl ContentLoader {
    pub fn new(gateway: Arc<dyn ContentGateway>, cache: Option<Arc<ContentCache>>) -> Self {
        Self { gateway, cache }
    }

    pub fn gateway(&self) -> &Arc<dyn ContentGateway> {
        &self.gateway
    }

    pub async fn load_book(
        &self,
        book_id: &str,
        book_type: BookType,
        title: Option<&str>,
    ) -> ReaderResult<BookContent> {
        if book_id.is_empty() && title.is_none_or(str::is_empty) {
            return Err(ReaderError::content("No book specified"));
        }

        let cache = self.cache.as_deref().filter(|_| book_type == BookType::Custom);

        if let Some(cache) = cache {
            match cache.get(book_id) {
                Ok(Some(content)) => {
                    debug!("Book {} loaded from cache", book_id);
                    return Ok(content);
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to load {} from cache, falling back to server: {}", book_id, e),
            }
        }

        let content = self.gateway.fetch_content(book_id, book_type, title).await?;

        if let Some(cache) = cache {
            if let Err(e) = cache.put(book_id, &content) {
                warn!("Failed to cache book {}: {}", book_id, e);
            }
        }

        Ok(content)
    }

    pub async fn load_chapter(
        &self,
        book_id: &str,
        chapter_id: &str,
        book_type: BookType,
    ) -> ReaderResult<ChapterContent> {
        let cache = self.cache.as_deref().filter(|_| book_type == BookType::Custom);

        if let Some(cache) = cache {
            match cache.get_chapter(book_id, chapter_id) {
                Ok(Some(chapter)) => {
                    debug!("Chapter {} of {} loaded from cache", chapter_id, book_id);
                    return Ok(chapter);
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to load chapter {} from cache: {}", chapter_id, e),
            }
        }

        let chapter = self.gateway.fetch_chapter(book_id, chapter_id).await?;

        if let Some(cache) = cache {
            if let Err(e) = cache.put_chapter(book_id, &chapter) {
                warn!("Failed to cache chapter {} of {}: {}", chapter_id, book_id, e);
            }
        }

        Ok(chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;

    fn setup() -> (Arc<MemoryGateway>, Arc<ContentCache>, ContentLoader) {
        let gateway = Arc::new(
            MemoryGateway::new().with_book("b1", BookContent::from_text("one two three")),
        );
        let cache = Arc::new(ContentCache::open_in_memory().unwrap());
        let loader = ContentLoader::new(gateway.clone(), Some(cache.clone()));
        (gateway, cache, loader)
    }

    #[tokio::test]
    async fn test_missing_identifier_is_unavailable() {
        let (_, _, loader) = setup();
        let err = loader.load_book("", BookType::Featured, None).await.unwrap_err();
        assert!(matches!(err, ReaderError::ContentUnavailable(_)));
    }

    #[tokio::test]
    async fn test_custom_book_cached_after_fetch() {
        let (gateway, cache, loader) = setup();

        let first = loader.load_book("b1", BookType::Custom, None).await.unwrap();
        assert!(cache.contains("b1").unwrap());
        let second = loader.load_book("b1", BookType::Custom, None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(gateway.fetch_log(), vec!["b1"]);
    }

    #[tokio::test]
    async fn test_featured_book_bypasses_cache() {
        let (gateway, cache, loader) = setup();

        loader.load_book("b1", BookType::Featured, None).await.unwrap();
        loader.load_book("b1", BookType::Featured, None).await.unwrap();

        assert!(!cache.contains("b1").unwrap());
        assert_eq!(gateway.fetch_log().len(), 2);
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let (_, _, loader) = setup();
        let err = loader.load_book("nope", BookType::Custom, None).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
