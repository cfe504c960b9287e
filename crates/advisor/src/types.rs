use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::db::ProfileDb;
use crate::transcript::{ParseCache, PdfTextExtractor, PlainTextExtractor, TextExtractor};

/// State shared by every request handler.
pub struct AppState {
    pub config: ServiceConfig,
    pub profile_db: ProfileDb,
    pub parse_cache: ParseCache,
    /// Extractor used for `application/pdf` uploads
    pub pdf_extractor: Arc<dyn TextExtractor>,
    /// Extractor used for `text/plain` uploads
    pub text_extractor: Arc<dyn TextExtractor>,
}

impl AppState {
    pub fn new(config: ServiceConfig, profile_db: ProfileDb) -> Self {
        let parse_cache = ParseCache::new(config.parse_cache_ttl(), config.parse_cache_capacity);
        Self {
            config,
            profile_db,
            parse_cache,
            pdf_extractor: Arc::new(PdfTextExtractor),
            text_extractor: Arc::new(PlainTextExtractor),
        }
    }
}
