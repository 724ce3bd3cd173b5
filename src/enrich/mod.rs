//! Listing enrichment: site-by-site photo search merged into a valuation record.

pub(crate) mod aggregate;
mod merge;

pub use aggregate::collect_candidates;
pub use merge::{MergePolicy, merge_listings};

use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::image_search::SiteSearcher;
use crate::valuation::{ValuationError, ValuationModel};
use crate::vehicle::{self, ValuationRecord};

/// Replaces the record's listings with photo-backed ones. Never fails:
/// search problems only shrink the listings, down to none.
pub async fn enrich_record(
    searcher: &impl SiteSearcher,
    config: &SearchConfig,
    mut record: ValuationRecord,
) -> ValuationRecord {
    let subject = vehicle::subject(record.year, &record.make, &record.model);
    let candidates = if subject.is_empty() {
        warn!("valuation record has no year/make/model; skipping photo search");
        Vec::new()
    } else {
        collect_candidates(searcher, &subject, &config.sites, config.quota).await
    };

    let listings = std::mem::take(&mut record.listings);
    record.listings = merge_listings(config.merge_policy, listings, candidates, &subject);
    record
}

/// Values a free-text vehicle description and enriches the result.
pub async fn find_cars(
    model: &impl ValuationModel,
    searcher: &impl SiteSearcher,
    config: &SearchConfig,
    search_term: &str,
) -> Result<ValuationRecord, ValuationError> {
    let record = model.value_by_description(search_term).await?;
    info!(make = %record.make, model = %record.model, year = ?record.year, "valuation received");
    Ok(enrich_record(searcher, config, record).await)
}

/// Values a vehicle photo (as a data URL) and enriches the result.
pub async fn appraise_photo(
    model: &impl ValuationModel,
    searcher: &impl SiteSearcher,
    config: &SearchConfig,
    data_url: &str,
) -> Result<ValuationRecord, ValuationError> {
    let record = model.value_by_photo(data_url).await?;
    info!(make = %record.make, model = %record.model, year = ?record.year, "photo valuation received");
    Ok(enrich_record(searcher, config, record).await)
}
