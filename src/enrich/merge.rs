use clap::ValueEnum;

use crate::image_search::Candidate;
use crate::vehicle::Listing;

pub const PRICE_PLACEHOLDER: &str = "Click for Price";
pub const MILEAGE_PLACEHOLDER: &str = "View Listing for Details";

/// How search candidates are combined with the model's listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MergePolicy {
    /// Keep the model's price/mileage and attach photos by position.
    /// Listings without a matching candidate are dropped.
    Overlay,
    /// Discard the model's listings and build one per candidate.
    #[default]
    Replace,
}

/// Produces the final listings. The result never has more entries than
/// `candidates`, and every URL in it comes from a candidate.
pub fn merge_listings(
    policy: MergePolicy,
    listings: Vec<Listing>,
    candidates: Vec<Candidate>,
    subject: &str,
) -> Vec<Listing> {
    match policy {
        MergePolicy::Overlay => overlay(listings, candidates),
        MergePolicy::Replace => replace(candidates, subject),
    }
}

fn overlay(listings: Vec<Listing>, candidates: Vec<Candidate>) -> Vec<Listing> {
    listings
        .into_iter()
        .zip(candidates)
        .map(|(listing, candidate)| Listing {
            image_url: Some(candidate.image_url),
            source_url: Some(candidate.source_url),
            ..listing
        })
        .collect()
}

fn replace(candidates: Vec<Candidate>, subject: &str) -> Vec<Listing> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| Listing {
            id: Some(format!("listing-{}", i + 1).into()),
            title: candidate
                .title
                .unwrap_or_else(|| format!("{subject} for sale")),
            price: PRICE_PLACEHOLDER.to_string(),
            mileage: MILEAGE_PLACEHOLDER.to_string(),
            image_url: Some(candidate.image_url),
            source_url: Some(candidate.source_url),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_listing(n: u32) -> Listing {
        Listing {
            id: Some(n.into()),
            title: format!("AI listing {n}"),
            price: format!("${n}0,000"),
            mileage: format!("{n},000 miles"),
            image_url: Some("https://placeholder.example/car.jpg".into()),
            source_url: None,
        }
    }

    fn candidate(n: u32, title: Option<&str>) -> Candidate {
        Candidate {
            image_url: format!("https://img.example/{n}.jpg"),
            source_url: format!("https://listing.example/{n}"),
            title: title.map(Into::into),
        }
    }

    #[test]
    fn overlay_truncates_to_candidate_count() {
        let listings = (1..=4).map(ai_listing).collect();
        let candidates = vec![candidate(1, None), candidate(2, None)];

        let merged = merge_listings(MergePolicy::Overlay, listings, candidates, "2022 Audi R8");

        assert_eq!(merged.len(), 2);
        for (i, listing) in merged.iter().enumerate() {
            let n = i + 1;
            assert_eq!(listing.title, format!("AI listing {n}"));
            assert_eq!(listing.price, format!("${n}0,000"));
            assert_eq!(listing.image_url.as_deref(), Some(format!("https://img.example/{n}.jpg").as_str()));
            assert_eq!(listing.source_url.as_deref(), Some(format!("https://listing.example/{n}").as_str()));
        }
    }

    #[test]
    fn overlay_keeps_only_as_many_candidates_as_listings() {
        let listings = vec![ai_listing(1)];
        let candidates = vec![candidate(1, None), candidate(2, None), candidate(3, None)];

        let merged = merge_listings(MergePolicy::Overlay, listings, candidates, "x");

        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn overlay_without_candidates_empties_listings() {
        let listings = (1..=4).map(ai_listing).collect();

        let merged = merge_listings(MergePolicy::Overlay, listings, vec![], "x");

        assert!(merged.is_empty());
    }

    #[test]
    fn replace_builds_placeholder_listings_from_candidates() {
        let candidates = vec![
            candidate(1, Some("Used 2022 Audi R8 V10")),
            candidate(2, None),
            candidate(3, Some("2022 Audi R8 Spyder")),
        ];

        let merged = merge_listings(MergePolicy::Replace, vec![], candidates, "2022 Audi R8");

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].title, "Used 2022 Audi R8 V10");
        assert_eq!(merged[1].title, "2022 Audi R8 for sale");
        assert_eq!(merged[2].id, Some(serde_json::json!("listing-3")));
        for (i, listing) in merged.iter().enumerate() {
            assert_eq!(listing.price, PRICE_PLACEHOLDER);
            assert_eq!(listing.mileage, MILEAGE_PLACEHOLDER);
            assert_eq!(
                listing.source_url.as_deref(),
                Some(format!("https://listing.example/{}", i + 1).as_str())
            );
        }
    }

    #[test]
    fn replace_discards_model_listings() {
        let listings = (1..=4).map(ai_listing).collect();

        let merged = merge_listings(MergePolicy::Replace, listings, vec![candidate(9, None)], "x");

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].image_url.as_deref(), Some("https://img.example/9.jpg"));
        assert_eq!(merged[0].price, PRICE_PLACEHOLDER);
    }

    #[test]
    fn replace_without_candidates_is_empty() {
        assert!(merge_listings(MergePolicy::Replace, vec![ai_listing(1)], vec![], "x").is_empty());
    }
}
