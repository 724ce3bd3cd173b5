use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::image_search::{Candidate, SiteSearcher};

/// Collects up to `quota` candidates with distinct source URLs, visiting
/// `sites` in a fresh random order.
///
/// Site failures are logged and skipped; the result may be empty.
pub async fn collect_candidates(
    searcher: &impl SiteSearcher,
    subject: &str,
    sites: &[String],
    quota: usize,
) -> Vec<Candidate> {
    let mut order = sites.to_vec();
    fastrand::shuffle(&mut order);
    collect_in_order(searcher, subject, &order, quota).await
}

/// Same as [`collect_candidates`] but visits `sites` in the given order.
pub(crate) async fn collect_in_order(
    searcher: &impl SiteSearcher,
    subject: &str,
    sites: &[String],
    quota: usize,
) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut collected = Vec::with_capacity(quota);
    let mut queried = 0usize;

    for site in sites {
        if collected.len() >= quota {
            break;
        }
        let remaining = quota - collected.len();
        queried += 1;

        let batch = match searcher.search_site(subject, site, remaining).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(site = %site, error = %e, "site search failed (continuing with other sites)");
                continue;
            }
        };

        let before = collected.len();
        for candidate in batch {
            if collected.len() >= quota {
                break;
            }
            if !candidate.source_url.is_empty() && seen.insert(candidate.source_url.clone()) {
                collected.push(candidate);
            }
        }
        debug!(site = %site, added = collected.len() - before, "site searched");
    }

    info!(
        subject,
        found = collected.len(),
        quota,
        sites_queried = queried,
        "listing photo search complete"
    );
    collected
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::image_search::ImageSearchError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Per-site canned responses; `None` makes that site fail.
    pub(crate) struct MockSearcher {
        responses: HashMap<String, Option<Vec<Candidate>>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl MockSearcher {
        pub(crate) fn new(responses: Vec<(&str, Option<Vec<Candidate>>)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(site, r)| (site.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<(String, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SiteSearcher for MockSearcher {
        async fn search_site(
            &self,
            _subject: &str,
            site: &str,
            count: usize,
        ) -> Result<Vec<Candidate>, ImageSearchError> {
            self.calls.lock().unwrap().push((site.to_string(), count));
            match self.responses.get(site) {
                Some(Some(batch)) => Ok(batch.clone()),
                Some(None) => Err(ImageSearchError::Api {
                    code: 500,
                    message: "upstream down".into(),
                }),
                None => Ok(Vec::new()),
            }
        }
    }

    pub(crate) fn candidate(site: &str, n: u32) -> Candidate {
        Candidate {
            image_url: format!("https://img.{site}/{n}.jpg"),
            source_url: format!("https://www.{site}/listing/{n}"),
            title: Some(format!("{site} listing {n}")),
        }
    }

    fn sites(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn assert_distinct_sources(candidates: &[Candidate]) {
        let unique: HashSet<_> = candidates.iter().map(|c| &c.source_url).collect();
        assert_eq!(unique.len(), candidates.len(), "duplicate source URL in {candidates:?}");
    }

    #[tokio::test]
    async fn stops_mid_site_once_quota_is_met() {
        let mock = MockSearcher::new(vec![
            ("cars.com", Some(vec![candidate("cars.com", 1), candidate("cars.com", 2)])),
            (
                "autotrader.com",
                Some(vec![
                    candidate("cars.com", 2),
                    candidate("autotrader.com", 1),
                    candidate("autotrader.com", 2),
                ]),
            ),
        ]);

        let result = collect_in_order(
            &mock,
            "2022 Audi R8",
            &sites(&["cars.com", "autotrader.com"]),
            4,
        )
        .await;

        assert_eq!(result.len(), 4);
        assert_distinct_sources(&result);
        assert_eq!(result[2], candidate("autotrader.com", 1));
        assert_eq!(result[3], candidate("autotrader.com", 2));
        assert_eq!(
            mock.calls(),
            vec![("cars.com".to_string(), 4), ("autotrader.com".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn quota_met_by_first_site_skips_the_rest() {
        let mock = MockSearcher::new(vec![(
            "cars.com",
            Some((1..=4).map(|n| candidate("cars.com", n)).collect()),
        )]);

        let result = collect_in_order(
            &mock,
            "2022 Audi R8",
            &sites(&["cars.com", "autotrader.com", "cargurus.com"]),
            4,
        )
        .await;

        assert_eq!(result.len(), 4);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn never_exceeds_quota_even_when_a_site_over_delivers() {
        let mock = MockSearcher::new(vec![(
            "cars.com",
            Some((1..=9).map(|n| candidate("cars.com", n)).collect()),
        )]);

        for quota in 0..=5 {
            let result = collect_in_order(&mock, "x", &sites(&["cars.com"]), quota).await;
            assert!(result.len() <= quota, "quota {quota} got {}", result.len());
        }
    }

    #[tokio::test]
    async fn zero_quota_queries_nothing() {
        let mock = MockSearcher::new(vec![("cars.com", Some(vec![candidate("cars.com", 1)]))]);

        let result = collect_candidates(&mock, "x", &sites(&["cars.com"]), 0).await;

        assert!(result.is_empty());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn failing_sites_are_skipped() {
        let mock = MockSearcher::new(vec![
            ("cars.com", None),
            ("autotrader.com", Some(vec![candidate("autotrader.com", 1)])),
        ]);

        let result = collect_in_order(
            &mock,
            "x",
            &sites(&["cars.com", "autotrader.com"]),
            4,
        )
        .await;

        assert_eq!(result, vec![candidate("autotrader.com", 1)]);
        assert_eq!(
            mock.calls(),
            vec![("cars.com".to_string(), 4), ("autotrader.com".to_string(), 4)]
        );
    }

    #[tokio::test]
    async fn all_sites_failing_returns_empty() {
        let mock = MockSearcher::new(vec![("cars.com", None), ("autotrader.com", None)]);

        let result =
            collect_candidates(&mock, "x", &sites(&["cars.com", "autotrader.com"]), 4).await;

        assert!(result.is_empty());
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn empty_source_urls_are_discarded() {
        let mut blank = candidate("cars.com", 1);
        blank.source_url.clear();
        let mock = MockSearcher::new(vec![(
            "cars.com",
            Some(vec![blank, candidate("cars.com", 2)]),
        )]);

        let result = collect_in_order(&mock, "x", &sites(&["cars.com"]), 4).await;

        assert_eq!(result, vec![candidate("cars.com", 2)]);
    }

    #[tokio::test]
    async fn shuffled_runs_yield_the_same_set() {
        let responses = || {
            vec![
                ("cars.com", Some(vec![candidate("cars.com", 1), candidate("shared", 1)])),
                ("autotrader.com", Some(vec![candidate("shared", 1), candidate("autotrader.com", 1)])),
                ("cargurus.com", Some(vec![candidate("cargurus.com", 1)])),
            ]
        };
        let all = sites(&["cars.com", "autotrader.com", "cargurus.com"]);

        let first = collect_candidates(&MockSearcher::new(responses()), "x", &all, 10).await;
        let second = collect_candidates(&MockSearcher::new(responses()), "x", &all, 10).await;

        assert_distinct_sources(&first);
        let a: HashSet<_> = first.into_iter().collect();
        let b: HashSet<_> = second.into_iter().collect();
        assert_eq!(a.len(), 4);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn each_site_is_visited_at_most_once_per_run() {
        let mock = MockSearcher::new(vec![]);
        let all = sites(&["cars.com", "autotrader.com", "cargurus.com", "edmunds.com"]);

        collect_candidates(&mock, "x", &all, 4).await;

        let mut visited: Vec<_> = mock.calls().into_iter().map(|(site, _)| site).collect();
        visited.sort();
        let mut expected = all.clone();
        expected.sort();
        assert_eq!(visited, expected);
    }
}
