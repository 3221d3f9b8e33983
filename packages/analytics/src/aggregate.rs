//! Per-region crime counts and rates.
//!
//! Incidents are filtered to one year and a set of crime types, grouped by
//! region code at the requested granularity and counted. At district
//! granularity each count is normalized by the district's population into a
//! rate per 1,000 residents; small areas have no population reference, so
//! their display value is derived from the raw count.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use uk_crime_analytics_models::{AggregateParams, AggregateResult, AggregateRow, AggregateSummary};
use uk_crime_dataset_models::{Granularity, IncidentRecord, RegionTable};

use crate::rounding::round2;
use crate::{AnalyticsError, matches_filter};

/// Rate shown for a district whose rate per 1,000 rounds to zero, so that
/// its log value is defined. Rates that round to any positive value are
/// kept as they are.
pub const ZERO_RATE_SUBSTITUTE: f64 = 1.0;

/// Matching incidents for one region.
struct RegionGroup<'a> {
    name: &'a str,
    count: u64,
}

/// Computes per-region counts, rates and log values.
///
/// Rows come back sorted by region code with no duplicates. An empty
/// `crime_types` set or a year with no incidents yields an empty result.
///
/// # Errors
///
/// * [`AnalyticsError::UnmatchedRegions`] if, at district granularity, any
///   matching incident's district is missing from `regions`.
/// * [`AnalyticsError::ConflictingRegionName`] if one region code appears
///   with two different names among the matching incidents.
pub fn compute_aggregate(
    records: &[IncidentRecord],
    regions: &RegionTable,
    params: &AggregateParams,
) -> Result<AggregateResult, AnalyticsError> {
    if params.crime_types.is_empty() {
        log::debug!("Empty crime type selection, nothing to aggregate");
    }

    let groups = group_by_region(records, params)?;
    log::debug!(
        "Aggregating {} {} region(s) for {}",
        groups.len(),
        params.granularity,
        params.year
    );

    let rows = match params.granularity {
        Granularity::SmallArea => count_rows(groups),
        Granularity::District => rate_rows(groups, regions)?,
    };

    Ok(AggregateResult {
        granularity: params.granularity,
        summary: AggregateSummary::of(&rows),
        rows,
    })
}

fn group_by_region<'a>(
    records: &'a [IncidentRecord],
    params: &AggregateParams,
) -> Result<BTreeMap<&'a str, RegionGroup<'a>>, AnalyticsError> {
    let mut groups: BTreeMap<&str, RegionGroup<'_>> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|r| matches_filter(r, params.year, &params.crime_types))
    {
        let region = record.region(params.granularity);
        match groups.entry(region.code) {
            Entry::Vacant(entry) => {
                entry.insert(RegionGroup {
                    name: region.name,
                    count: 1,
                });
            }
            Entry::Occupied(mut entry) => {
                let group = entry.get_mut();
                if group.name != region.name {
                    return Err(AnalyticsError::ConflictingRegionName {
                        code: region.code.to_string(),
                        first: group.name.to_string(),
                        second: region.name.to_string(),
                    });
                }
                group.count += 1;
            }
        }
    }

    Ok(groups)
}

/// Small-area rows: the display value is the log of the raw count. Every
/// group holds at least one incident, so the log is always defined.
#[allow(clippy::cast_precision_loss)]
fn count_rows(groups: BTreeMap<&str, RegionGroup<'_>>) -> Vec<AggregateRow> {
    groups
        .into_iter()
        .map(|(code, group)| AggregateRow {
            region_code: code.to_string(),
            region_name: group.name.to_string(),
            count: group.count,
            rate_per_1000: None,
            log_value: round2((group.count as f64).ln()),
        })
        .collect()
}

/// District rows: joins each group to its population and derives the rate
/// per 1,000 and its log.
fn rate_rows(
    groups: BTreeMap<&str, RegionGroup<'_>>,
    regions: &RegionTable,
) -> Result<Vec<AggregateRow>, AnalyticsError> {
    let unmatched: Vec<String> = groups
        .keys()
        .filter(|code| regions.get(code).is_none())
        .map(|code| (*code).to_string())
        .collect();

    if !unmatched.is_empty() {
        let err = AnalyticsError::UnmatchedRegions {
            granularity: Granularity::District,
            codes: unmatched,
        };
        log::error!("Cannot normalize by population: {err}");
        return Err(err);
    }

    Ok(groups
        .into_iter()
        .filter_map(|(code, group)| {
            let population = regions.get(code)?.population;
            let rate = rate_per_1000(group.count, population);
            Some(AggregateRow {
                region_code: code.to_string(),
                region_name: group.name.to_string(),
                count: group.count,
                rate_per_1000: Some(rate),
                log_value: round2(rate.ln()),
            })
        })
        .collect())
}

/// `count / population * 1000`, rounded to 2 places. A rate that rounds to
/// zero becomes [`ZERO_RATE_SUBSTITUTE`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rate_per_1000(count: u64, population: u64) -> f64 {
    let rate = round2(count as f64 / population as f64 * 1000.0);
    if rate.abs() < f64::EPSILON {
        ZERO_RATE_SUBSTITUTE
    } else {
        rate
    }
}
