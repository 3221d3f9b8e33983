//! Individual-incident selection for the point (scatter) view.

use uk_crime_analytics_models::PointParams;
use uk_crime_dataset_models::IncidentRecord;

use crate::matches_filter;

/// Returns every incident in `params.year` and `params.month` whose crime
/// type is selected, in input order.
///
/// A month outside 1-12 or an empty crime type set matches nothing.
#[must_use]
pub fn select_incidents<'a>(
    records: &'a [IncidentRecord],
    params: &PointParams,
) -> Vec<&'a IncidentRecord> {
    let selected: Vec<_> = records
        .iter()
        .filter(|r| r.month == params.month && matches_filter(r, params.year, &params.crime_types))
        .collect();

    log::debug!(
        "Selected {} incident(s) for {}-{:02}",
        selected.len(),
        params.year,
        params.month
    );

    selected
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn incident(year: i32, month: u8, crime_type: &str, location: &str) -> IncidentRecord {
        IncidentRecord {
            year,
            month,
            crime_type: crime_type.to_string(),
            small_area_code: "E01000001".to_string(),
            small_area_name: "City of London 001A".to_string(),
            district_code: "E09000001".to_string(),
            district_name: "City of London".to_string(),
            latitude: Some(51.5),
            longitude: Some(-0.09),
            location: Some(location.to_string()),
        }
    }

    fn params(year: i32, month: u8, names: &[&str]) -> PointParams {
        PointParams {
            year,
            month,
            crime_types: names.iter().map(|n| (*n).to_string()).collect(),
        }
    }

    fn records() -> Vec<IncidentRecord> {
        vec![
            incident(2020, 3, "Burglary", "first"),
            incident(2020, 4, "Burglary", "other month"),
            incident(2020, 3, "Drugs", "second"),
            incident(2019, 3, "Burglary", "other year"),
            incident(2020, 3, "Robbery", "unselected"),
            incident(2020, 3, "Burglary", "third"),
        ]
    }

    #[test]
    fn filters_by_year_month_and_type_in_order() {
        let records = records();
        let selected = select_incidents(&records, &params(2020, 3, &["Burglary", "Drugs"]));
        let locations: Vec<_> = selected
            .iter()
            .map(|r| r.location.as_deref().unwrap())
            .collect();
        assert_eq!(locations, ["first", "second", "third"]);
    }

    #[test]
    fn every_selected_row_matches_the_filter() {
        let records = records();
        let p = params(2020, 3, &["Burglary"]);
        let selected = select_incidents(&records, &p);
        assert!(!selected.is_empty());
        assert!(
            selected
                .iter()
                .all(|r| r.year == 2020 && r.month == 3 && p.crime_types.contains(&r.crime_type))
        );
    }

    #[test]
    fn empty_type_set_selects_nothing() {
        let records = records();
        let p = PointParams {
            year: 2020,
            month: 3,
            crime_types: BTreeSet::new(),
        };
        assert!(select_incidents(&records, &p).is_empty());
    }

    #[test]
    fn out_of_range_month_selects_nothing() {
        let records = records();
        assert!(select_incidents(&records, &params(2020, 13, &["Burglary"])).is_empty());
        assert!(select_incidents(&records, &params(2020, 0, &["Burglary"])).is_empty());
    }
}
