//! Interactive mode for the dashboard.
//!
//! Stands in for the browser widgets: prompts for each control in turn,
//! recomputes the view through [`Dashboard::update`] and prints a text
//! summary, then offers to change the controls again.

use dialoguer::{Confirm, Input, MultiSelect, Select};
use uk_crime_analytics_models::CrimeTypeSelection;
use uk_crime_dashboard_models::{ControlOptions, ControlState, View, ViewMode};
use uk_crime_dataset_models::Granularity;

use crate::{Dashboard, DashboardError};

/// Rows printed for the highest-rate regions.
const TOP_ROWS: usize = 10;

/// Runs the prompt loop until the user declines another query.
///
/// # Errors
///
/// Returns [`DashboardError`] if a prompt fails or a view cannot be
/// computed.
pub async fn run(dashboard: &Dashboard) -> Result<(), DashboardError> {
    println!("UK Street Crime Dashboard");
    println!();

    let controls = dashboard.controls()?;
    let mut state = controls.defaults.clone();

    loop {
        state = prompt_state(&controls.options, &state)?;

        let view = dashboard.update(&state).await?;
        print_view(&view);

        if !Confirm::new()
            .with_prompt("Change the controls?")
            .default(true)
            .interact()?
        {
            return Ok(());
        }
    }
}

fn prompt_state(
    options: &ControlOptions,
    current: &ControlState,
) -> Result<ControlState, DashboardError> {
    let mode_labels: Vec<&str> = options.modes.iter().map(|m| m.label()).collect();
    let mode = options.modes[Select::new()
        .with_prompt("View")
        .items(&mode_labels)
        .default(position(&options.modes, &current.mode))
        .interact()?];

    let year_labels: Vec<String> = options.years.iter().map(ToString::to_string).collect();
    let year = options.years[Select::new()
        .with_prompt("Year")
        .items(&year_labels)
        .default(position(&options.years, &current.year))
        .interact()?];

    let month = if mode == ViewMode::Individual {
        let month_labels: Vec<String> = options.months.iter().map(|m| format!("{m:02}")).collect();
        options.months[Select::new()
            .with_prompt("Month")
            .items(&month_labels)
            .default(position(&options.months, &current.month))
            .interact()?]
    } else {
        current.month
    };

    let granularity = if mode == ViewMode::Aggregate {
        let labels: Vec<&str> = options
            .granularities
            .iter()
            .map(|g| g.label.as_str())
            .collect();
        let values: Vec<Granularity> = options.granularities.iter().map(|g| g.value).collect();
        values[Select::new()
            .with_prompt("Area")
            .items(&labels)
            .default(position(&values, &current.granularity))
            .interact()?]
    } else {
        current.granularity
    };

    let crime_types = prompt_crime_types(&options.crime_types, &current.crime_types)?;

    let postcode: String = Input::new()
        .with_prompt("Postcode to center on (blank for none)")
        .allow_empty(true)
        .with_initial_text(current.postcode.clone().unwrap_or_default())
        .interact_text()?;

    Ok(ControlState {
        mode,
        year,
        month,
        crime_types,
        granularity,
        postcode: Some(postcode).filter(|p| !p.trim().is_empty()),
    })
}

fn prompt_crime_types(
    vocabulary: &[String],
    current: &CrimeTypeSelection,
) -> Result<CrimeTypeSelection, DashboardError> {
    let checked: Vec<bool> = vocabulary
        .iter()
        .map(|t| match current {
            CrimeTypeSelection::All => true,
            CrimeTypeSelection::Only(types) => types.contains(t),
        })
        .collect();

    let picked = MultiSelect::new()
        .with_prompt("Crime types (space to toggle)")
        .items(vocabulary)
        .defaults(&checked)
        .interact()?;

    Ok(if picked.len() == vocabulary.len() {
        CrimeTypeSelection::All
    } else {
        CrimeTypeSelection::Only(picked.into_iter().map(|i| vocabulary[i].clone()).collect())
    })
}

fn position<T: PartialEq>(items: &[T], item: &T) -> usize {
    items.iter().position(|i| i == item).unwrap_or(0)
}

fn print_view(view: &View) {
    println!();
    let anchor = view.anchor();
    match &anchor.postcode {
        Some(postcode) => println!(
            "Centered on {postcode} ({:.4}, {:.4}){}",
            anchor.latitude,
            anchor.longitude,
            anchor
                .district_code
                .as_ref()
                .map_or_else(String::new, |code| format!(" in {code}"))
        ),
        None => println!("Centered on the default view"),
    }

    match view {
        View::Aggregate(view) => {
            println!(
                "{} incident(s) across {} {} region(s) in {}",
                view.summary.total_count,
                view.summary.region_count,
                view.params.granularity,
                view.params.year
            );
            let mut rows: Vec<_> = view.rows.iter().collect();
            rows.sort_by(|a, b| b.log_value.total_cmp(&a.log_value));
            for row in rows.into_iter().take(TOP_ROWS) {
                let rate = row
                    .rate_per_1000
                    .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
                println!(
                    "  {:<12} {:<40} {:>8} {:>10} {:>6.2}",
                    row.region_code, row.region_name, row.count, rate, row.log_value
                );
            }
            if !view.missing_boundaries.is_empty() {
                println!(
                    "  ({} region(s) have no boundary polygon)",
                    view.missing_boundaries.len()
                );
            }
        }
        View::Individual(view) => {
            println!(
                "{} located incident(s), {} without coordinates, in {}-{:02}",
                view.points.len(),
                view.unlocated_count,
                view.params.year,
                view.params.month
            );
            for (crime_type, count) in &view.type_counts {
                println!("  {crime_type:<40} {count:>8}");
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_falls_back_to_first() {
        assert_eq!(position(&[2019, 2020, 2021], &2020), 1);
        assert_eq!(position(&[2019, 2020], &1999), 0);
        assert_eq!(position::<i32>(&[], &1), 0);
    }
}
