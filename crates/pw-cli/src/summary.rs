use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pw_cli::pipeline::BuildResult;
use pw_model::{CountryPolicyTable, CountryRoute, IssueSeverity};
use pw_report::BuildSummary;

/// Label of the closing tally row. SourceWatch overwrites count again, so
/// this is the number of additions rather than distinct plants.
const TOTAL_LABEL: &str = "TOTAL ADDED";

pub fn print_build_summary(result: &BuildResult) {
    let summary = &result.summary;
    println!(
        "PowerWatch build; minimum plant size: {} MW.",
        summary.min_capacity_mw
    );
    println!("{}", tally_table(summary));

    println!("Loaded {} plants to PowerWatch.", summary.canonical_plants);
    println!(
        "Estimated generation for {} plants.",
        summary.estimated_generation
    );
    if let Some(stats) = &result.dump_stats {
        println!(
            "Dumped {} plants ({} admitted, {} unclaimed CARMA).",
            summary.dumped_plants.unwrap_or_default(),
            stats.admitted,
            stats.carma_added
        );
    }
    if !result.log.is_empty() {
        print_issue_table(result);
    }

    if result.dry_run {
        println!("Dry run: no files written.");
    } else {
        let outputs = &result.outputs;
        for (label, path) in [
            ("Dataset", &outputs.canonical),
            ("Dump", &outputs.dump),
            ("Summary", &outputs.summary),
            ("Build log", &outputs.build_log),
        ] {
            if let Some(path) = path {
                println!("{label}: {}", path.display());
            }
        }
    }
}

fn tally_table(summary: &BuildSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Plants"),
        header_cell("Capacity (MW)"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for row in &summary.tallies {
        table.add_row(vec![
            Cell::new(&row.source),
            count_cell(row.count, Color::Green),
            capacity_cell(row.capacity_mw),
        ]);
    }
    table.add_row(vec![
        Cell::new(TOTAL_LABEL)
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total.count).add_attribute(Attribute::Bold),
        Cell::new(format_capacity(summary.total.capacity_mw)).add_attribute(Attribute::Bold),
    ]);
    table
}

fn print_issue_table(result: &BuildResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Issue"),
        header_cell("Severity"),
        header_cell("Count"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (kind, count) in &result.summary.issues.by_kind {
        let severity = result
            .log
            .iter()
            .find(|issue| issue.kind == *kind)
            .map(|issue| issue.severity);
        table.add_row(vec![
            Cell::new(format!("{kind:?}")),
            severity_cell(severity),
            Cell::new(count),
        ]);
    }
    println!("{table}");
    println!(
        "{} errors, {} warnings (see build log for details).",
        result.summary.issues.errors, result.summary.issues.warnings
    );
}

pub fn print_countries(table: &CountryPolicyTable) {
    let mut output = Table::new();
    output.set_header(vec![
        header_cell("Country"),
        header_cell("ISO"),
        header_cell("Route"),
    ]);
    apply_summary_table_style(&mut output);
    for policy in table.iter() {
        output.add_row(vec![
            Cell::new(&policy.name),
            dim_cell(&policy.iso_code),
            route_cell(policy.route),
        ]);
    }
    println!("{output}");
    let national = table.national_api().count();
    println!(
        "{} countries, {national} with national data feeds.",
        table.len()
    );
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn capacity_cell(capacity_mw: f64) -> Cell {
    if capacity_mw > 0.0 {
        Cell::new(format_capacity(capacity_mw))
    } else {
        dim_cell(format_capacity(capacity_mw))
    }
}

fn format_capacity(capacity_mw: f64) -> String {
    format!("{capacity_mw:.1}")
}

fn severity_cell(severity: Option<IssueSeverity>) -> Cell {
    match severity {
        Some(IssueSeverity::Error) => Cell::new("ERROR").fg(Color::Red),
        Some(IssueSeverity::Warning) => Cell::new("WARN").fg(Color::Yellow),
        None => dim_cell("-"),
    }
}

fn route_cell(route: CountryRoute) -> Cell {
    match route {
        CountryRoute::NationalApi => Cell::new(route).fg(Color::Green),
        CountryRoute::GeoRouted => Cell::new(route).fg(Color::Yellow),
        CountryRoute::Default => Cell::new(route),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pw_fusion::{FusionConfig, FusionEngine};
    use pw_model::{ConcordanceIndex, CountryPolicy, PlantRecord, PlantSource, SourceId, SourceSet};

    #[test]
    fn total_row_counts_sourcewatch_overwrites_as_additions() {
        let countries: CountryPolicyTable =
            [CountryPolicy::new("Kenya", "KEN", CountryRoute::Default)]
                .into_iter()
                .collect();
        let concordance = ConcordanceIndex::new();
        let mut sources = SourceSet::empty();
        sources.wri = PlantSource::new(SourceId::Wri).with_plants([
            PlantRecord::new("X1", "Kenya").with_capacity(10.0).with_location(1.0, 36.0),
        ]);
        sources.sourcewatch = PlantSource::new(SourceId::SourceWatch).with_plants([
            PlantRecord::new("X1", "Kenya").with_capacity(12.0).with_location(2.0, 37.0),
        ]);
        let outcome =
            FusionEngine::new(FusionConfig::default(), &countries, &concordance).run(&sources);
        let summary = BuildSummary::from_outcome("2024-06-03T14:05:09Z", 1.0, &outcome, 0);

        assert_eq!(summary.canonical_plants, 1);
        assert_eq!(summary.total.count, 2);

        let rendered = tally_table(&summary).to_string();
        assert!(rendered.contains(TOTAL_LABEL));
        assert!(rendered.contains("SourceWatch"));
    }
}
