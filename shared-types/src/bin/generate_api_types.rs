use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Filter types
    types.push(clean_type(DateRange::export_to_string()?));

    // Snapshot types
    types.push(clean_type(DashboardMetrics::export_to_string()?));
    types.push(clean_type(DailyPurchases::export_to_string()?));
    types.push(clean_type(CategoryCount::export_to_string()?));
    types.push(clean_type(HistogramBin::export_to_string()?));
    types.push(clean_type(CallOutcome::export_to_string()?));
    types.push(clean_type(CallOutcomeCount::export_to_string()?));
    types.push(clean_type(DashboardSnapshot::export_to_string()?));

    // Misc responses
    types.push(clean_type(EmailMatchResponse::export_to_string()?));
    types.push(clean_type(SourceStatus::export_to_string()?));
    types.push(clean_type(HealthResponse::export_to_string()?));

    let output = format!(
        "// This file is generated by `cargo run --bin generate_api_types`. Do not edit.\n\n{}\n",
        types.join("\n\n")
    );

    let out_path = Path::new("api-types.ts");
    fs::write(out_path, output)?;
    println!("Wrote {} types to {}", types.len(), out_path.display());

    Ok(())
}

/// Strips the per-type import lines ts-rs emits so everything lives in one file.
fn clean_type(ts: String) -> String {
    ts.lines()
        .filter(|line| !line.starts_with("import type") && !line.starts_with("// This file"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
