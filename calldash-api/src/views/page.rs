use super::charts::{
    bar_chart, donut_chart, escape, format_number, named_color, Bar, BarChart, Slice,
};
use chrono::NaiveDate;
use shared_types::{DashboardSnapshot, DateRange};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "Customer Call & Sales Dashboard";

/// Donut hole as a fraction of the radius
const SENTIMENT_HOLE: f64 = 0.3;

/// Formats like the conversion metric card: `60.0%`, `33.33%`.
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}%", value)
    } else {
        format!("{}%", value)
    }
}

fn date_value(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Query string selecting `range`, empty when there is none.
pub fn range_query(range: Option<&DateRange>) -> String {
    match range {
        Some(r) => format!(
            "?start_date={}&end_date={}",
            r.start.format("%Y-%m-%d"),
            r.end.format("%Y-%m-%d")
        ),
        None => String::new(),
    }
}

fn render_form(snapshot: &DashboardSnapshot) -> String {
    let start = date_value(snapshot.range.map(|r| r.start));
    let end = date_value(snapshot.range.map(|r| r.end));

    format!(
        r#"<form class="range" method="get" action="/">
  <label>Start Date <input type="date" name="start_date" value="{start}" onchange="this.form.submit()"></label>
  <label>End Date <input type="date" name="end_date" value="{end}" onchange="this.form.submit()"></label>
  <button type="submit">Apply</button>
</form>"#
    )
}

fn render_metrics(snapshot: &DashboardSnapshot) -> String {
    let m = &snapshot.metrics;
    let cards = [
        ("Total Calls Made", m.total_calls.to_string()),
        ("Total Picked Up Calls", m.picked_up_calls.to_string()),
        ("Total Purchases After Calls", m.purchases_after_calls.to_string()),
        ("Conversion Percentage", format_percentage(m.conversion_percentage)),
    ];

    let mut out = String::from(r#"<section class="metrics">"#);
    for (label, value) in cards {
        let _ = write!(
            out,
            r#"<div class="metric"><div class="metric-label">{}</div><div class="metric-value">{}</div></div>"#,
            escape(label),
            escape(&value)
        );
    }
    out.push_str("</section>");
    out
}

fn section(heading: &str, svg: String) -> String {
    format!(
        r#"<section class="panel"><h2>{}</h2>{}</section>"#,
        escape(heading),
        svg
    )
}

fn render_charts(snapshot: &DashboardSnapshot) -> String {
    let daily = bar_chart(&BarChart {
        title: "Daily Purchases After Calls",
        x_label: "Date",
        y_label: "Purchases",
        bars: snapshot
            .daily_purchases
            .iter()
            .map(|d| Bar::new(d.date.format("%Y-%m-%d").to_string(), d.purchases as f64))
            .collect(),
        value_labels: false,
        gap: 0.2,
    });

    let durations = bar_chart(&BarChart {
        title: "Call Duration Distribution",
        x_label: "Call Duration (Seconds)",
        y_label: "count",
        bars: snapshot
            .duration_histogram
            .iter()
            .map(|b| {
                Bar::new(
                    format!("{}-{}", format_number(b.lower), format_number(b.upper)),
                    b.count as f64,
                )
            })
            .collect(),
        value_labels: false,
        gap: 0.02,
    });

    let sentiment = donut_chart(
        "Customer Sentiment Analysis",
        &snapshot
            .sentiment
            .iter()
            .map(|c| Slice {
                label: c.label.clone(),
                value: c.count as f64,
            })
            .collect::<Vec<_>>(),
        SENTIMENT_HOLE,
    );

    let reasons = bar_chart(&BarChart {
        title: "Disconnection Reasons Breakdown",
        x_label: "DisconnectionReason",
        y_label: "count",
        bars: snapshot
            .disconnection_reasons
            .iter()
            .map(|c| Bar::new(c.label.clone(), c.count as f64))
            .collect(),
        value_labels: false,
        gap: 0.2,
    });

    let outcomes = bar_chart(&BarChart {
        title: "Call Outcome Breakdown",
        x_label: "Status",
        y_label: "Count",
        bars: snapshot
            .call_outcomes
            .iter()
            .map(|o| {
                Bar::new(o.status.clone(), o.count as f64)
                    .with_color(named_color(o.outcome.color()))
            })
            .collect(),
        value_labels: true,
        gap: 0.2,
    });

    [
        section("Calls vs Purchases", daily),
        section("Call Duration Distribution", durations),
        section("Customer Sentiment Distribution", sentiment),
        section("Disconnection Reasons", reasons),
        section("Successful vs Failed Calls", outcomes),
    ]
    .concat()
}

fn render_download(snapshot: &DashboardSnapshot) -> String {
    format!(
        r#"<p class="download"><a class="button" href="/api/export{}" download="{}">Download Data</a></p>"#,
        escape(&range_query(snapshot.range.as_ref())),
        loaders::EXPORT_FILE_NAME
    )
}

/// The whole dashboard page for one snapshot.
pub fn render_page(snapshot: &DashboardSnapshot) -> String {
    // chart labels come from the data, keep this substitution last
    TEMPLATE
        .replace("__TITLE__", &escape(PAGE_TITLE))
        .replace("__FORM__", &render_form(snapshot))
        .replace("__METRICS__", &render_metrics(snapshot))
        .replace("__DOWNLOAD__", &render_download(snapshot))
        .replace("__CHARTS__", &render_charts(snapshot))
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>__TITLE__</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 980px; padding: 1.5rem; color: #1f2328; }
    h1 { font-size: 1.8rem; }
    h2 { font-size: 1.15rem; margin: 0 0 .5rem; }
    .range { display: flex; gap: 1rem; align-items: end; flex-wrap: wrap; margin-bottom: 1.5rem; }
    .range label { display: flex; flex-direction: column; font-size: .85rem; gap: .25rem; }
    .metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; margin-bottom: 1.5rem; }
    .metric-label { font-size: .85rem; color: #59636e; }
    .metric-value { font-size: 2rem; font-weight: 600; }
    .panel { margin-bottom: 2rem; }
    .chart { width: 100%; height: auto; }
    .button { display: inline-block; padding: .5rem 1rem; border-radius: 6px; background: #1f6feb; color: white; text-decoration: none; }
  </style>
</head>
<body>
  <h1>__TITLE__</h1>
  __FORM__
  __METRICS__
  __CHARTS__
  __DOWNLOAD__
</body>
</html>
"##;
