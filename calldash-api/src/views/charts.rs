//! Inline SVG charts drawn with plotters.
//!
//! Each chart is rendered into a string through `SVGBackend::with_string` and
//! then made responsive so the page can scale it with CSS.

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 340;
const FONT: &str = "sans-serif";
const TITLE_SIZE: i32 = 17;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 12;

const TEXT_COLOR: RGBColor = RGBColor(0x1f, 0x23, 0x28);
const MUTED_COLOR: RGBColor = RGBColor(0x59, 0x63, 0x6e);

pub const EMPTY_MESSAGE: &str = "No data for the selected range";

/// Plotly's default qualitative palette
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(0x63, 0x6e, 0xfa),
    RGBColor(0xef, 0x55, 0x3b),
    RGBColor(0x00, 0xcc, 0x96),
    RGBColor(0xab, 0x63, 0xfa),
    RGBColor(0xff, 0xa1, 0x5a),
    RGBColor(0x19, 0xd3, 0xf3),
    RGBColor(0xff, 0x66, 0x92),
    RGBColor(0xb6, 0xe8, 0x80),
    RGBColor(0xff, 0x97, 0xff),
    RGBColor(0xfe, 0xcb, 0x52),
];

type DrawResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            color: PALETTE[0],
        }
    }

    pub fn with_color(mut self, color: RGBColor) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub bars: Vec<Bar>,
    /// Print each bar's value above it
    pub value_labels: bool,
    /// Fraction of each slot left empty between bars; 0 draws a histogram
    pub gap: f64,
}

#[derive(Debug, Clone)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// RGB value of the CSS color names used for call outcomes.
pub fn named_color(name: &str) -> RGBColor {
    match name {
        "green" => RGBColor(0x00, 0x80, 0x00),
        "red" => RGBColor(0xff, 0x00, 0x00),
        _ => RGBColor(0x80, 0x80, 0x80),
    }
}

/// Swaps the fixed pixel size for a viewBox so CSS controls the width.
fn make_svg_responsive(svg: String) -> String {
    let needle = format!("width=\"{WIDTH}\" height=\"{HEIGHT}\"");
    let sized = if svg.contains("viewBox=") {
        "class=\"chart\" preserveAspectRatio=\"xMidYMid meet\"".to_string()
    } else {
        format!("class=\"chart\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" preserveAspectRatio=\"xMidYMid meet\"")
    };
    svg.replacen(&needle, &sized, 1)
}

fn render<F>(title: &str, draw: F) -> String
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult<()>,
{
    let mut svg_buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut svg_buffer, (WIDTH, HEIGHT)).into_drawing_area();
        let drawn = draw(&root).and_then(|()| root.present().map_err(Into::into));
        if let Err(e) = drawn {
            tracing::warn!("Failed to draw chart '{}': {}", title, e);
        }
    }

    make_svg_responsive(svg_buffer)
}

fn draw_empty(root: &DrawingArea<SVGBackend<'_>, Shift>, title: &str) -> DrawResult<()> {
    root.fill(&WHITE)?;
    let area = root.titled(title, (FONT, TITLE_SIZE))?;
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        EMPTY_MESSAGE,
        ((w / 2) as i32, (h / 2) as i32),
        (FONT, 14)
            .into_font()
            .color(&MUTED_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;
    Ok(())
}

/// Label of the bar centered on `x`, blank between bars.
fn bar_label(labels: &[&str], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    labels
        .get(idx as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}

fn draw_bars(root: &DrawingArea<SVGBackend<'_>, Shift>, chart: &BarChart<'_>) -> DrawResult<()> {
    root.fill(&WHITE)?;

    let n = chart.bars.len();
    let max = chart
        .bars
        .iter()
        .map(|b| b.value)
        .fold(0.0_f64, f64::max)
        .max(1.0);
    // headroom for value labels printed outside the bars
    let y_max = if chart.value_labels { max * 1.12 } else { max };

    let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
    let x_formatter = |x: &f64| bar_label(&labels, *x);
    let y_formatter = |y: &f64| format_number((*y * 100.0).round() / 100.0);

    let rotate = n > 8;
    let tick_font = (FONT, 11).into_font();
    let x_label_font = if rotate {
        tick_font.transform(FontTransform::Rotate90)
    } else {
        tick_font.clone()
    };

    // bar i is centered on x = i so the unit-step axis labels land on bars
    let mut plot = ChartBuilder::on(root)
        .caption(chart.title, (FONT, TITLE_SIZE))
        .margin(12)
        .x_label_area_size(if rotate { 96 } else { 40 })
        .y_label_area_size(56)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)?;

    plot.configure_mesh()
        .disable_x_mesh()
        .x_labels(n.min(MAX_X_LABELS))
        .x_label_formatter(&x_formatter)
        .x_label_style(x_label_font)
        .y_labels(Y_TICKS)
        .y_label_formatter(&y_formatter)
        .y_label_style(tick_font)
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .axis_desc_style((FONT, 12))
        .draw()?;

    let half_width = (1.0 - chart.gap) / 2.0;
    plot.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new(
            [(x - half_width, 0.0), (x + half_width, bar.value)],
            bar.color.filled(),
        )
    }))?;

    if chart.value_labels {
        let style = (FONT, 12)
            .into_font()
            .color(&TEXT_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        plot.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            Text::new(format_number(bar.value), (i as f64, bar.value), style.clone())
        }))?;
    }

    Ok(())
}

fn draw_donut(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    slices: &[Slice],
    hole: f64,
) -> DrawResult<()> {
    root.fill(&WHITE)?;
    let area = root.titled(title, (FONT, TITLE_SIZE))?;

    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = f64::from(w.min(h)) * 0.36;

    let sizes: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.donut_hole(radius * hole);
    pie.label_style((FONT, 13).into_font().color(&TEXT_COLOR));
    pie.percentages((FONT, 12).into_font().color(&WHITE));
    area.draw(&pie)?;

    Ok(())
}

pub fn bar_chart(chart: &BarChart<'_>) -> String {
    if chart.bars.is_empty() {
        return render(chart.title, |root| draw_empty(root, chart.title));
    }
    render(chart.title, |root| draw_bars(root, chart))
}

/// Pie chart with a hole of `hole` times the radius (0 draws a full pie).
pub fn donut_chart(title: &str, slices: &[Slice], hole: f64) -> String {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if slices.is_empty() || total <= 0.0 {
        return render(title, |root| draw_empty(root, title));
    }
    render(title, |root| draw_donut(root, title, slices, hole))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_fill(svg: &str, hex: &str) -> bool {
        svg.to_ascii_lowercase().contains(&hex.to_ascii_lowercase())
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(33.333), "33.33");
    }

    #[test]
    fn test_bar_label_only_on_bar_centers() {
        let labels = ["2024-01-01", "2024-01-02"];
        assert_eq!(bar_label(&labels, 0.0), "2024-01-01");
        assert_eq!(bar_label(&labels, 1.0), "2024-01-02");
        assert_eq!(bar_label(&labels, 0.5), "");
        assert_eq!(bar_label(&labels, 2.0), "");
        assert_eq!(bar_label(&labels, -1.0), "");
    }

    #[test]
    fn test_bar_chart_is_a_responsive_svg() {
        let chart = BarChart {
            title: "Disconnection Reasons Breakdown",
            x_label: "DisconnectionReason",
            y_label: "count",
            bars: vec![Bar::new("user_hangup", 4.0), Bar::new("agent_hangup", 1.0)],
            value_labels: false,
            gap: 0.2,
        };
        let svg = bar_chart(&chart);

        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("class=\"chart\""));
        assert!(!svg.contains(&format!("width=\"{WIDTH}\" height=\"{HEIGHT}\"")));
        assert!(svg.contains("Disconnection Reasons Breakdown"));
        assert!(svg.contains("user_hangup"));
        assert!(svg.contains("agent_hangup"));
        assert!(has_fill(&svg, "#636efa"));
    }

    #[test]
    fn test_outcome_bars_carry_colors_and_counts() {
        let chart = BarChart {
            title: "Call Outcome Breakdown",
            x_label: "Status",
            y_label: "Count",
            bars: vec![
                Bar::new("1", 17.0).with_color(named_color("green")),
                Bar::new("0", 9.0).with_color(named_color("red")),
            ],
            value_labels: true,
            gap: 0.2,
        };
        let svg = bar_chart(&chart);

        assert!(has_fill(&svg, "#008000"));
        assert!(has_fill(&svg, "#ff0000"));
        assert!(svg.contains(">17</text>"));
        assert!(svg.contains(">9</text>"));
    }

    #[test]
    fn test_empty_series_renders_placeholder() {
        let chart = BarChart {
            title: "Daily Purchases After Calls",
            x_label: "Date",
            y_label: "Purchases",
            bars: Vec::new(),
            value_labels: false,
            gap: 0.2,
        };
        assert!(bar_chart(&chart).contains(EMPTY_MESSAGE));
        assert!(donut_chart("Customer Sentiment Analysis", &[], 0.3).contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_donut_labels_slices() {
        let slices = vec![
            Slice {
                label: "Positive".to_string(),
                value: 3.0,
            },
            Slice {
                label: "Negative".to_string(),
                value: 1.0,
            },
        ];
        let svg = donut_chart("Customer Sentiment Analysis", &slices, 0.3);

        assert!(svg.contains("Customer Sentiment Analysis"));
        assert!(svg.contains("Positive"));
        assert!(svg.contains("Negative"));
        assert!(has_fill(&svg, "#636efa"));
        assert!(has_fill(&svg, "#ef553b"));
        assert!(!svg.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(named_color("green"), RGBColor(0, 128, 0));
        assert_eq!(named_color("red"), RGBColor(255, 0, 0));
        assert_eq!(named_color("gray"), RGBColor(128, 128, 128));
    }
}
