//! Server-rendered HTML for the login and dashboard pages.
//!
//! The map (Leaflet) and the bar chart (Vega-Lite) are drawn client-side from
//! JSON embedded in the page; everything else is plain HTML.

use num_format::{Locale, ToFormattedString};
use serde::Serialize;
use serde_json::{json, Value};
use water_common::{BoundingBox, WaterAreaReport};

use crate::config::{InputDefaults, MapConfig};
use crate::params::InputParams;

const PAGE_STYLE: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; background: #fafafa; color: #1f2933; }
    header { background: linear-gradient(135deg, #1a365d 0%, #2d4a6f 100%); color: white; padding: 16px 40px; display: flex; align-items: center; }
    header h1 { margin: 0; font-size: 1.4rem; font-weight: 600; }
    header .user { margin-left: auto; display: flex; gap: 12px; align-items: center; font-size: 0.9rem; }
    header button { background: rgba(255,255,255,0.2); color: white; border: 0; padding: 6px 12px; border-radius: 4px; cursor: pointer; }
    main { padding: 20px 40px; max-width: 1200px; }
    h2 { font-size: 1.15rem; margin-top: 28px; }
    form.inputs { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px 24px; background: white; padding: 16px; border-radius: 6px; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
    form.inputs label { display: flex; flex-direction: column; font-size: 0.85rem; gap: 4px; }
    form.inputs .wide { grid-column: 1 / -1; }
    form.inputs input { padding: 6px 8px; border: 1px solid #cbd2d9; border-radius: 4px; }
    button.primary { background: #2d4a6f; color: white; border: 0; padding: 8px 16px; border-radius: 4px; cursor: pointer; }
    .error { background: #fde8e8; color: #9b1c1c; padding: 12px 16px; border-radius: 4px; margin: 16px 0; white-space: pre-line; }
    .warning { background: #fdf6b2; color: #723b13; padding: 12px 16px; border-radius: 4px; margin: 16px 0; }
    #map { height: 500px; width: 900px; max-width: 100%; border-radius: 6px; }
    table { border-collapse: collapse; background: white; width: 100%; }
    th, td { padding: 6px 12px; border-bottom: 1px solid #e4e7eb; text-align: right; }
    th:first-child, td:first-child { text-align: left; }
    .summary { font-size: 0.9rem; color: #52606d; }
    details { margin: 28px 0; background: white; padding: 12px 16px; border-radius: 6px; }
"#;

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize JSON for embedding inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Format with thousands separators and no decimals, e.g. `1,234,500`.
pub fn group_thousands(value: f64) -> String {
    (value.round() as i64).to_formatted_string(&Locale::en)
}

/// Side length label: `2` for whole kilometers, `2.5` otherwise.
fn side_label(side_km: f64) -> String {
    if side_km.fract() == 0.0 {
        format!("{:.0}", side_km)
    } else {
        format!("{}", side_km)
    }
}

/// Values shown in the input form: what the user sent, or the defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormValues {
    pub start: String,
    pub end: String,
    pub lat: String,
    pub lon: String,
    pub side_km: String,
    pub threshold: String,
}

impl FormValues {
    pub fn from_params(params: &InputParams, defaults: &InputDefaults) -> Self {
        fn pick(raw: &Option<String>, default: String) -> String {
            raw.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or(default)
        }

        Self {
            start: pick(&params.start, defaults.start_date.format("%Y-%m-%d").to_string()),
            end: pick(&params.end, defaults.end_date.format("%Y-%m-%d").to_string()),
            lat: pick(&params.lat, format!("{:.6}", defaults.center_lat)),
            lon: pick(&params.lon, format!("{:.6}", defaults.center_lon)),
            side_km: pick(&params.side_km, format!("{:.1}", defaults.side_km)),
            threshold: pick(&params.threshold, format!("{:.2}", defaults.threshold)),
        }
    }
}

/// Everything the dashboard page needs.
pub struct DashboardView<'a> {
    pub site_name: &'a str,
    pub username: &'a str,
    pub map: &'a MapConfig,
    pub form: FormValues,
    pub side_km: f64,
    pub error: Option<String>,
    pub aoi: Option<(f64, f64, BoundingBox)>,
    pub report: Option<WaterAreaReport>,
}

/// Vega-Lite bar chart of water area (km²) by month.
pub fn chart_spec(report: &WaterAreaReport) -> Value {
    json!({
        "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
        "width": "container",
        "height": 320,
        "data": { "values": report.months },
        "mark": "bar",
        "encoding": {
            "x": { "field": "month", "type": "nominal", "title": "Month", "sort": null },
            "y": { "field": "area_km2", "type": "quantitative", "title": "Water area (km²)" },
            "tooltip": [
                { "field": "month", "type": "nominal", "title": "Month" },
                { "field": "area_km2", "type": "quantitative", "title": "Area (km²)", "format": ".4f" },
                { "field": "area_m2", "type": "quantitative", "title": "Area (m²)", "format": ",.0f" },
                { "field": "pixel_count", "type": "quantitative", "title": "Pixels" }
            ]
        }
    })
}

/// Leaflet map description: center, zoom, AOI rectangle.
pub fn map_spec(center_lat: f64, center_lon: f64, bbox: &BoundingBox, map: &MapConfig) -> Value {
    json!({
        "center": [center_lat, center_lon],
        "zoom": map.zoom,
        "tileUrl": map.tile_url,
        "bounds": bbox.leaflet_bounds(),
    })
}

/// HTML table of the monthly rows.
pub fn results_table(report: &WaterAreaReport) -> String {
    let mut rows = String::new();
    for row in &report.months {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td></tr>\n",
            escape_html(&row.month),
            row.pixel_count,
            group_thousands(row.area_m2),
            row.area_km2
        ));
    }

    format!(
        r#"<table id="results">
<thead><tr><th>Month</th><th>Pixel count (&gt; threshold)</th><th>Water area (m²)</th><th>Water area (km²)</th></tr></thead>
<tbody>
{}</tbody>
</table>"#,
        rows
    )
}

fn page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
    {head_extra}
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
        style = PAGE_STYLE,
        head_extra = head_extra,
        body = body,
    )
}

/// Login form, optionally with an error banner.
pub fn login_page(error: Option<&str>) -> String {
    let banner = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape_html(e)))
        .unwrap_or_default();

    let body = format!(
        r#"<header><h1>Login</h1></header>
<main>
{banner}
<form method="post" action="/login" class="inputs" style="grid-template-columns: 1fr; max-width: 360px;">
    <label>Username <input type="text" name="username" autocomplete="username" required></label>
    <label>Password <input type="password" name="password" autocomplete="current-password" required></label>
    <div><button type="submit" class="primary">Log in</button></div>
</form>
</main>"#,
        banner = banner
    );

    page("Login", "", &body)
}

/// The dashboard: inputs, AOI map, table, chart and notes.
pub fn dashboard_page(view: &DashboardView<'_>) -> String {
    let side = side_label(view.side_km);
    let title = format!(
        "Dynamic World • Monthly Water Area — {} ({} km × {} km)",
        view.site_name, side, side
    );
    let form = &view.form;

    let mut body = format!(
        r#"<header>
    <h1>{title}</h1>
    <div class="user">Logged in as {user}
        <form method="post" action="/logout"><button type="submit">Log out</button></form>
    </div>
</header>
<main>
<form method="get" action="/" class="inputs">
    <label>Start date <input type="date" name="start" value="{start}"></label>
    <label>End date (inclusive) <input type="date" name="end" value="{end}"></label>
    <span></span>
    <label>Center latitude <input type="number" name="lat" step="0.000001" value="{lat}"></label>
    <label>Center longitude <input type="number" name="lon" step="0.000001" value="{lon}"></label>
    <label>Square side length (km) <input type="number" name="side_km" min="0.5" step="0.5" value="{side_km}"></label>
    <label class="wide">Water probability threshold (applied to monthly mean of Dynamic World 'water' band): <output id="threshold-value">{threshold}</output>
        <input type="range" name="threshold" min="0" max="1" step="0.05" value="{threshold}"
               oninput="document.getElementById('threshold-value').value = this.value">
    </label>
    <div class="wide"><button type="submit" class="primary">Compute</button></div>
</form>
<p><strong>Area of Interest (AOI):</strong> Square centered on {site}. Default <strong>2 km × 2 km</strong> (adjustable).</p>
"#,
        title = escape_html(&title),
        user = escape_html(view.username),
        site = escape_html(view.site_name),
        start = escape_html(&form.start),
        end = escape_html(&form.end),
        lat = escape_html(&form.lat),
        lon = escape_html(&form.lon),
        side_km = escape_html(&form.side_km),
        threshold = escape_html(&form.threshold),
    );

    if let Some(error) = &view.error {
        body.push_str(&format!(r#"<div class="error">{}</div>"#, escape_html(error)));
    }

    let mut scripts = String::new();

    if let Some((lat, lon, bbox)) = &view.aoi {
        body.push_str("<h2>AOI Map</h2>\n<div id=\"map\"></div>\n");
        scripts.push_str(&format!(
            r#"<script>
(function() {{
    const aoi = {aoi};
    const map = L.map('map', {{ zoomControl: true }}).setView(aoi.center, aoi.zoom);
    L.tileLayer(aoi.tileUrl, {{ maxZoom: 19, attribution: '&copy; OpenStreetMap contributors' }}).addTo(map);
    L.control.scale().addTo(map);
    L.rectangle(aoi.bounds, {{ color: 'blue', weight: 2, fill: true, fillOpacity: 0.1 }}).addTo(map);
    L.marker(aoi.center).bindTooltip('AOI center').addTo(map);
}})();
</script>
"#,
            aoi = script_json(&map_spec(*lat, *lon, bbox, view.map))
        ));
    }

    if let Some(report) = &view.report {
        if report.is_empty() {
            body.push_str(r#"<div class="warning">No results returned for the selected range.</div>"#);
        } else {
            body.push_str("<h2>Monthly Water Area</h2>\n");
            body.push_str(&results_table(report));
            body.push_str(&format!(
                r#"<p class="summary">{} months · peak {} ({:.4} km²) · mean {:.4} km²</p>"#,
                report.summary.month_count,
                escape_html(report.summary.max_month.as_deref().unwrap_or("-")),
                report.summary.max_area_km2,
                report.summary.mean_area_km2
            ));
            if let Ok(query) = serde_urlencoded::to_string(form) {
                body.push_str(&format!(
                    "<p><a href=\"/api/water-area?{}&amp;f=csv\">Download CSV</a></p>\n",
                    escape_html(&query)
                ));
            }
            body.push_str("<h2>Bar Chart: Monthly Water Area (km²)</h2>\n<div id=\"chart\" style=\"width: 100%;\"></div>\n");
            scripts.push_str(&format!(
                "<script>vegaEmbed('#chart', {}, {{ actions: false }});</script>\n",
                script_json(&chart_spec(report))
            ));
        }
    }

    body.push_str(NOTES);
    body.push_str("</main>\n");
    body.push_str(&scripts);

    page(&title, HEAD_ASSETS, &body)
}

const HEAD_ASSETS: &str = r#"<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
    <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>"#;

const NOTES: &str = r#"<details>
<summary>Method &amp; Notes</summary>
<ul>
    <li><strong>Dataset:</strong> <code>GOOGLE/DYNAMICWORLD/V1</code> at <strong>10 m</strong> resolution; the <strong><code>water</code></strong> probability band is used.</li>
    <li><strong>Monthly aggregation:</strong> for each month, the <strong>mean</strong> water probability over all images is taken and then <strong>thresholded</strong> (default <strong>0.5</strong>).</li>
    <li><strong>Area:</strong> count of 10 m pixels above threshold × <strong>100 m²</strong> per pixel gives m²; divide by <strong>1e6</strong> for km².</li>
    <li><strong>AOI:</strong> the square you select (default <strong>2 km × 2 km</strong>) centered on the provided coordinates.</li>
    <li><strong>Zero rows:</strong> months without imagery, and months whose query failed, are reported as 0.</li>
    <li><strong>Tip:</strong> for monsoon-season dynamics, explore thresholds around <strong>0.4–0.6</strong>.</li>
</ul>
</details>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use water_common::{MonthRange, MonthlyWaterArea, ReportSummary};

    fn report(counts: &[u64]) -> WaterAreaReport {
        let rows: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let start = NaiveDate::from_ymd_opt(2024, i as u32 + 1, 1).unwrap();
                let range = MonthRange {
                    start,
                    end: water_common::months::first_of_next_month(start),
                };
                MonthlyWaterArea::from_pixel_count(&range, *c)
            })
            .collect();

        WaterAreaReport {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, counts.len().max(1) as u32, 28).unwrap(),
            center_lat: 18.405,
            center_lon: 73.585,
            side_km: 2.0,
            threshold: 0.5,
            bbox: BoundingBox::square(18.405, 73.585, 2.0),
            summary: ReportSummary::from_rows(&rows),
            months: rows,
        }
    }

    fn view(report: Option<WaterAreaReport>, error: Option<String>) -> String {
        let map = MapConfig::default();
        let v = DashboardView {
            site_name: "Panshet Dam",
            username: "ndsa",
            map: &map,
            form: FormValues::from_params(&InputParams::default(), &InputDefaults::default()),
            side_km: 2.0,
            error,
            aoi: Some((18.405, 73.585, BoundingBox::square(18.405, 73.585, 2.0))),
            report,
        };
        dashboard_page(&v)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(2_400_000.0), "2,400,000");
        assert_eq!(group_thousands(-12345.0), "-12,345");
    }

    #[test]
    fn test_side_label() {
        assert_eq!(side_label(2.0), "2");
        assert_eq!(side_label(2.5), "2.5");
    }

    #[test]
    fn test_form_values_defaults() {
        let form = FormValues::from_params(&InputParams::default(), &InputDefaults::default());
        assert_eq!(form.start, "2024-06-01");
        assert_eq!(form.end, "2025-06-30");
        assert_eq!(form.lat, "18.405000");
        assert_eq!(form.lon, "73.585000");
        assert_eq!(form.side_km, "2.0");
        assert_eq!(form.threshold, "0.50");
    }

    #[test]
    fn test_chart_spec() {
        let spec = chart_spec(&report(&[100, 200]));
        assert_eq!(spec["mark"], "bar");
        assert_eq!(spec["encoding"]["x"]["field"], "month");
        assert_eq!(spec["encoding"]["y"]["field"], "area_km2");
        assert_eq!(spec["data"]["values"].as_array().unwrap().len(), 2);
        assert!(spec["encoding"]["x"]["sort"].is_null());
    }

    #[test]
    fn test_results_table() {
        let html = results_table(&report(&[12_345, 0]));
        assert!(html.contains("<td>2024-01</td><td>12345</td><td>1,234,500</td><td>1.2345</td>"));
        assert!(html.contains("<td>2024-02</td><td>0</td><td>0</td><td>0.0000</td>"));
        assert!(html.contains("Pixel count (&gt; threshold)"));
    }

    #[test]
    fn test_dashboard_page_with_results() {
        let html = view(Some(report(&[100, 200, 300])), None);
        assert!(html.contains("Panshet Dam (2 km × 2 km)"));
        assert!(html.contains("id=\"map\""));
        assert!(html.contains("vegaEmbed('#chart'"));
        assert!(html.contains("Method &amp; Notes"));
        assert!(html.contains("f=csv"));
        assert!(!html.contains("No results returned"));
    }

    #[test]
    fn test_dashboard_page_empty_report_warns() {
        let html = view(Some(report(&[])), None);
        assert!(html.contains("No results returned for the selected range."));
        assert!(!html.contains("vegaEmbed"));
    }

    #[test]
    fn test_dashboard_page_error_is_escaped() {
        let html = view(None, Some("bad <input>".to_string()));
        assert!(html.contains("bad &lt;input&gt;"));
        assert!(!html.contains("id=\"results\""));
    }

    #[test]
    fn test_login_page() {
        assert!(login_page(None).contains("action=\"/login\""));
        assert!(login_page(Some("Invalid username or password")).contains("class=\"error\""));
    }

    #[test]
    fn test_form_query_string() {
        let mut form = FormValues::from_params(&InputParams::default(), &InputDefaults::default());
        form.lat = "-18.5".to_string();
        form.start = "2024 06&x".to_string();
        let qs = serde_urlencoded::to_string(&form).unwrap();
        assert!(qs.starts_with("start=2024+06%26x&end=2025-06-30&lat=-18.5&"));
        assert!(qs.ends_with("&threshold=0.50"));
    }
}
