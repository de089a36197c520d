//! Text and HTML fragments written into page targets.

use crate::Reading;

// ---

/// Shown wherever a value is unavailable.
pub const PLACEHOLDER: &str = "--";

/// Shortest decimal form of a reading: `25.0` renders as `25`.
pub fn format_value(value: f64) -> String {
    format!("{value}")
}

pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format_value)
}

pub fn count_label(count: usize) -> String {
    format!("{count} data")
}

/// One `<tr>` per reading, in the order given.
pub fn table_rows(readings: &[Reading]) -> String {
    // ---
    readings
        .iter()
        .map(|r| {
            format!(
                "\n      <tr>\n        <td><strong>#{id}</strong></td>\n        <td>{ts}</td>\n        \
                 <td><span class=\"badge badge-temp\">{suhu}°C</span></td>\n        \
                 <td><span class=\"badge badge-humid\">{humidity}%</span></td>\n        \
                 <td><span class=\"badge badge-lux\">{lux} Lux</span></td>\n      </tr>\n    ",
                id = r.id,
                ts = escape_html(&r.timestamp),
                suhu = format_optional(r.suhu),
                humidity = format_optional(r.humidity),
                lux = format_optional(r.lux),
            )
        })
        .collect()
}

pub fn escape_html(text: &str) -> String {
    // ---
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

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn whole_numbers_render_without_fraction() {
        // ---
        assert_eq!(format_value(25.0), "25");
        assert_eq!(format_value(24.5), "24.5");
        assert_eq!(format_optional(None), "--");
        assert_eq!(format_optional(Some(59.0)), "59");
    }

    #[test]
    fn table_has_one_row_per_reading_with_units() {
        // ---
        let readings = vec![
            Reading {
                id: 2,
                timestamp: "2024-01-01 10:00:05".into(),
                suhu: Some(25.0),
                humidity: Some(60.0),
                lux: Some(300.0),
            },
            Reading {
                id: 1,
                timestamp: "2024-01-01 10:00:00".into(),
                suhu: Some(24.0),
                humidity: Some(58.0),
                lux: None,
            },
        ];
        let html = table_rows(&readings);

        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(html.contains("<strong>#2</strong>"));
        assert!(html.contains("<td>2024-01-01 10:00:05</td>"));
        assert!(html.contains(">25°C<"));
        assert!(html.contains(">60%<"));
        assert!(html.contains(">300 Lux<"));
        assert!(html.contains(">-- Lux<"));
        assert!(html.find("#2").unwrap() < html.find("#1").unwrap());
    }

    #[test]
    fn table_is_empty_for_no_readings() {
        // ---
        assert_eq!(table_rows(&[]), "");
        assert_eq!(count_label(0), "0 data");
    }

    #[test]
    fn timestamps_are_escaped() {
        // ---
        assert_eq!(escape_html("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }
}
