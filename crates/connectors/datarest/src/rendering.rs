//! Serialize a tabular result into the response body.

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use query_engine_execution::TabularResult;

use crate::error::RequestError;

/// A supported output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Html,
}

/// Pick the first recognized format token. An empty clause means json; a
/// non-empty clause with no recognized token is an error.
pub fn choose_format(formats: &[String]) -> Result<Format, RequestError> {
    if formats.is_empty() {
        return Ok(Format::Json);
    }
    formats
        .iter()
        .find_map(|token| match token.as_str() {
            "json" => Some(Format::Json),
            "csv" => Some(Format::Csv),
            "html" => Some(Format::Html),
            _ => None,
        })
        .ok_or_else(|| RequestError::UnsupportedFormat(formats.join(",")))
}

/// Render the result in the requested format. Configured header overrides
/// are applied last, so they can replace the computed content type or
/// disposition.
pub fn render(
    result: &TabularResult,
    formats: &[String],
    overrides: &[(HeaderName, HeaderValue)],
) -> Result<Response, RequestError> {
    let format = choose_format(formats)?;
    let (content_type, body) = match format {
        Format::Json => ("application/json", serde_json::to_vec(&result.rows)?),
        Format::Csv => ("text/csv", to_csv(result)?),
        Format::Html => ("text/html", to_html(result).into_bytes()),
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    if format == Format::Csv {
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment;filename=file.csv"),
        );
    }
    for (name, value) in overrides {
        headers.insert(name.clone(), value.clone());
    }

    Ok((StatusCode::OK, headers, body).into_response())
}

fn to_csv(result: &TabularResult) -> Result<Vec<u8>, RequestError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    if !result.rows.is_empty() {
        writer.write_record(result.columns())?;
        for row in &result.rows {
            writer.write_record(row.values().map(cell_text))?;
        }
    }
    writer
        .into_inner()
        .map_err(|err| RequestError::Csv(err.into_error().into()))
}

fn to_html(result: &TabularResult) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for column in result.columns() {
        html.push_str("<th>");
        html.push_str(&escape(column));
        html.push_str("</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &result.rows {
        html.push_str("<tr>");
        for value in row.values() {
            html.push_str("<td>");
            html.push_str(&escape(&cell_text(value)));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_execution::Row;

    fn result() -> TabularResult {
        let rows = vec![
            Row::from_iter([
                ("name".to_string(), serde_json::json!("AND")),
                ("c1".to_string(), serde_json::json!(4)),
            ]),
            Row::from_iter([
                ("name".to_string(), serde_json::json!("IND")),
                ("c1".to_string(), serde_json::json!(2)),
            ]),
        ];
        TabularResult { rows }
    }

    #[test]
    fn the_first_recognized_format_wins() {
        assert_eq!(
            choose_format(&["csv".to_string(), "json".to_string()]).unwrap(),
            Format::Csv
        );
        assert_eq!(choose_format(&[]).unwrap(), Format::Json);
        assert!(matches!(
            choose_format(&["xml".to_string()]),
            Err(RequestError::UnsupportedFormat(tokens)) if tokens == "xml"
        ));
    }

    #[test]
    fn csv_has_a_header_row() {
        let bytes = to_csv(&result()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "name,c1\nAND,4\nIND,2\n"
        );
    }

    #[test]
    fn empty_results_render_as_empty_csv() {
        let bytes = to_csv(&TabularResult::empty()).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn html_escapes_cells() {
        let rows = vec![Row::from_iter([(
            "name".to_string(),
            serde_json::json!("<b>&co"),
        )])];
        let html = to_html(&TabularResult { rows });
        assert!(html.contains("<td>&lt;b&gt;&amp;co</td>"));
    }
}
