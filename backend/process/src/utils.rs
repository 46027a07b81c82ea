use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use tables::Table;

pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);

    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }

    pb
}

/// Trim whitespace and trailing slashes so `http://host/` and `http://host` rebase the same.
pub fn normalize_origin(input: &str) -> String {
    input.trim().trim_end_matches('/').to_string()
}

/// One row keyed by header, for printing.
pub fn row_as_json(table: &Table, index: usize) -> Value {
    let object: Map<String, Value> = table
        .headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            (
                header.clone(),
                Value::String(table.cell(index, column).to_string()),
            )
        })
        .collect();

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalize_origin() {
        assert_eq!(normalize_origin("http://localhost:7777/"), "http://localhost:7777");
        assert_eq!(normalize_origin("  https://hive.example//  "), "https://hive.example");
        assert_eq!(normalize_origin("/"), "");
    }

    #[test]
    fn test_row_as_json_fills_short_rows() {
        let table = Table::from_values(vec![
            vec!["id".into(), "image_path".into()],
            vec!["c1".into()],
        ]);

        assert_eq!(row_as_json(&table, 0), json!({ "id": "c1", "image_path": "" }));
    }
}
