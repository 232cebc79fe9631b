//! Terminal rendering of sheets and records.

use colored::Colorize;
use gsheet_core::{SheetInfo, Template};
use gsheet_store::SheetView;
use serde::Serialize;

/// Output format for results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Aligned table output (default)
    #[default]
    Table,
}

/// Render `rows` under `headers` as an aligned text table.
pub fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map_or("", String::as_str);
                format!("{cell:<width$}")
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![render(headers), separator];
    lines.extend(rows.iter().map(|row| render(row)));
    lines.join("\n")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_sheets(sheets: &[SheetInfo], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(sheets),
        OutputFormat::Table => {
            if sheets.is_empty() {
                println!("{}", "(no sheets)".yellow());
                return Ok(());
            }
            for sheet in sheets {
                println!(
                    "{} {} {}",
                    format!("[{}]", sheet.sheet_id).dimmed(),
                    sheet.title.cyan().bold(),
                    format!("({} columns)", sheet.headers.len()).dimmed()
                );
            }
            Ok(())
        }
    }
}

/// Print a sheet's records. With `fields`, show the canonical field
/// projection of each record instead of the raw columns.
pub fn print_sheet(view: &SheetView, fields: bool, format: OutputFormat) -> anyhow::Result<()> {
    let data = view.data();

    match (format, fields) {
        (OutputFormat::Json, false) => print_json(data),
        (OutputFormat::Json, true) => {
            let projected: Vec<_> = (0..view.records().len())
                .filter_map(|row_index| view.fields(row_index))
                .collect();
            print_json(&projected)
        }
        (OutputFormat::Table, _) if data.headers.is_empty() => {
            println!("{}", "(empty sheet)".yellow());
            Ok(())
        }
        (OutputFormat::Table, false) => {
            let mut headers = vec!["#".to_string()];
            headers.extend(data.headers.iter().cloned());
            let rows: Vec<Vec<String>> = data
                .records
                .iter()
                .map(|record| {
                    let mut row = vec![record.row_index.to_string()];
                    row.extend(record.to_row());
                    row
                })
                .collect();
            println!("{}", format_table(&headers, &rows));
            Ok(())
        }
        (OutputFormat::Table, true) => {
            let (headers, rows) = field_table(view);
            println!("{}", format_table(&headers, &rows));
            Ok(())
        }
    }
}

/// Header and rows of the canonical field table: one column per mapped
/// field, in field order.
fn field_table(view: &SheetView) -> (Vec<String>, Vec<Vec<String>>) {
    let keys: Vec<_> = view.mapping().iter().map(|(key, _)| key).collect();
    let mut headers = vec!["#".to_string()];
    headers.extend(keys.iter().map(ToString::to_string));

    let rows = (0..view.records().len())
        .filter_map(|row_index| {
            let projected = view.fields(row_index)?;
            let mut row = vec![row_index.to_string()];
            row.extend(keys.iter().map(|k| projected.get(k).cloned().unwrap_or_default()));
            Some(row)
        })
        .collect();
    (headers, rows)
}

pub fn print_templates(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let templates: serde_json::Map<String, serde_json::Value> = Template::ALL
                .iter()
                .map(|t| (t.name().to_string(), serde_json::json!(t.headers())))
                .collect();
            print_json(&templates)
        }
        OutputFormat::Table => {
            for template in Template::ALL {
                println!("{}", template.name().cyan().bold());
                println!("  {}", template.headers().join(", "));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let table = format_table(
            &strings(&["#", "Tarih", "Tutar"]),
            &[
                strings(&["0", "2024-01-05", "100000"]),
                strings(&["1", "2024-02-01", "15"]),
            ],
        );
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "# | Tarih      | Tutar");
        assert_eq!(lines[1], "--+------------+-------");
        assert_eq!(lines[2], "0 | 2024-01-05 | 100000");
        assert_eq!(lines[3], "1 | 2024-02-01 | 15");
    }

    #[test]
    fn test_format_table_counts_chars_not_bytes() {
        let table = format_table(&strings(&["Açıklama"]), &[strings(&["Çimento"])]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[1], "--------");
        assert_eq!(lines[2], "Çimento");
    }

    #[test]
    fn test_field_table_uses_canonical_keys() {
        let view = SheetView::new(gsheet_core::SheetData::from_rows(vec![
            strings(&["Proje Adı", "Not", "İşveren"]),
            strings(&["GUEST HOUSE", "x", "IRAK HÜKUNETİ"]),
            strings(&["OKUL"]),
        ]));

        let (headers, rows) = field_table(&view);
        assert_eq!(headers, strings(&["#", "proje_adi", "isveren"]));
        assert_eq!(rows[0], strings(&["0", "GUEST HOUSE", "IRAK HÜKUNETİ"]));
        assert_eq!(rows[1], strings(&["1", "OKUL", ""]));
    }

    #[test]
    fn test_format_table_without_rows() {
        let table = format_table(&strings(&["A", "B"]), &[]);
        assert_eq!(table, "A | B\n--+--");
    }
}
