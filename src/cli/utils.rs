use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;
use crate::filter::SortSpec;

pub const TRUNCATE_AT: usize = 60;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Prints `value` as JSON, or calls `render` for the text format.
pub fn output_value<T: Serialize>(
    output_format: &OutputFormat,
    value: &T,
    render: impl FnOnce(&T),
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render(value),
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Shortens long cell text for table output. `None` and blanks print as `N/A`.
pub fn truncate_text(text: Option<&str>) -> String {
    match text.map(str::trim) {
        None | Some("") => "N/A".to_string(),
        Some(text) if text.chars().count() > TRUNCATE_AT => {
            let head: String = text.chars().take(TRUNCATE_AT).collect();
            format!("{}...", head)
        }
        Some(text) => text.to_string(),
    }
}

pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn format_date_time(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Column header with the active sort marker, e.g. `Priority ^`.
pub fn header<F: Copy + PartialEq>(label: &str, field: F, sort: Option<&SortSpec<F>>) -> String {
    match sort {
        Some(spec) if spec.field == field => format!("{} {}", label, spec.direction.indicator()),
        _ => label.to_string(),
    }
}

/// Plain-text table with columns padded to their widest cell.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers)];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    out.extend(rows.iter().map(|row| line(row)));
    out.join("\n")
}

/// Asks for a `y` on stdin unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    confirm_from(&mut io::stdin().lock())
}

fn confirm_from(input: &mut impl BufRead) -> anyhow::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Reads a password from the flag, or the first line of stdin.
pub fn read_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PbiField;

    #[test]
    fn truncates_long_text() {
        let long = "x".repeat(75);
        let shown = truncate_text(Some(&long));
        assert_eq!(shown.len(), 63);
        assert!(shown.ends_with("..."));
        assert_eq!(truncate_text(Some("short")), "short");
        assert_eq!(truncate_text(None), "N/A");
        assert_eq!(truncate_text(Some("   ")), "N/A");
    }

    #[test]
    fn header_marks_active_sort() {
        let spec = SortSpec::desc(PbiField::Priority);
        assert_eq!(header("Priority", PbiField::Priority, Some(&spec)), "Priority v");
        assert_eq!(header("Title", PbiField::Title, Some(&spec)), "Title");
    }

    #[test]
    fn table_pads_columns() {
        let table = render_table(
            &["No.".to_string(), "Title".to_string()],
            &[vec!["1".to_string(), "Login".to_string()]],
        );
        assert_eq!(table, "No.  Title\n---  -----\n1    Login");
    }

    #[test]
    fn confirmation_needs_yes() {
        assert!(confirm_from(&mut "y\n".as_bytes()).unwrap());
        assert!(!confirm_from(&mut "\n".as_bytes()).unwrap());
        assert!(!confirm_from(&mut "nope\n".as_bytes()).unwrap());
        assert!(confirm("Delete?", true).unwrap());
    }
}
