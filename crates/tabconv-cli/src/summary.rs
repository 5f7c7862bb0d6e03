//! Terminal tables for command results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabconv_cli::commands::{ConvertResult, InspectResult, KeySummary};

pub fn print_convert_summary(result: &ConvertResult) {
    println!("Source: {}", result.source.display());
    println!("Output: {}", result.output.display());
    println!(
        "Rows: {}  Columns: {} -> {}",
        result.rows, result.input_columns, result.output_columns
    );
    println!("{}", key_table(&result.keys));
}

pub fn print_inspect_summary(result: &InspectResult) {
    println!("Source: {}", result.source.display());
    println!("Rows: {}", result.rows);
    println!("{}", key_table(&result.keys));
}

fn key_table(keys: &[KeySummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Converter"),
        header_cell("Outputs"),
        header_cell("Labels"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
    if let Some(column) = table.column_mut(2) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for key in keys {
        table.add_row(vec![
            Cell::new(&key.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&key.converter),
            count_cell(key.labels.len()),
            labels_cell(&key.labels),
        ]);
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count)
    }
}

fn labels_cell(labels: &[String]) -> Cell {
    if labels.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(labels.join(", "))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
