//! Box-drawn tables for cache listings.

use console::measure_text_width;

/// A simple table whose cells may carry ANSI styling.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers.
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.as_ref().to_string()).collect();
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row. Cells beyond the header count are dropped.
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row
            .into_iter()
            .map(Into::into)
            .take(self.headers.len())
            .collect();

        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(measure_text_width(cell));
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);

        lines.push(self.render_border('┌', '┬', '┐'));
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_border('├', '┼', '┤'));
        lines.extend(self.rows.iter().map(|row| self.render_row(row)));
        lines.push(self.render_border('└', '┴', '┘'));

        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        format!("{left}{}{right}", segments.join(&mid.to_string()))
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");

        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            // Pad by visible width so styled cells line up.
            let padding = width.saturating_sub(measure_text_width(cell));
            s.push_str(&format!(" {}{} │", cell, " ".repeat(padding)));
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_empty() {
        let table = Table::new(&["Family", "Rows"]);
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);

        let output = table.render();
        assert!(output.contains("Family"));
        assert!(output.contains("Rows"));
    }

    #[test]
    fn table_with_rows() {
        let mut table = Table::new(&["Family", "Last checked"]);
        table.add_row(["7.5.0", "7.5.0.12"]);
        table.add_row(["7.4.1", "-"]);

        assert_eq!(table.row_count(), 2);

        let output = table.render();
        assert!(output.contains("7.5.0.12"));
        assert!(output.contains("7.4.1"));
    }

    #[test]
    fn table_line_count() {
        let mut table = Table::new(&["Family", "Rows", "Size"]);
        table.add_row(["7.5.0", "12", "1.2 KB"]);
        table.add_row(["7.4.1", "3", "300 B"]);
        table.add_row(["7.4.0", "0", "52 B"]);

        let output = table.render();
        // top border, header, separator, 3 rows, bottom border
        assert_eq!(output.lines().count(), 7);
    }

    #[test]
    fn table_handles_missing_cells() {
        let mut table = Table::new(&["A", "B", "C"]);
        table.add_row(["only", "two"]);

        let output = table.render();
        assert!(output.contains("only"));
        assert!(output.contains("two"));
    }

    #[test]
    fn styled_cells_keep_alignment() {
        let mut table = Table::new(&["Status"]);
        table.add_row([console::style("true").green().force_styling(true).to_string()]);
        table.add_row(["unknown".to_string()]);

        let output = table.render();
        let widths: Vec<usize> = output.lines().map(measure_text_width).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn table_uses_box_drawing() {
        let mut table = Table::new(&["Col1", "Col2"]);
        table.add_row(["a", "b"]);
        let output = table.render();

        for glyph in ["┌", "┬", "┐", "├", "┼", "┤", "└", "┴", "┘", "│", "─"] {
            assert!(output.contains(glyph), "missing {glyph}");
        }
    }
}
