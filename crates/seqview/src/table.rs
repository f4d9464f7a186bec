use seqview_core::Sequence;

/// One printed line of the sequence table.
pub struct SequenceRow<'a> {
    pub sequence: &'a Sequence,
    pub selected: bool,
    pub offer_reload: bool,
}

pub struct TableFormatter {
    context_width: usize,
    name_width: usize,
    service_width: usize,
    status_width: usize,
    stages_width: usize,
    started_width: usize,
}

impl TableFormatter {
    pub fn new(sequences: &[&Sequence]) -> Self {
        let context_width = sequences
            .iter()
            .map(|s| s.shkeptncontext.chars().count())
            .max()
            .unwrap_or(16)
            .clamp(7, 40); // Between "Context" header and a sane terminal width
        let name_width = sequences
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(8)
            .clamp(8, 24);
        let service_width = sequences
            .iter()
            .map(|s| s.service.chars().count())
            .max()
            .unwrap_or(7)
            .clamp(7, 24);

        Self {
            context_width,
            name_width,
            service_width,
            status_width: 9,
            stages_width: 24,
            started_width: 19,
        }
    }

    pub fn print_table(&self, rows: &[SequenceRow<'_>]) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!("{}", self.header_row());
        println!("{}", self.border('├', '┼', '┤'));
        for row in rows {
            println!("{}", self.format_row(row));
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn widths(&self) -> [usize; 6] {
        [
            self.context_width,
            self.name_width,
            self.service_width,
            self.status_width,
            self.stages_width,
            self.started_width,
        ]
    }

    fn border(&self, left: char, middle: char, right: char) -> String {
        let cells: Vec<String> = self.widths().iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, cells.join(&middle.to_string()), right)
    }

    fn header_row(&self) -> String {
        self.line([
            "Context", "Sequence", "Service", "Status", "Stages", "Started",
        ])
    }

    pub fn format_row(&self, row: &SequenceRow<'_>) -> String {
        let seq = row.sequence;
        let mut context = seq.shkeptncontext.clone();
        if row.selected {
            context = format!("*{}", context);
        }
        let mut status = seq.status().label().to_string();
        if row.offer_reload {
            status.push_str(" ↻");
        }
        let started = seq.time.format("%Y-%m-%d %H:%M:%S").to_string();
        self.line([
            &context,
            &seq.name,
            &seq.service,
            &status,
            &seq.stages().join(","),
            &started,
        ])
    }

    fn line(&self, cells: [&str; 6]) -> String {
        let cells: Vec<String> = cells
            .iter()
            .zip(self.widths())
            .map(|(cell, width)| truncate(cell, width))
            .collect();
        format!("│ {} │", cells.join(" │ "))
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
