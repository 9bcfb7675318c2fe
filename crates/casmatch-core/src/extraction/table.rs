use crate::extraction::PageContent;

/// Reconstruct tables from pdftotext -layout output.
///
/// pdftotext -layout preserves column alignment using spaces, and some
/// reports also draw column rules with `|`. A table is a run of
/// consecutive lines that each split into at least two columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedTable {
    pub page_number: usize,
    pub start_line: usize,
    pub rows: Vec<Vec<String>>,
}

/// Split a laid-out line into cell texts.
///
/// Lines containing `|` are split on it, with the empty edges of a
/// bordered row dropped. Other lines are split on runs of two or more
/// whitespace characters.
pub fn split_columns(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.contains('|') {
        let mut cells: Vec<String> = trimmed.split('|').map(|c| c.trim().to_string()).collect();
        if cells.first().is_some_and(|c| c.is_empty()) {
            cells.remove(0);
        }
        if cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        return cells;
    }

    spans(line).into_iter().map(|s| s.text).collect()
}

/// A run of text on a laid-out line, with its character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    text: String,
}

fn spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut current: Option<Span> = None;
    let mut gap = 0usize;

    for (i, c) in line.chars().enumerate() {
        if c.is_whitespace() {
            gap += 1;
            continue;
        }
        match current.as_mut() {
            Some(span) if gap < 2 => {
                if gap == 1 {
                    span.text.push(' ');
                }
                span.text.push(c);
                span.end = i + 1;
            }
            _ => {
                spans.extend(current.take());
                current = Some(Span {
                    start: i,
                    end: i + 1,
                    text: c.to_string(),
                });
            }
        }
        gap = 0;
    }

    spans.extend(current);
    spans
}

/// Column extents shared by a table's lines: overlapping spans merge.
fn column_bounds<'a>(spans: impl Iterator<Item = &'a Span>) -> Vec<(usize, usize)> {
    let mut extents: Vec<(usize, usize)> = spans.map(|s| (s.start, s.end)).collect();
    extents.sort_unstable();

    let mut bounds: Vec<(usize, usize)> = Vec::new();
    for (start, end) in extents {
        match bounds.last_mut() {
            Some(last) if start < last.1 => last.1 = last.1.max(end),
            _ => bounds.push((start, end)),
        }
    }
    bounds
}

/// Place each span in the column it starts in. Columns with no text on
/// this line stay empty, so later cells keep their position.
fn place(spans: &[Span], bounds: &[(usize, usize)]) -> Vec<String> {
    let mut cells = vec![String::new(); bounds.len()];
    for span in spans {
        let Some(column) = bounds
            .iter()
            .position(|&(start, end)| span.start >= start && span.start < end)
        else {
            continue;
        };
        let cell = &mut cells[column];
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(&span.text);
    }
    cells
}

/// Split the lines of one table run into rows with aligned columns.
fn align_rows(lines: &[&str]) -> Vec<Vec<String>> {
    let laid_out: Vec<Option<Vec<Span>>> = lines
        .iter()
        .map(|line| (!line.contains('|')).then(|| spans(line)))
        .collect();
    let bounds = column_bounds(laid_out.iter().flatten().flatten());

    lines
        .iter()
        .zip(&laid_out)
        .map(|(line, spans)| match spans {
            Some(spans) => place(spans, &bounds),
            None => split_columns(line),
        })
        .collect()
}

/// Find the tables on one page.
///
/// Whitespace-separated rows are aligned on the column extents of the
/// whole run, so a blank cell leaves an empty string in place instead of
/// shifting the cells after it.
pub fn find_tables(page: &PageContent) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let mut start_line = 0;

    for (i, line) in page.lines.iter().enumerate() {
        if split_columns(line).len() >= 2 {
            if run.is_empty() {
                start_line = i;
            }
            run.push(line.as_str());
        } else if !run.is_empty() {
            tables.push(close_run(page.page_number, start_line, &run));
            run.clear();
        }
    }

    // Table running to the end of the page
    if !run.is_empty() {
        tables.push(close_run(page.page_number, start_line, &run));
    }

    tables
}

fn close_run(page_number: usize, start_line: usize, lines: &[&str]) -> DetectedTable {
    DetectedTable {
        page_number,
        start_line,
        rows: align_rows(lines),
    }
}
