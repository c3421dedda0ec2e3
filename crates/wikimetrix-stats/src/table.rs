//! A small column-ordered table of optional string cells and the assembly
//! of the per-article statistics table

use crate::page_stats::{fetch_page_stats, PageStats};
use crate::selection::{Case, Selection};
use chrono::{NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, instrument};
use wikimetrix_api::WikiApi;
use wikimetrix_common::{format_timestamp_utc, is_qid, with_context, MetrixError, Result};

pub const COL_LABEL: &str = "label";
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_SELECTION_METHOD: &str = "selection_method";
pub const COL_SELECTION: &str = "selection";
pub const COL_SELECTION_CASE: &str = "selection_case";

/// Meta columns, in the order they close every stats table
pub const META_COLUMNS: [&str; 5] = [
    COL_LABEL,
    COL_TIMESTAMP,
    COL_SELECTION_METHOD,
    COL_SELECTION,
    COL_SELECTION_CASE,
];

/// Rows of optional cells under named columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, which must have one cell per column
    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(MetrixError::validation(format!(
                "Row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_deref()).collect())
    }

    /// Cell of `row` under `column`
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Replace the cells of a column, appending the column if it is new
    pub fn set_column(&mut self, name: &str, values: Vec<Option<String>>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(MetrixError::validation(format!(
                "Column '{name}' has {} values but the table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Fill a column with the same value in every row
    pub fn fill_column(&mut self, name: &str, value: &str) -> Result<()> {
        let values = vec![Some(value.to_string()); self.rows.len()];
        self.set_column(name, values)
    }

    /// The same rows with columns rearranged; unknown names are skipped
    pub fn select(&self, order: &[&str]) -> Table {
        let indices: Vec<usize> = order.iter().filter_map(|name| self.column_index(name)).collect();
        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Keep every row of `self` and attach the cells of all `right` rows
    /// whose `right_on` equals `left_on`.
    ///
    /// Rows without a match get empty right cells. The `right_on` column is
    /// dropped; clashing right column names get a `_right` suffix.
    pub fn left_join(&self, right: &Table, left_on: &str, right_on: &str) -> Result<Table> {
        let left_key = self
            .column_index(left_on)
            .ok_or_else(|| MetrixError::validation_field(format!("Column '{left_on}' not found"), left_on))?;
        let right_key = right
            .column_index(right_on)
            .ok_or_else(|| MetrixError::validation_field(format!("Column '{right_on}' not found"), right_on))?;

        let kept: Vec<usize> = (0..right.columns.len()).filter(|&i| i != right_key).collect();
        let mut columns = self.columns.clone();
        for &i in &kept {
            let name = &right.columns[i];
            if self.columns.contains(name) {
                columns.push(format!("{name}_right"));
            } else {
                columns.push(name.clone());
            }
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for left_row in &self.rows {
            let matches: Vec<&Vec<Option<String>>> = match &left_row[left_key] {
                Some(key) => right
                    .rows
                    .iter()
                    .filter(|row| row[right_key].as_deref() == Some(key.as_str()))
                    .collect(),
                None => Vec::new(),
            };

            if matches.is_empty() {
                let mut row = left_row.clone();
                row.extend(std::iter::repeat(None).take(kept.len()));
                rows.push(row);
            } else {
                for right_row in matches {
                    let mut row = left_row.clone();
                    row.extend(kept.iter().map(|&i| right_row[i].clone()));
                    rows.push(row);
                }
            }
        }

        Ok(Table { columns, rows })
    }

    /// Read a delimited table with a header row; empty cells become `None`
    pub fn read_delimited<R: Read>(reader: R, separator: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let mut table = Table::new(reader.headers()?.iter());
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect();
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn read_delimited_file(path: &Path, separator: u8) -> Result<Table> {
        let file = std::fs::File::open(path)
            .map_err(|e| with_context!(e, "Failed to open input file {}", path.display()))?;
        Self::read_delimited(file, separator)
    }

    /// Write the header and rows; `None` cells are written empty
    pub fn write_delimited<W: Write>(&self, writer: W, separator: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().delimiter(separator).from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Fetch statistics for every case, in order.
///
/// Cases without a target come first as rows holding only
/// `selection_case` and `timestamp`. Errors name the failing case.
#[instrument(skip(api, cases), fields(cases = cases.len()))]
pub async fn collect_page_stats(
    api: &dyn WikiApi,
    cases: &[Case],
    progress: bool,
    today: NaiveDate,
) -> Result<Table> {
    let mut columns = vec![COL_SELECTION_CASE, COL_TIMESTAMP];
    columns.extend(PageStats::COLUMNS);
    let mut table = Table::new(columns);
    let stat_cells = PageStats::COLUMNS.len();

    for case in cases.iter().filter(|case| case.target.is_none()) {
        let mut row = vec![Some(case.label.clone()), Some(format_timestamp_utc(&Utc::now()))];
        row.extend(std::iter::repeat(None).take(stat_cells));
        table.push_row(row)?;
    }

    let targeted: Vec<&Case> = cases.iter().filter(|case| case.target.is_some()).collect();
    let bar = progress_bar(targeted.len(), progress);
    for case in targeted {
        let Some(target) = &case.target else { continue };
        bar.set_message(case.label.clone());

        let stats = fetch_page_stats(api, &target.project, &target.title, today)
            .await
            .map_err(|e| with_context!(e, "Failed to fetch statistics for '{}'", case.label))?;

        let mut row = vec![Some(case.label.clone()), Some(format_timestamp_utc(&Utc::now()))];
        row.extend(stats.cells());
        table.push_row(row)?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!("Collected statistics for {} cases", table.len());
    Ok(table)
}

/// Label of a case: `QID/title` when a Wikidata id resolved to a title
fn case_label(case: Option<&str>, title: Option<&str>) -> Option<String> {
    match (case, title) {
        (Some(case), Some(title)) if is_qid(case) => Some(format!("{case}/{title}")),
        (case, _) => case.map(str::to_string),
    }
}

/// Add the meta columns, join the input table of the `file` method and put
/// the columns in their final order
pub fn build_stats_table(stats: Table, selection: &Selection) -> Result<Table> {
    let mut table = stats;

    let labels: Vec<Option<String>> = (0..table.len())
        .map(|row| case_label(table.get(row, COL_SELECTION_CASE), table.get(row, "title")))
        .collect();
    table.fill_column(COL_SELECTION_METHOD, selection.method.as_str())?;
    table.fill_column(COL_SELECTION, &selection.selection)?;
    table.set_column(COL_LABEL, labels)?;

    if let Some(input) = &selection.input {
        let column = &selection.input_column;
        debug!(column = %column, rows = input.len(), "Joining input table");
        let mut joined = input.left_join(&table, column, COL_SELECTION_CASE)?;
        let cases = joined
            .column(column)
            .map(|cells| cells.into_iter().map(|c| c.map(str::to_string)).collect())
            .unwrap_or_default();
        joined.set_column(COL_SELECTION_CASE, cases)?;
        table = joined;
    }

    let mut order: Vec<&str> = table
        .columns
        .iter()
        .map(String::as_str)
        .filter(|column| !META_COLUMNS.contains(column))
        .collect();
    order.extend(META_COLUMNS);
    Ok(table.select(&order))
}
