//! Turning a selection (category, language links or input file) into cases

use crate::table::Table;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument, warn};
use wikimetrix_api::WikiApi;
use wikimetrix_common::{
    ensure, is_qid, is_wikidata_entity_url, strip_wikidata_entity_prefix, validate_non_empty, MetrixError, Project,
    Result, SelectionMethod,
};

/// The article a case refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub project: Project,
    pub title: String,
}

/// One row of a stats run; without a target only meta columns are filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub label: String,
    pub target: Option<Target>,
}

impl Case {
    pub fn new(label: impl Into<String>, project: Project, title: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: Some(Target {
                project,
                title: title.into(),
            }),
        }
    }

    pub fn untargeted(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: None,
        }
    }
}

/// Settings that shape how cases are selected
#[derive(Debug, Clone)]
pub struct SelectionOptions {
    pub project: Project,
    /// Column of the input file holding titles or Wikidata ids
    pub input_column: String,
    pub recursive: bool,
    pub progress: bool,
}

impl SelectionOptions {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            input_column: "article".to_string(),
            recursive: false,
            progress: false,
        }
    }

    pub fn with_input_column(mut self, column: impl Into<String>) -> Self {
        self.input_column = column.into();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

/// The selected cases and, for the `file` method, the input table
#[derive(Debug, Clone)]
pub struct Selection {
    pub method: SelectionMethod,
    pub selection: String,
    pub input_column: String,
    pub cases: Vec<Case>,
    pub input: Option<Table>,
}

/// Build the cases of a run, failing when there are none
#[instrument(skip(api, options), fields(project = %options.project))]
pub async fn select_cases(
    api: &dyn WikiApi,
    method: SelectionMethod,
    selection: &str,
    options: &SelectionOptions,
) -> Result<Selection> {
    let selection = validate_non_empty(selection, "selection")
        .map_err(|_| MetrixError::validation_field("selection must be a non-empty string.", "selection"))?;

    let (cases, input) = match method {
        SelectionMethod::Category => (category_cases(api, &selection, options).await?, None),
        SelectionMethod::Langlinks => (langlink_cases(api, &selection, options).await?, None),
        SelectionMethod::File => {
            let mut input = Table::read_delimited_file(Path::new(&selection), b'\t')?;
            let cases = file_cases(api, &mut input, options).await?;
            (cases, Some(input))
        }
    };

    let cases = dedup_cases(cases);
    ensure!(!cases.is_empty(), "No cases found.");
    info!("Selected {} cases by {} '{}'", cases.len(), method, selection);

    Ok(Selection {
        method,
        selection,
        input_column: options.input_column.clone(),
        cases,
        input,
    })
}

fn dedup_cases(cases: Vec<Case>) -> Vec<Case> {
    let mut seen = HashSet::new();
    cases
        .into_iter()
        .filter(|case| seen.insert(case.label.clone()))
        .collect()
}

async fn category_cases(api: &dyn WikiApi, category: &str, options: &SelectionOptions) -> Result<Vec<Case>> {
    let titles = api
        .category_members(&options.project, category, options.recursive)
        .await?;
    Ok(titles
        .into_iter()
        .map(|title| Case::new(title.clone(), options.project.clone(), title))
        .collect())
}

/// Every language edition of an article, the article itself last
async fn langlink_cases(api: &dyn WikiApi, title: &str, options: &SelectionOptions) -> Result<Vec<Case>> {
    let project = &options.project;
    let info = api.page_info(project, title).await?;
    if let Some(source) = &info.redirected_from {
        warn!("Page {} is a redirect to {}", source, info.title);
    }

    let mut cases: Vec<Case> = api
        .langlinks(project, &info.title)
        .await?
        .into_iter()
        .map(|link| {
            let label = format!("{}:{}", link.lang, link.title);
            Case::new(label, link.project(project), link.title)
        })
        .collect();
    cases.push(Case::new(
        format!("{}:{}", project.lang, info.title),
        project.clone(),
        info.title,
    ));
    Ok(cases)
}

/// Cases from the input column.
///
/// Wikidata entity URLs are reduced to their ids in `input` as well, so the
/// later join matches. Empty cells select nothing.
async fn file_cases(api: &dyn WikiApi, input: &mut Table, options: &SelectionOptions) -> Result<Vec<Case>> {
    let column = &options.input_column;
    let Some(cells) = input.column(column) else {
        return Err(MetrixError::validation_field(
            format!("Column '{column}' not found in input file"),
            "input_column",
        ));
    };
    let mut values: Vec<Option<String>> = cells.into_iter().map(|c| c.map(str::to_string)).collect();
    let present = || values.iter().flatten();

    if present().next().is_some() && present().all(|v| is_wikidata_entity_url(v)) {
        values = values
            .into_iter()
            .map(|v| v.map(|v| strip_wikidata_entity_prefix(&v)))
            .collect();
        input.set_column(column, values.clone())?;
    }

    let present: Vec<String> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return Ok(Vec::new());
    }

    if !present.iter().all(|v| is_qid(v)) {
        return Ok(present
            .into_iter()
            .map(|title| Case::new(title.clone(), options.project.clone(), title))
            .collect());
    }

    let site_id = options.project.wikidata_site_id();
    let bar = if options.progress {
        ProgressBar::new(present.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let mut cases = Vec::with_capacity(present.len());
    let mut unresolved = Vec::new();
    for qid in present {
        match api.sitelink_title(&qid, &site_id).await? {
            Some(title) => cases.push(Case::new(qid, options.project.clone(), title)),
            None => {
                unresolved.push(qid.clone());
                cases.push(Case::untargeted(qid));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if !unresolved.is_empty() {
        warn!("No sitelink on {} for {}", options.project, unresolved.join(", "));
    }
    Ok(cases)
}
