//! End-to-end consolidation driven by a [`Manifest`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backfill::{SampleIndex, backfill};
use crate::codec::decode_table;
use crate::io::{read_table, write_table};
use crate::manifest::Manifest;
use crate::merge::{BomTable, fold_into_master};
use crate::schema::{BomSchema, Layout};
use crate::BomError;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub schema: BomSchema,
    /// Compute everything but write no files.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub path: PathBuf,
    pub layout: Layout,
    pub rows: usize,
    pub entries: usize,
    pub backfilled: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub projects: Vec<ProjectSummary>,
    pub sample_entries: usize,
    pub output: PathBuf,
    #[serde(skip)]
    pub master: BomTable,
}

impl RunSummary {
    pub fn total_quantity(&self) -> u128 {
        self.master.total_quantity()
    }
}

struct ProjectBom {
    summary: ProjectSummary,
    table: BomTable,
}

fn load_sample(path: &Path, schema: &BomSchema) -> Result<SampleIndex, BomError> {
    if !path.exists() {
        log::warn!(
            "Sample BOM {} does not exist, part numbers will not be filled",
            path.display()
        );
        return Ok(SampleIndex::new());
    }

    let table = read_table(path)?;
    let (_, records) = decode_table(&table, schema).map_err(|e| e.at(path))?;
    let index = SampleIndex::from_records(records.iter().map(|(r, q)| (r, *q)), schema);
    log::debug!("Sample BOM {}: {} parts", path.display(), index.len());
    Ok(index)
}

fn load_project(
    name: &str,
    path: &Path,
    sample: &SampleIndex,
    schema: &BomSchema,
) -> Result<ProjectBom, BomError> {
    let raw = read_table(path)?;
    let (layout, records) = decode_table(&raw, schema).map_err(|e| e.at(path))?;
    let rows = records.len();

    let filled = backfill(sample, records.clone(), schema);
    let backfilled = records
        .iter()
        .zip(&filled)
        .filter(|(before, after)| before != after)
        .count();

    let table = BomTable::from_records(filled).map_err(|e| e.at(path))?;

    Ok(ProjectBom {
        summary: ProjectSummary {
            name: name.to_string(),
            path: path.to_path_buf(),
            layout,
            rows,
            entries: table.len(),
            backfilled,
        },
        table,
    })
}

/// Consolidate every project of `manifest` into a master BOM.
///
/// All inputs are decoded before anything is written, so a bad file leaves
/// every BOM on disk untouched.
pub fn run(manifest: &Manifest, options: &RunOptions) -> Result<RunSummary, BomError> {
    let schema = &options.schema;
    schema.validate()?;

    let sample = match manifest.sample_path() {
        Some(path) => load_sample(&path, schema)?,
        None => SampleIndex::new(),
    };

    let mut master = BomTable::new();
    let mut projects = Vec::with_capacity(manifest.projects.len());
    for (name, path) in manifest.project_paths() {
        let project = load_project(&name, &path, &sample, schema)?;
        fold_into_master(&mut master, &project.table, schema).map_err(|e| e.at(&path))?;

        log::info!(
            "Merged {name}: {} rows, {} parts, {} filled from sample",
            project.summary.rows,
            project.summary.entries,
            project.summary.backfilled
        );
        projects.push(project);
    }

    let output = manifest.output_path();
    if options.dry_run {
        log::info!("Dry run, not writing {}", output.display());
    } else {
        if manifest.rewrite_projects {
            for project in &projects {
                write_table(&project.summary.path, &project.table, schema)?;
            }
        }
        write_table(&output, &master, schema)?;
    }

    Ok(RunSummary {
        projects: projects.into_iter().map(|p| p.summary).collect(),
        sample_entries: sample.len(),
        output,
        master,
    })
}
