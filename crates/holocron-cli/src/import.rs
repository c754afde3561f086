//! `holocron import`: read the inventory, aggregate by card key, enrich with
//! external metadata, then write the catalog.
//!
//! Every non-dry run is recorded in the import run ledger. The ledger row is
//! opened before any work and closed as `succeeded` or `failed` on every exit
//! path.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use holocron_core::{AppConfig, CollectionStatistics};
use holocron_db::{CardStore, ImportRunCounters, PgCardStore, UpsertReport};
use holocron_enrich::{CardIndex, CatalogOrigin, JoinOutcome, MetadataProvider};
use holocron_ingest::{AggregationReport, SheetSelector};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Inventory export (.xlsx, .xls, .ods or .csv); repeat to merge several
    /// exports into one import
    #[arg(long = "file", required = true)]
    pub files: Vec<PathBuf>,

    /// Worksheet to read in each workbook; defaults to "Data", else the
    /// first sheet
    #[arg(long)]
    pub sheet: Option<String>,

    /// Delete every stored card before writing
    #[arg(long)]
    pub replace: bool,

    /// Also store zero-quantity records for unowned cards in the metadata catalog
    #[arg(long, conflicts_with = "skip_enrichment")]
    pub seed_reference: bool,

    /// Continue with spreadsheet metadata when no metadata endpoint answers
    #[arg(long)]
    pub allow_unenriched: bool,

    /// Do not load external metadata at all
    #[arg(long)]
    pub skip_enrichment: bool,

    /// Run the pipeline and print the result without touching the database
    #[arg(long)]
    pub dry_run: bool,

    /// Records per upsert batch; defaults to IMPORT_BATCH_SIZE
    #[arg(long)]
    pub batch_size: Option<usize>,
}

pub(crate) fn sheet_selector(sheet: Option<&str>) -> SheetSelector {
    match sheet {
        Some(name) => SheetSelector::Named(name.to_string()),
        None => SheetSelector::default(),
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts gathered while an import runs, printed at the end of every run,
/// including runs that fail before anything is counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    /// Set once the inventory has been aggregated.
    pub aggregated: bool,
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub unique_cards: usize,
    pub metadata_matched: usize,
    pub metadata_unmatched: usize,
    pub from_sheet: usize,
    pub reference_cards: usize,
    pub untranslated_values: usize,
    pub written: bool,
    pub records_inserted: usize,
    pub records_updated: usize,
    pub records_failed: usize,
}

impl ImportSummary {
    fn record_aggregation(&mut self, report: &AggregationReport) {
        self.aggregated = true;
        self.rows_processed = report.processed_row_count;
        self.rows_skipped = report.skipped_row_count;
        self.unique_cards = report.unique_card_count;
    }

    fn record_join(&mut self, outcome: &JoinOutcome, reference_cards: usize) {
        self.metadata_matched = outcome.matched;
        self.metadata_unmatched = outcome.unmatched;
        self.from_sheet = outcome.from_sheet;
        self.reference_cards = reference_cards;
        self.untranslated_values = outcome.untranslated.len();
    }

    fn record_write(&mut self, report: &UpsertReport) {
        self.written = true;
        self.records_inserted = report.inserted;
        self.records_updated = report.updated;
        self.records_failed = report.failed.len();
    }

    pub fn counters(&self) -> ImportRunCounters {
        ImportRunCounters {
            rows_processed: to_counter(self.rows_processed),
            rows_skipped: to_counter(self.rows_skipped),
            unique_cards: to_counter(self.unique_cards),
            metadata_matched: to_counter(self.metadata_matched),
            metadata_unmatched: to_counter(self.metadata_unmatched),
            records_inserted: to_counter(self.records_inserted),
            records_updated: to_counter(self.records_updated),
            records_failed: to_counter(self.records_failed),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("import summary\n");
        if !self.aggregated {
            out.push_str("  stopped before aggregation\n");
        }
        push_count(&mut out, "rows processed", self.rows_processed);
        push_count(&mut out, "rows skipped", self.rows_skipped);
        push_count(&mut out, "unique cards", self.unique_cards);
        push_count(&mut out, "metadata matched", self.metadata_matched);
        push_count(&mut out, "metadata unmatched", self.metadata_unmatched);
        if self.from_sheet > 0 {
            push_count(&mut out, "  from spreadsheet", self.from_sheet);
        }
        if self.reference_cards > 0 {
            push_count(&mut out, "reference cards", self.reference_cards);
        }
        if self.untranslated_values > 0 {
            push_count(&mut out, "untranslated values", self.untranslated_values);
        }
        if self.written {
            push_count(&mut out, "records inserted", self.records_inserted);
            push_count(&mut out, "records updated", self.records_updated);
            push_count(&mut out, "records failed", self.records_failed);
        } else {
            out.push_str("  nothing written\n");
        }
        out
    }
}

fn push_count(out: &mut String, label: &str, value: usize) {
    let _ = writeln!(out, "  {label:<22}{value}");
}

fn to_counter(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn print_summary(summary: &ImportSummary) {
    print!("{}", summary.render());
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Reads every inventory file, aggregates their rows together, and joins
/// the result with external metadata.
///
/// Each file is mapped against its own header row, so exports with
/// different column layouts can be combined. A card listed in several files
/// has its quantities summed.
///
/// With `provider = None` enrichment is skipped and every card keeps its
/// spreadsheet metadata, if any.
///
/// # Errors
///
/// Returns an error if the file cannot be read, required columns are
/// missing, or metadata is unavailable and `allow_unenriched` is not set.
pub(crate) async fn prepare_import(
    args: &ImportArgs,
    provider: Option<&MetadataProvider>,
    summary: &mut ImportSummary,
) -> anyhow::Result<JoinOutcome> {
    let selector = sheet_selector(args.sheet.as_deref());
    let mut rows = Vec::new();
    for path in &args.files {
        let sheet = holocron_ingest::read_inventory(path, &selector)
            .with_context(|| format!("reading {}", path.display()))?;
        tracing::info!(
            file = %path.display(),
            sheet = %sheet.sheet_name,
            rows = sheet.rows.len(),
            "inventory read"
        );
        rows.extend(sheet.rows);
    }
    let aggregation = holocron_ingest::aggregate(rows);
    summary.record_aggregation(&aggregation.report);
    tracing::info!(
        processed = aggregation.report.processed_row_count,
        invalid_keys = aggregation.report.invalid_key_count,
        zero_quantity = aggregation.report.zero_quantity_count,
        unique = aggregation.report.unique_card_count,
        "inventory aggregated"
    );

    let index = match provider {
        Some(provider) => load_index(provider, args.allow_unenriched).await?,
        None => {
            tracing::info!("metadata enrichment skipped");
            None
        }
    };

    let mut outcome = holocron_enrich::join(aggregation.into_entries(), index.as_ref());
    let mut reference_cards = 0;
    if args.seed_reference {
        match index.as_ref() {
            Some(index) => reference_cards = holocron_enrich::seed_reference(&mut outcome, index),
            None => tracing::warn!("no metadata catalog loaded; reference seeding skipped"),
        }
    }
    summary.record_join(&outcome, reference_cards);

    for value in &outcome.untranslated {
        tracing::warn!(key = %value.key, value = %value.value, "no catalog term for metadata value");
    }

    Ok(outcome)
}

async fn load_index(
    provider: &MetadataProvider,
    allow_unenriched: bool,
) -> anyhow::Result<Option<CardIndex>> {
    match provider.fetch_all().await {
        Ok(fetched) => {
            match &fetched.origin {
                CatalogOrigin::Cache => tracing::info!(cards = fetched.cards.len(), "metadata loaded from cache"),
                CatalogOrigin::Endpoint(url) => {
                    tracing::info!(cards = fetched.cards.len(), url = %url, "metadata fetched");
                }
            }
            let index = CardIndex::build(fetched.cards);
            tracing::info!(indexed = index.len(), "metadata index built");
            Ok(Some(index))
        }
        Err(e) if allow_unenriched => {
            tracing::warn!(error = %e, "card metadata unavailable; continuing without enrichment");
            Ok(None)
        }
        Err(e) => Err(anyhow::Error::new(e)
            .context("card metadata unavailable; pass --allow-unenriched to import without it")),
    }
}

/// Prepares the catalog and writes it through `store`.
pub(crate) async fn execute_import<S: CardStore>(
    store: &S,
    args: &ImportArgs,
    provider: Option<&MetadataProvider>,
    batch_size: usize,
    summary: &mut ImportSummary,
) -> anyhow::Result<()> {
    let outcome = prepare_import(args, provider, summary).await?;

    if args.replace {
        let removed = store.clear().await?;
        tracing::info!(removed, "catalog cleared before import");
    }

    let report = holocron_db::write_catalog(store, &outcome.records, batch_size).await;
    for failed in &report.failed {
        tracing::warn!(key = %failed.key, reason = %failed.reason, "card record not written");
    }
    summary.record_write(&report);
    Ok(())
}

/// Runs `holocron import`.
///
/// # Errors
///
/// Returns an error if any fatal pipeline stage fails or the run ledger
/// cannot be opened or closed. The summary is printed on every exit path,
/// with zero counts when the run stopped before reading the inventory.
pub(crate) async fn run_import(config: &AppConfig, args: &ImportArgs) -> anyhow::Result<()> {
    let mut summary = ImportSummary::default();
    let result = if args.dry_run {
        dry_run(config, args, &mut summary).await
    } else {
        recorded_run(config, args, &mut summary).await
    };
    print_summary(&summary);
    if let Some(preview) = result? {
        print!("{preview}");
    }
    Ok(())
}

fn metadata_provider(
    config: &AppConfig,
    args: &ImportArgs,
) -> anyhow::Result<Option<MetadataProvider>> {
    if args.skip_enrichment {
        return Ok(None);
    }
    Ok(Some(MetadataProvider::from_app_config(config)?))
}

/// Runs the pipeline without a database. Returns the rendered preview.
async fn dry_run(
    config: &AppConfig,
    args: &ImportArgs,
    summary: &mut ImportSummary,
) -> anyhow::Result<Option<String>> {
    let provider = metadata_provider(config, args)?;
    let outcome = prepare_import(args, provider.as_ref(), summary).await?;
    let mut preview = format!("dry-run: {} records would be written\n", outcome.records.len());
    preview.push_str(&crate::stats::render_statistics(&CollectionStatistics::from_records(
        &outcome.records,
    )));
    Ok(Some(preview))
}

/// Runs the pipeline against the database inside an import run ledger row.
async fn recorded_run(
    config: &AppConfig,
    args: &ImportArgs,
    summary: &mut ImportSummary,
) -> anyhow::Result<Option<String>> {
    let provider = metadata_provider(config, args)?;
    let batch_size = args.batch_size.unwrap_or(config.import_batch_size);
    let pool = crate::connect(config).await?;
    let source_file = source_label(&args.files);
    let run = holocron_db::create_import_run(&pool, &source_file, "cli").await?;
    if let Err(e) = holocron_db::start_import_run(&pool, run.id).await {
        fail_run_best_effort(&pool, run.id, &format!("{e:#}"), &ImportRunCounters::default())
            .await;
        return Err(e.into());
    }
    tracing::info!(run_id = %run.public_id, file = %source_file, "import run started");

    let store = PgCardStore::new(pool.clone());
    let result = execute_import(&store, args, provider.as_ref(), batch_size, summary).await;
    let counters = summary.counters();

    if let Err(e) = result {
        fail_run_best_effort(&pool, run.id, &format!("{e:#}"), &counters).await;
        return Err(e);
    }
    if let Err(e) = holocron_db::complete_import_run(&pool, run.id, &counters).await {
        fail_run_best_effort(&pool, run.id, &format!("{e:#}"), &counters).await;
        return Err(e.into());
    }

    tracing::info!(
        run_id = %run.public_id,
        inserted = summary.records_inserted,
        updated = summary.records_updated,
        failed = summary.records_failed,
        "import run succeeded"
    );
    Ok(None)
}

/// Ledger `source_file` value: every input path, comma separated.
pub(crate) fn source_label(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Marks the run failed, logging rather than returning a ledger error so the
/// original failure is the one reported.
async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    message: &str,
    counters: &ImportRunCounters,
) {
    if let Err(mark_err) = holocron_db::fail_import_run(pool, run_id, message, counters).await {
        tracing::error!(run_id, error = %mark_err, "failed to mark import run as failed");
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
