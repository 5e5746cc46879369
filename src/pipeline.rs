use crate::config::ExtractConfig;
use crate::constants::{FINDINGS_DATASET, NORMALISATION_DATASET, STUDY_DATASET};
use crate::error::{ExtractError, Result};
use crate::lookup::NormalizationTable;
use crate::normalize::{normalize_findings, normalize_studies};
use crate::ontology::build_domain_closure;
use crate::output::{DatasetWriter, Manifest};
use crate::source::RecordSource;
use tracing::{info, info_span, Instrument};

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub studies: usize,
    pub findings: usize,
    /// (dataset, rows) per configured closure
    pub closures: Vec<(String, usize)>,
    pub normalisation_entries: usize,
    pub manifest: Manifest,
}

/// Runs every extraction stage in order against `source` and writes the
/// datasets into the configured output directory.
///
/// Stages run one after the other; the first failure aborts the run.
pub async fn run<S: RecordSource + ?Sized>(
    source: &mut S,
    config: &ExtractConfig,
) -> Result<PipelineResult> {
    let mut writer = DatasetWriter::create(&config.output.dir)?;
    info!(output_dir = %writer.root().display(), "Starting extraction");

    let studies = async {
        let raw = source.fetch_studies().await?;
        let studies = normalize_studies(raw, &config.studies.transforms);
        writer.write(STUDY_DATASET, &config.studies.file, studies.len(), &studies)?;
        Ok::<_, ExtractError>(studies.len())
    }
    .instrument(info_span!("studies"))
    .await?;

    let findings = async {
        let raw = source.fetch_findings(&config.findings.sources).await?;
        let findings = normalize_findings(raw, &config.findings.transforms);
        writer.write(FINDINGS_DATASET, &config.findings.file, findings.len(), &findings)?;
        Ok::<_, ExtractError>(findings.len())
    }
    .instrument(info_span!("findings"))
    .await?;

    let closures = async {
        let terms = source.fetch_ontology_terms(&config.ontology_domains()).await?;
        let edges = source.fetch_ontology_edges().await?;
        info!(terms = terms.len(), edges = edges.len(), "Loaded ontology graph");

        let mut counts = Vec::with_capacity(config.closures.len());
        for spec in &config.closures {
            let rows = build_domain_closure(&terms, &edges, spec);
            info!(
                dataset = %spec.dataset,
                domain = %spec.domain,
                include_self = spec.include_self,
                rows = rows.len(),
                "Built ontology closure"
            );
            writer.write(&spec.dataset, &spec.file, rows.len(), &rows)?;
            counts.push((spec.dataset.clone(), rows.len()));
        }
        Ok::<_, ExtractError>(counts)
    }
    .instrument(info_span!("ontology"))
    .await?;

    let normalisation_entries = async {
        let pairs = source
            .fetch_synonyms(&config.normalisation.synonym_domains)
            .await?;
        let table = NormalizationTable::build(&pairs);
        info!(pairs = pairs.len(), entries = table.len(), "Built normalisation table");
        writer.write(
            NORMALISATION_DATASET,
            &config.normalisation.file,
            table.len(),
            &table,
        )?;
        Ok::<_, ExtractError>(table.len())
    }
    .instrument(info_span!("normalisation"))
    .await?;

    let manifest = writer.finish()?;
    info!(
        studies,
        findings,
        normalisation_entries,
        "Extraction finished"
    );

    Ok(PipelineResult {
        studies,
        findings,
        closures,
        normalisation_entries,
        manifest,
    })
}
