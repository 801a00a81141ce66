use anyhow::{Context, Result};
use clap::Args;
use secfeat_core::report::{results_file_name, save_results};
use secfeat_core::{
    annotate_repository, load_feature_model, load_feed, load_keywords, source, RunSummary,
    ScanConfig, ScanSession,
};
use std::path::PathBuf;

use crate::repo;
use crate::settings::Settings;

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Local directory or git URL
    pub target: String,

    /// Taxonomy feature-model file
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Keyword file (JSON/YAML) or directory of keyword files
    #[arg(long)]
    pub keywords: Option<PathBuf>,

    /// API-call feed exported by the static locator
    #[arg(long)]
    pub features: Option<PathBuf>,

    /// Where remote repositories are cloned
    #[arg(long)]
    pub repos_dir: Option<PathBuf>,

    /// Where the results JSON is written
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File extension to scan (repeatable)
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Honour .gitignore and hidden-file rules while walking
    #[arg(long)]
    pub respect_gitignore: bool,

    /// Number of keywords listed in the summary
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Scan configuration file (JSON/YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Continue an existing feature model instead of starting from the taxonomy root
    #[arg(long)]
    pub extend_model: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long)]
    pub summary_json: bool,
}

fn scan_config(args: &AnnotateArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)
            .with_context(|| format!("Failed to load scan config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }
    if args.respect_gitignore {
        config.respect_gitignore = true;
    }
    Ok(config)
}

pub fn run(args: AnnotateArgs) -> Result<()> {
    let settings = Settings::new(
        args.taxonomy.clone(),
        args.keywords.clone(),
        args.features.clone(),
        args.repos_dir.clone(),
    );
    let config = scan_config(&args)?;

    let taxonomy_tree = load_feature_model(&settings.taxonomy)
        .with_context(|| format!("Failed to load taxonomy {}", settings.taxonomy.display()))?;
    let taxonomy = load_keywords(&settings.keywords)
        .with_context(|| format!("Failed to load keywords {}", settings.keywords.display()))?;
    tracing::info!(
        "Loaded {} keywords, taxonomy root '{}'",
        taxonomy.len(),
        taxonomy_tree.root_name()
    );

    let repository = repo::acquire(&args.target, &settings.repos_dir)?;

    let mut session = match &args.extend_model {
        Some(path) => {
            let model = load_feature_model(path)
                .with_context(|| format!("Failed to load feature model {}", path.display()))?;
            ScanSession::with_feature_model(taxonomy_tree, taxonomy, config, model)?
        }
        None => ScanSession::new(taxonomy_tree, taxonomy, config)?,
    };

    let feed = load_feed(&settings.features)
        .with_context(|| format!("Failed to load API-call feed {}", settings.features.display()))?;
    let outcome = annotate_repository(&mut session, &repository.dir, Some(&feed))
        .with_context(|| format!("Failed to annotate {}", repository.dir.display()))?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;
    save_results(
        args.output_dir.join(results_file_name(&repository.name)),
        &outcome.reports,
    )?;

    let summary = RunSummary::new(&session, &outcome, args.top);
    if args.summary_json {
        let path = args.output_dir.join(format!("{}_Summary.json", repository.name));
        source::write_text(&path, &serde_json::to_string_pretty(&summary)?)?;
        tracing::info!("Summary saved to {}", path.display());
    }

    for failed in &outcome.failed_files {
        tracing::warn!("Skipped {}: {}", failed.path.display(), failed.error);
    }
    print!("{}", summary);
    Ok(())
}
