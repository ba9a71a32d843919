use crate::{
    admission::AdmissionPlan,
    batch::{BatchJob, BatchOrchestrator},
    config::Config,
    intake,
    model::Credential,
    normalize::ResponseNormalizer,
    progress::LogProgress,
    report::RankedReport,
    service::GeminiService,
    util::{ensure_dir, job_id, now_rfc3339},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cv-screen")]
#[command(about = "Screen a batch of resumes against one job description")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./cv-screen.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show effective service settings and whether a credential is set.
    Doctor {},
    /// List which documents would be admitted, without calling the service.
    Plan {
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// Analyze every admitted document and write the ranked report.
    Run {
        /// Job description file, or `-` for stdin.
        #[arg(long)]
        job_description: PathBuf,
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Confirms the documents may be sent to the external service. Required every run.
        #[arg(long)]
        accept_data_processing: bool,
    },
    /// Normalize a saved raw service response into a candidate record.
    Normalize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        source_name: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, None)?;
            doctor(&cfg)
        }
        Command::Plan { input } => {
            let _guard = init_logging(&args, &cfg, None)?;
            plan(&cfg, input)
        }
        Command::Normalize {
            input,
            source_name,
            model,
        } => {
            let _guard = init_logging(&args, &cfg, None)?;
            normalize(&cfg, input, source_name.as_deref(), model.as_deref())
        }
        Command::Run {
            job_description,
            input,
            model,
            out_dir,
            accept_data_processing,
        } => {
            let opts = RunOptions {
                job_description,
                inputs: input,
                model: model.as_deref(),
                out_dir: out_dir.as_deref(),
                consent: *accept_data_processing,
            };
            run(&args, &cfg, opts).await
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    ["cv-screen.toml", "cv-screen.example.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn doctor(cfg: &Config) -> Result<()> {
    let credential = Credential::from_env(&cfg.service.credential_env);
    let diag = serde_json::json!({
        "model": cfg.service.model,
        "model_known": cfg.service.known_models.contains(&cfg.service.model),
        "known_models": cfg.service.known_models,
        "api_base": cfg.service.api_base,
        "credential_env": cfg.service.credential_env,
        "credential_set": !credential.is_empty(),
        "max_documents": cfg.batch.max_documents,
        "chunk_size": cfg.batch.chunk_size,
        "retry_delay_ms": cfg.service.retry_delay_ms,
    });
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn plan(cfg: &Config, inputs: &[PathBuf]) -> Result<()> {
    let intake = intake::collect_documents(cfg, inputs)?;
    let plan = AdmissionPlan::from_config(cfg, intake.documents.len());
    let names = intake.names();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "plan": plan,
            "admitted_files": &names[..plan.admitted],
            "dropped_files": &names[plan.admitted..],
            "skipped": intake.skipped,
        }))?
    );
    Ok(())
}

fn normalize(cfg: &Config, input: &Path, source_name: Option<&str>, model: Option<&str>) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading raw response: {}", input.display()))?;
    let name = source_name
        .map(String::from)
        .unwrap_or_else(|| input.display().to_string());
    let model = model.unwrap_or(cfg.service.model.as_str());

    let normalizer = ResponseNormalizer::new(cfg)?;
    let record = normalizer.normalize(Ok(raw), &name, model)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

struct RunOptions<'a> {
    job_description: &'a Path,
    inputs: &'a [PathBuf],
    model: Option<&'a str>,
    out_dir: Option<&'a Path>,
    consent: bool,
}

async fn run(args: &Args, cfg: &Config, opts: RunOptions<'_>) -> Result<()> {
    let job = BatchJob {
        job_description: intake::load_job_description(opts.job_description)?,
        model: opts.model.unwrap_or(cfg.service.model.as_str()).to_string(),
        credential: Credential::from_env(&cfg.service.credential_env),
        consent: opts.consent,
    };
    job.check()?;

    let intake = intake::collect_documents(cfg, opts.inputs)?;
    let admitted = AdmissionPlan::from_config(cfg, intake.documents.len()).admitted;
    let job_id = job_id(
        cfg,
        &job.model,
        &job.job_description,
        &intake.documents[..admitted],
    );

    let out_root = opts
        .out_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let job_dir = out_root.join(&job_id);

    if job_dir.exists() && !cfg.global.overwrite {
        return Err(anyhow!(
            "job_dir already exists and overwrite=false: {}",
            job_dir.display()
        ));
    }
    ensure_dir(&job_dir)?;
    ensure_dir(&job_dir.join("logs"))?;

    let log_path = resolve_log_path(cfg, &job_dir);
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!("job_id={job_id} out={}", job_dir.display());
    if !intake.skipped.is_empty() {
        info!("{} inputs skipped at intake", intake.skipped.len());
    }

    if cfg.debug.dump_effective_config {
        let raw = toml::to_string(cfg).unwrap_or_default();
        std::fs::write(job_dir.join("effective-config.toml"), raw)?;
    }

    let service = GeminiService::new(cfg)?;
    let orchestrator = BatchOrchestrator::new(cfg, service)?;

    let started = now_rfc3339();
    let output = orchestrator
        .run(&job, &intake.documents, &LogProgress)
        .await?;
    let finished = now_rfc3339();

    let report = RankedReport::build(&job_id, &job.model, &finished, &output.plan, &output.results);

    if cfg.output.write_report_json {
        std::fs::write(
            job_dir.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&report)?,
        )?;
    }

    if cfg.output.write_markdown {
        std::fs::write(
            job_dir.join(&cfg.output.markdown_filename),
            report.to_markdown(),
        )?;
    }

    if cfg.output.write_index_json {
        let index = serde_json::json!({
            "job_id": job_id,
            "started": started,
            "finished": finished,
            "model": job.model,
            "files": output.results.iter().map(|r| &r.file_name).collect::<Vec<_>>(),
            "skipped": intake.skipped,
            "report": cfg.output.report_filename,
            "markdown": cfg.output.markdown_filename,
        });
        std::fs::write(job_dir.join("index.json"), serde_json::to_string_pretty(&index)?)?;
    }

    if cfg.global.print_summary {
        let top = report.candidates.first().map(|c| {
            serde_json::json!({
                "candidate_name": c.analysis.candidate_name,
                "match_score": c.analysis.match_score,
                "file_name": c.analysis.file_name,
            })
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_id": job_id,
                "job_dir": job_dir,
                "status": "ok",
                "summary": report.summary,
                "top_candidate": top,
            }))?
        );
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, job_dir: &Path) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(job_dir.join("logs").join("cv-screen.log"))
}
