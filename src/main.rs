use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[cfg(feature = "render")]
fn main() -> ExitCode {
    use component_extract::config::job::JobFile;
    use component_extract::config::{self, detector::DetectorConfig};
    use component_extract::pipeline::job_runner::JobConfig;
    use component_extract::pipeline::orchestrator::run_all_jobs;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: component_extract <jobs.yaml>...");
        eprintln!("  Extract component images from PDFs according to job specifications.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("component_extract {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    // Collect job configs from all job files.
    let mut job_configs: Vec<JobConfig> = Vec::new();

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Read and parse the job YAML file.
        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file: JobFile = match serde_yml::from_str(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        for job in &job_file.jobs {
            job_configs.push(JobConfig {
                input_path: resolve_path(&job_dir, &job.input),
                output_dir: resolve_path(&job_dir, &job.output_dir),
                pages: job.pages.clone(),
                dpi: job.dpi.unwrap_or(settings.dpi),
                overwrite: job.overwrite.unwrap_or(settings.overwrite),
                attempt_log_name: settings.attempt_log_name.clone(),
                unhealthy_failure_ratio: settings.unhealthy_failure_ratio,
                detector: DetectorConfig::default(),
            });
        }
    }

    // Run all jobs through the pipeline.
    let results = run_all_jobs(&job_configs);

    let mut has_error = false;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(job_result) => {
                eprintln!(
                    "OK: {} -> {} ({} pages, {} saved, {} failed, {} rejected{})",
                    job_result.input_path.display(),
                    job_result.output_dir.display(),
                    job_result.pages_processed,
                    job_result.health.saved(),
                    job_result.health.failed(),
                    job_result.regions_rejected,
                    if job_result.healthy { "" } else { ", UNHEALTHY" }
                );
            }
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job_configs[i].input_path.display(),
                    job_configs[i].output_dir.display()
                );
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(not(feature = "render"))]
fn main() -> ExitCode {
    eprintln!("component_extract was built without the `render` feature; no rasterizer backend available.");
    ExitCode::FAILURE
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
#[cfg_attr(not(feature = "render"), allow(dead_code))]
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
