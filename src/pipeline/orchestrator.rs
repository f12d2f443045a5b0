// Multi-job execution.

use crate::pipeline::job_runner::{run_job, JobConfig, JobResult};

/// Run multiple jobs against one shared page source, collecting results.
/// One job failure does NOT prevent other jobs from running.
pub fn run_all_jobs_with(
    source: &dyn crate::page::PageSource,
    jobs: &[JobConfig],
) -> Vec<crate::error::Result<JobResult>> {
    jobs.iter().map(|job| run_job(source, job)).collect()
}

/// Run each job against its own PDF via the pdfium backend.
#[cfg(feature = "render")]
pub fn run_all_jobs(jobs: &[JobConfig]) -> Vec<crate::error::Result<JobResult>> {
    jobs.iter()
        .map(|job| {
            let source = crate::page::pdfium::PdfiumSource::open(&job.input_path)?;
            run_job(&source, job)
        })
        .collect()
}
