mod config;
mod error;
mod fonts;
mod model;
mod pdf;

pub use config::ReportConfig;
pub use error::Error;
pub use model::{FormField, PLACEHOLDER, ReportRequest, TestRow};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Lay out the report and return the finished PDF bytes.
pub fn render_report(request: &ReportRequest, results_text: &str, config: &ReportConfig) -> Vec<u8> {
    pdf::render(request, results_text, config)
}

/// Render the report and save it into `out_dir` under its derived file name
/// (`<patient name>_allergy_test.pdf`). Returns the written path.
pub fn generate_report(
    request: &ReportRequest,
    results_text: &str,
    config: &ReportConfig,
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(request, results_text, config);
    let t_render = t0.elapsed();

    let path = out_dir.join(request.output_file_name());
    std::fs::write(&path, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}
