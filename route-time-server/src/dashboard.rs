//! Static dashboard data file.
//!
//! `analyze` writes a small JavaScript file that the dashboard page loads
//! with a `<script>` tag, defining `window.routeTitle` and
//! `window.chartData`.

use std::path::Path;

use askama::Template;
use thiserror::Error;
use tracing::info;

use crate::estimate::EstimationMatrix;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to encode dashboard data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render dashboard data: {0}")]
    Template(#[from] askama::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Both fields are already JSON literals.
#[derive(Template)]
#[template(path = "dashboard_data.js", escape = "none")]
struct DashboardDataTemplate<'a> {
    title: &'a str,
    chart: &'a str,
}

/// Render the dashboard data script for `title` and `matrix`.
pub fn render_dashboard_data(
    title: &str,
    matrix: &EstimationMatrix,
) -> Result<String, DashboardError> {
    let title = serde_json::to_string(title)?;
    let chart = serde_json::to_string(matrix)?;
    let mut script = DashboardDataTemplate {
        title: &title,
        chart: &chart,
    }
    .render()?;
    if !script.ends_with('\n') {
        script.push('\n');
    }
    Ok(script)
}

/// Render and write the dashboard data script to `path`.
pub fn write_dashboard_data(
    path: &Path,
    title: &str,
    matrix: &EstimationMatrix,
) -> Result<(), DashboardError> {
    let script = render_dashboard_data(title, matrix)?;
    std::fs::write(path, script).map_err(|source| DashboardError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), title, "wrote dashboard data");
    Ok(())
}
