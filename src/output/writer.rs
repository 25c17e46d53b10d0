//! Executes delivery plans. The only place that writes output files.

use super::clipboard::copy_to_clipboard;
use super::types::*;
use crate::error::AppError;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Runs every target of `plan`; one failing target does not stop the rest.
pub fn deliver(plan: OutputPlan) -> OutputReport {
    let mut report = OutputReport::new();
    let start = Instant::now();

    log::debug!("Delivering to {} target(s)", plan.targets.len());

    for target in plan.targets {
        match execute_target(&target) {
            Ok(bytes_written) => {
                report = report.with_completed(CompletedDelivery {
                    target,
                    bytes_written,
                });
            }
            Err(e) => {
                log::error!("Delivery to {} failed: {}", target, e);
                report = report.with_failed(FailedDelivery {
                    target,
                    error: e.to_string(),
                });
            }
        }
    }

    report.total_duration_ms = start.elapsed().as_millis() as u64;
    log::info!(
        "Delivery complete: {} succeeded, {} failed in {}ms",
        report.completed.len(),
        report.failed.len(),
        report.total_duration_ms
    );
    report
}

/// Like [`deliver`], but any failed target becomes an error.
pub fn deliver_all(plan: OutputPlan) -> Result<OutputReport, AppError> {
    let report = deliver(plan);
    if report.is_success() {
        Ok(report)
    } else {
        Err(AppError::DeliveryFailed {
            failures: report.failure_messages(),
        })
    }
}

fn execute_target(target: &DeliveryTarget) -> Result<usize, AppError> {
    match target {
        DeliveryTarget::WriteFile { path, content } => write_file(path, content),
        DeliveryTarget::CopyToClipboard { content } => {
            copy_to_clipboard(content)?;
            Ok(content.len())
        }
        DeliveryTarget::PrintToStdout { content } => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
            Ok(content.len())
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<usize, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    log::info!("Wrote {}", path.display());
    Ok(content.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_files_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mcp-settings.json");
        let plan = OutputPlan::new().with_target(DeliveryTarget::WriteFile {
            path: path.clone(),
            content: "{}".to_string(),
        });

        let report = deliver_all(plan).unwrap();
        assert_eq!(report.bytes_written, 2);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }

    #[test]
    fn failures_are_collected_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let good = dir.path().join("ok.json");

        let plan = OutputPlan::new()
            .with_target(DeliveryTarget::WriteFile {
                path: blocker.join("child.json"),
                content: "{}".to_string(),
            })
            .with_target(DeliveryTarget::WriteFile {
                path: good.clone(),
                content: "{}".to_string(),
            });

        let report = deliver(plan);
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(good.exists());
        assert!(report.failure_messages()[0].starts_with("file "));
    }
}
