// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records the per-epoch loss to a CSV file next to the model.
//
// Output file: <output_dir>/metrics.csv
//
//   epoch,final_loss,mean_loss,steps
//   1,4.812300,5.102214,1204
//   2,4.101877,4.377410,1204
//
// An epoch without any batch leaves the loss columns empty.
// The monitor sample is printed but not written to the CSV.

use anyhow::Result;
use std::{
    fmt,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// What one epoch produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Loss of the last batch of the epoch
    pub final_loss: Option<f64>,

    pub mean_loss: Option<f64>,

    /// Optimizer steps taken (one per batch)
    pub steps: usize,

    /// Greedy continuation of the monitor seed
    pub sample: String,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        final_loss: Option<f64>,
        mean_loss:  Option<f64>,
        steps:      usize,
        sample:     String,
    ) -> Self {
        Self { epoch, final_loss, mean_loss, steps, sample }
    }
}

fn fmt_loss(loss: Option<f64>) -> String {
    loss.map(|l| format!("{l:.4}")).unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for EpochMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Epoch {:>3} | loss={} | mean_loss={} | steps={} | sample: {}",
            self.epoch,
            fmt_loss(self.final_loss),
            fmt_loss(self.mean_loss),
            self.steps,
            self.sample,
        )
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Starts a fresh CSV with a header row, replacing any earlier run.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "epoch,final_loss,mean_loss,steps")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        let cell = |v: Option<f64>| v.map(|l| format!("{l:.6}")).unwrap_or_default();
        writeln!(
            f,
            "{},{},{},{}",
            m.epoch,
            cell(m.final_loss),
            cell(m.mean_loss),
            m.steps,
        )?;

        tracing::debug!("Logged epoch {} metrics", m.epoch);
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
