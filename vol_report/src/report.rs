/// report.rs — Console report
///
/// Renders an `AnalysisReport` plus the artefact paths of the run as the
/// sectioned text block printed to stdout at the end of `vol_report`.
use std::fmt;
use std::path::PathBuf;

use garch_engine::AnalysisReport;

/// Rows of the forecast table shown on the console.
const FORECAST_HEAD: usize = 10;

/// Where this run's files ended up. `None` marks an artefact that failed.
#[derive(Debug, Clone, Default)]
pub struct Artefacts {
    pub csv:    Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}

pub struct ConsoleReport<'a> {
    pub report:    &'a AnalysisReport,
    pub artefacts: &'a Artefacts,
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "╔══════════════════════════════════════════════════╗")?;
    writeln!(f, "║  {:<48}║", title)?;
    writeln!(f, "╚══════════════════════════════════════════════════╝")
}

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;

        banner(f, &format!("{} VOLATILITY ANALYSIS — GARCH(1,1)", r.ticker))?;
        writeln!(f, "Data loaded: {} daily observations", r.returns.len())?;
        if let (Some(first), Some(last)) = (r.returns.dates.first(), r.returns.last_date()) {
            writeln!(f, "Date range : {first} → {last}")?;
        }

        banner(f, "LOG RETURNS (%) — SUMMARY")?;
        writeln!(f, "{}", r.describe)?;
        match &self.artefacts.csv {
            Some(p) => writeln!(f, "Dataset saved as: {}", p.display())?,
            None => writeln!(f, "Dataset not saved (see log)")?,
        }

        banner(f, "ARCH EFFECTS")?;
        writeln!(f, "{}", r.arch_lm)?;

        banner(f, "MODEL")?;
        writeln!(f, "{}", r.fit)?;

        banner(f, &format!("{}-DAY VOLATILITY FORECAST", r.forecast.len()))?;
        let table = r.forecast.to_string();
        for line in table.lines().take(FORECAST_HEAD + 2) {
            writeln!(f, "{line}")?;
        }
        if r.forecast.len() > FORECAST_HEAD {
            writeln!(f, "... ({} more)", r.forecast.len() - FORECAST_HEAD)?;
        }

        banner(f, "OUT-OF-SAMPLE EVALUATION")?;
        writeln!(f, "{}", r.evaluation)?;

        writeln!(f)?;
        writeln!(f, "{}", r.var)?;

        banner(f, "Project Complete!")?;
        if let Some(p) = &self.artefacts.csv {
            writeln!(f, "  • {}", p.display())?;
        }
        for p in &self.artefacts.charts {
            writeln!(f, "  • {}", p.display())?;
        }
        write!(
            f,
            "  Persistence α+β = {:.4}",
            r.fit.params.persistence()
        )
    }
}
