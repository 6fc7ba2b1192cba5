//! Human-readable renderers. JSON output bypasses this module.

use cyclelog_core::{
    CycleSeries, DeletionPlan, Entry, Forecast, ImportOutcome, ImportPreview, InvariantViolation,
    LedgerStatistics,
};
use std::io::{self, Write};

pub fn entries(out: &mut dyn Write, entries: &[Entry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "no entries");
    }
    for entry in entries {
        let cycle = entry
            .cycle_length
            .map_or_else(|| "-".to_string(), |days| days.to_string());
        writeln!(
            out,
            "{}  {}  cycle={:>3}  {}",
            entry.id,
            entry.date,
            cycle,
            entry.notes.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub fn added(out: &mut dyn Write, entry: &Entry) -> io::Result<()> {
    match entry.cycle_length {
        Some(days) => writeln!(out, "added {} ({}, cycle {days} days)", entry.id, entry.date),
        None => writeln!(out, "added {} ({}, first entry)", entry.id, entry.date),
    }
}

pub fn deleted(out: &mut dyn Write, plan: &DeletionPlan) -> io::Result<()> {
    writeln!(
        out,
        "deleted {} entr{} in {} batch(es)",
        plan.doomed.len(),
        if plan.doomed.len() == 1 { "y" } else { "ies" },
        plan.batches.len()
    )?;
    for update in plan.successor_updates() {
        writeln!(
            out,
            "  {} cycle {} -> {}",
            update.entry_id,
            optional_days(update.previous),
            optional_days(update.cycle_length)
        )?;
    }
    Ok(())
}

pub fn series(out: &mut dyn Write, series: &CycleSeries) -> io::Result<()> {
    if series.is_empty() {
        return writeln!(out, "no cycle lengths recorded");
    }
    for point in &series.points {
        writeln!(out, "{}  {}", point.date, point.cycle_length)?;
    }
    if let (Some(min), Some(max)) = (series.min, series.max) {
        writeln!(out, "range: {min}..{max} days")?;
    }
    Ok(())
}

pub fn forecast(out: &mut dyn Write, forecast: Option<&Forecast>) -> io::Result<()> {
    let Some(forecast) = forecast else {
        return writeln!(out, "forecast unavailable: record at least two entries");
    };
    let relative = match forecast.days_until {
        0 => "today".to_string(),
        days if days > 0 => format!("in {days} day(s)"),
        days => format!("{} day(s) overdue", days.unsigned_abs()),
    };
    writeln!(out, "next start: {} ({relative})", forecast.expected_date)?;
    writeln!(out, "robust average: {} days", forecast.robust_average)
}

pub fn statistics(out: &mut dyn Write, stats: Option<&LedgerStatistics>) -> io::Result<()> {
    let Some(stats) = stats else {
        return writeln!(out, "statistics unavailable: ledger is empty");
    };
    writeln!(out, "last entry: {}", stats.last_entry_date)?;
    writeln!(out, "day {} ({})", stats.elapsed_days, stats.phase)?;
    match stats.display_average_days() {
        Some(days) => writeln!(out, "average cycle: {days} days")?,
        None => writeln!(out, "average cycle: n/a")?,
    }
    writeln!(
        out,
        "std deviation: {}",
        stats.display_stddev().as_deref().unwrap_or("n/a")
    )
}

pub fn preview(out: &mut dyn Write, preview: &ImportPreview) -> io::Result<()> {
    for row in &preview.rows {
        writeln!(
            out,
            "{}  {}  {}",
            if row.already_present { "skip" } else { "new " },
            row.date,
            row.notes.as_deref().unwrap_or("")
        )?;
    }
    for rejected in &preview.rejected {
        writeln!(out, "line {}: {}", rejected.line, rejected.reason)?;
    }
    writeln!(
        out,
        "{} new, {} skipped, {} rejected (dry run)",
        preview.new_row_count(),
        preview.rows.len() - preview.new_row_count(),
        preview.rejected.len()
    )
}

pub fn imported(out: &mut dyn Write, outcome: &ImportOutcome) -> io::Result<()> {
    for rejected in &outcome.rejected {
        writeln!(out, "line {}: {}", rejected.line, rejected.reason)?;
    }
    writeln!(
        out,
        "{} imported, {} skipped, {} rejected",
        outcome.report.inserted.len(),
        outcome.report.skipped.len(),
        outcome.rejected.len()
    )
}

pub fn violations(out: &mut dyn Write, violations: &[InvariantViolation]) -> io::Result<()> {
    if violations.is_empty() {
        return writeln!(out, "ledger consistent");
    }
    for violation in violations {
        writeln!(out, "{violation}")?;
    }
    Ok(())
}

fn optional_days(days: Option<u32>) -> String {
    days.map_or_else(|| "none".to_string(), |days| days.to_string())
}

#[cfg(test)]
mod tests {
    use super::{forecast, statistics};
    use chrono::NaiveDate;
    use cyclelog_core::{CyclePhase, Forecast, LedgerStatistics};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn overdue_forecast_reads_naturally() {
        let value = Forecast {
            expected_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            days_until: -3,
            robust_average: 29,
        };
        let text = render(|out| forecast(out, Some(&value)));
        assert!(text.contains("2024-03-01 (3 day(s) overdue)"));
        assert!(render(|out| forecast(out, None)).contains("unavailable"));
    }

    #[test]
    fn single_entry_statistics_show_placeholders() {
        let stats = LedgerStatistics {
            last_entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            elapsed_days: 20,
            phase: CyclePhase::Luteal,
            average_cycle: None,
            stddev: None,
        };
        let text = render(|out| statistics(out, Some(&stats)));
        assert!(text.contains("day 20 (Luteal)"));
        assert!(text.contains("average cycle: n/a"));
        assert!(text.contains("std deviation: n/a"));
    }
}
