//! Report display and formatting

use gbn_sim::{EntityReport, SimReport};
use std::time::Duration;

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format simulated duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis >= 60_000 {
        format!("{}m {:02}s", millis / 60_000, (millis % 60_000) / 1000)
    } else if millis >= 1000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", millis)
    }
}

/// Share of `part` in `whole` as a percentage
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Display the full report as tables
pub fn display_report(report: &SimReport) {
    println!("\n┌─────────────────────────────────────────────────────────────┐");
    println!("│ SIMULATION                                                  │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!(
        "│ Finished at: {:<47}│",
        format_duration(report.finished_at.as_duration())
    );
    println!("│ Events:      {:<47}│", report.events);
    println!(
        "│ Outcome:     {:<47}│",
        if report.is_complete() {
            "complete"
        } else if report.timed_out {
            "incomplete (time limit reached)"
        } else {
            "incomplete"
        }
    );
    println!("└─────────────────────────────────────────────────────────────┘");

    println!("\n┌────────┬──────────┬──────────┬──────────┬──────────┬──────────┐");
    println!("│ Entity │ Sent     │ Deliv.   │ Retrans. │ Timeouts │ Rejected │");
    println!("├────────┼──────────┼──────────┼──────────┼──────────┼──────────┤");
    for entity in &report.entities {
        display_entity_row(entity);
    }
    println!("└────────┴──────────┴──────────┴──────────┴──────────┴──────────┘");

    println!("\n┌────────┬──────────┬──────────┬──────────┬──────────┐");
    println!("│ Link   │ Frames   │ Dropped  │ Flipped  │ Loss %   │");
    println!("├────────┼──────────┼──────────┼──────────┼──────────┤");
    for entity in &report.entities {
        let link = &entity.link;
        println!(
            "│ {:>2}->{:<2} │ {:8} │ {:8} │ {:8} │ {:7.1}% │",
            entity.entity.to_string(),
            entity.entity.peer().to_string(),
            link.frames_sent,
            link.frames_dropped,
            link.frames_corrupted,
            percent(link.frames_dropped, link.frames_sent)
        );
    }
    println!("└────────┴──────────┴──────────┴──────────┴──────────┘");
}

/// Display one entity's counters as a table row
fn display_entity_row(report: &EntityReport) {
    let stats = &report.stats;
    println!(
        "│ {:6} │ {:8} │ {:8} │ {:8} │ {:8} │ {:8} │",
        report.entity.to_string(),
        report.sent.len(),
        stats.payloads_delivered,
        stats.retransmissions,
        stats.timeouts,
        stats.frames_rejected()
    );
}

/// One-line summary of a run
pub fn display_summary(report: &SimReport) -> String {
    let delivered: u64 = report
        .entities
        .iter()
        .map(|e| e.stats.bytes_delivered)
        .sum();
    let retransmissions: u64 = report
        .entities
        .iter()
        .map(|e| e.stats.retransmissions)
        .sum();

    format!(
        "[{}] {} | delivered {} | {} retransmissions | {} events",
        format_duration(report.finished_at.as_duration()),
        if report.is_complete() { "complete" } else { "INCOMPLETE" },
        format_bytes(delivered),
        retransmissions,
        report.events
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbn_sim::{SimConfig, Simulation};

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.00 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[test]
    fn test_summary_reports_outcome() {
        let mut config = SimConfig::default();
        config.workload.messages = 3;
        let report = Simulation::new(config).unwrap().run();

        let summary = display_summary(&report);
        assert!(summary.contains("complete"));
        assert!(!summary.contains("INCOMPLETE"));
    }
}
