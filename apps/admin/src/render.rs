//! Plain-text rendering of the dashboard for the terminal.

use std::fmt::Write as _;

use client_core::{
    controller::results::participation_label, ActivePanel, DashboardStats, ElectorsController,
    PanelStatus, ResultsController, VotesController,
};
use shared::domain::{Elector, Statistics, Vote};

const BAR_WIDTH: f64 = 30.0;

pub fn stats_header(stats: DashboardStats) -> String {
    format!(
        "Electors: {}  |  Votes: {}  |  Results: {}",
        stats.electors, stats.votes, stats.results
    )
}

fn banner(status: &PanelStatus) -> Option<String> {
    match status {
        PanelStatus::Idle => Some("(not loaded)".to_string()),
        PanelStatus::Loading => Some("Loading...".to_string()),
        PanelStatus::Error(message) => Some(format!("error: {message}")),
        PanelStatus::Ready => None,
    }
}

pub fn panel(panel: &ActivePanel) -> String {
    match panel {
        ActivePanel::Electors(panel) => electors_panel(panel),
        ActivePanel::Votes(panel) => votes_panel(panel),
        ActivePanel::Results(panel) => results_panel(panel),
    }
}

pub fn elector_line(elector: &Elector) -> String {
    let born = elector
        .date_of_birth
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let voted = if elector.has_voted {
        "voted"
    } else {
        "pending"
    };
    format!(
        "#{:<5} {:<30} born {}  id {:<20} {}",
        elector.id,
        elector.display_name(),
        born,
        elector.secure_identifier,
        voted
    )
}

pub fn electors_panel(panel: &ElectorsController) -> String {
    let mut out = String::from("== Electors ==\n");
    if let Some(banner) = banner(panel.status()) {
        let _ = writeln!(out, "{banner}");
    }
    if panel.electors().is_empty() {
        out.push_str("No electors registered.\n");
    }
    for elector in panel.electors() {
        let _ = writeln!(out, "{}", elector_line(elector));
    }
    out
}

pub fn vote_line(vote: &Vote, elector_name: &str) -> String {
    let cast_at = vote
        .cast_at
        .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{:<5} {:<19}  {:<30} -> candidate {}",
        vote.id, cast_at, elector_name, vote.candidate_id
    )
}

pub fn votes_panel(panel: &VotesController) -> String {
    let mut out = String::from("== Votes ==\n");
    if let Some(banner) = banner(panel.status()) {
        let _ = writeln!(out, "{banner}");
    }
    if panel.votes().is_empty() {
        out.push_str("No votes recorded.\n");
    }
    for vote in panel.votes() {
        let _ = writeln!(out, "{}", vote_line(vote, &panel.elector_name(vote.elector_id)));
    }
    out
}

pub fn eligible_electors(panel: &VotesController) -> String {
    let mut out = String::from("Electors who may still vote:\n");
    let mut any = false;
    for elector in panel.eligible_electors() {
        any = true;
        let _ = writeln!(out, "  {} (ID: {})", elector.display_name(), elector.id);
    }
    if !any {
        out.push_str("  none\n");
    }
    out
}

/// A missing or zero vote count falls back to the summed results; missing
/// electors read as zero.
pub fn statistics_block(statistics: Option<&Statistics>, total_votes: i64) -> String {
    let Some(statistics) = statistics else {
        return "Statistics: unavailable\n".to_string();
    };
    format!(
        "Total votes: {}  |  Registered electors: {}  |  Participation: {}\n",
        statistics
            .total_votes
            .filter(|&count| count != 0)
            .unwrap_or(total_votes),
        statistics.total_electors.unwrap_or(0),
        participation_label(statistics)
    )
}

pub fn results_panel(panel: &ResultsController) -> String {
    let mut out = String::from("== Results ==\n");
    if let Some(banner) = banner(panel.status()) {
        let _ = writeln!(out, "{banner}");
    }
    out.push_str(&statistics_block(panel.statistics(), panel.total_votes()));

    let rows = panel.rows();
    if rows.is_empty() {
        out.push_str("No results available.\n");
    }
    for row in rows {
        let label = row
            .candidate_name
            .clone()
            .unwrap_or_else(|| format!("Candidate {}", row.candidate_id));
        let bar = "#".repeat((row.bar_scale * BAR_WIDTH).round() as usize);
        let _ = writeln!(
            out,
            "{:<20} {:>6} votes {:>6}%  {}",
            label,
            row.votes,
            row.percentage_label(),
            bar
        );
    }
    let _ = writeln!(out, "Total: {} votes", panel.total_votes());
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
