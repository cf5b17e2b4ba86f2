//! Plain-text rendering of the published session

use std::fmt::Write;

use domain_claims::session::TOTAL_STEPS;
use domain_claims::{ClaimSession, DeadlineStatus, Step, WeatherStage};

/// "Step 3 of 5: evidence upload", or the terminal state
pub fn step_line(step: Step) -> String {
    match step.position() {
        Some(position) => format!("Step {} of {}: {}", position, TOTAL_STEPS, step.name()),
        None => format!("Claim {}", step.name()),
    }
}

/// Countdown text, e.g. "14h 05m left (urgent)"
pub fn deadline_line(status: &DeadlineStatus) -> String {
    if status.expired {
        return "Filing window closed".to_string();
    }
    let (hours, minutes) = status.hours_minutes();
    let urgency = if status.urgent { " (urgent)" } else { "" };
    format!("{}h {:02}m left{}", hours, minutes, urgency)
}

/// Multi-line summary of the session
pub fn session_summary(session: &ClaimSession, deadline: Option<&DeadlineStatus>) -> String {
    let mut out = step_line(session.step());

    if let Some(weather) = session.weather() {
        let _ = write!(out, "\n  Weather at {}", weather.location);
        if let Some(description) = &weather.conditions.description {
            let _ = write!(out, ": {}", description);
        }
        if let Some(alert) = &weather.alert {
            let _ = write!(out, "\n  Alert {} ({}, {})", alert.alert_id, alert.alert_type, alert.severity);
        }
    }
    match session.step() {
        Step::WeatherCheck(WeatherStage::AlertRaised) => {
            out.push_str("\n  Was your crop damaged? ack yes|no, or form to file manually");
        }
        Step::ClaimForm => {
            let form = session.form();
            let _ = write!(
                out,
                "\n  loss_type={:?} survey={:?} area={:?} description={:?}",
                form.loss_type, form.survey_number, form.area_affected, form.description
            );
        }
        _ => {}
    }

    if let Some(identity) = session.identity() {
        let _ = write!(out, "\n  Claim {} (id {})", identity.claim_number, identity.claim_id);
    }
    if let Some(status) = deadline {
        let _ = write!(out, "\n  {}", deadline_line(status));
    }
    if !session.evidence().is_empty() {
        let pending = session.evidence().iter().filter(|item| !item.uploaded).count();
        let _ = write!(out, "\n  Photos: {} uploaded", session.uploaded_count());
        if pending > 0 {
            let _ = write!(out, ", {} not uploaded", pending);
        }
    }
    if let Some(documents) = session.documents() {
        if documents.is_complete() {
            let _ = write!(out, "\n  Documents complete ({} attached)", documents.attached_count());
        } else {
            let missing: Vec<String> = documents.missing().iter().map(|t| t.display_name()).collect();
            let _ = write!(out, "\n  Missing documents: {}", missing.join(", "));
        }
    }
    if let Some(submission) = session.submission() {
        let _ = write!(out, "\n  Assessment: {}", submission.claim_json);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_line() {
        assert_eq!(step_line(Step::EvidenceUpload), "Step 3 of 5: evidence upload");
        assert_eq!(step_line(Step::Submitted), "Claim submitted");
    }

    #[test]
    fn test_deadline_line() {
        let status = DeadlineStatus {
            remaining_hours: 14.09,
            urgent: true,
            expired: false,
        };
        assert_eq!(deadline_line(&status), "14h 05m left (urgent)");

        let closed = DeadlineStatus {
            remaining_hours: 0.0,
            urgent: true,
            expired: true,
        };
        assert_eq!(deadline_line(&closed), "Filing window closed");
    }
}
