//! The business intake that every analysis run starts from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Intake is missing a company name")]
    MissingCompanyName,
}

/// Business profile collected before analysis.
///
/// Field names serialize in camelCase so intake files exported from the web
/// form load unchanged. Everything except `company_name` is optional and
/// defaults to empty; prompt builders substitute placeholders for blanks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub company_name: String,
    #[serde(default)]
    pub team_size: u32,
    #[serde(default)]
    pub revenue_range: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub bottleneck: String,
    #[serde(default)]
    pub financial_data: String,
    #[serde(default)]
    pub tool_list: String,
    #[serde(default)]
    pub processes: Vec<String>,
    #[serde(default)]
    pub follow_up: String,
    #[serde(default)]
    pub lead_sources: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub tone: String,
}

impl IntakeRecord {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.company_name.trim().is_empty() {
            return Err(IntakeError::MissingCompanyName);
        }
        Ok(())
    }

    /// Process descriptions with blank entries removed, in submitted order.
    pub fn described_processes(&self) -> impl Iterator<Item = &str> {
        self.processes
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }

    /// The demo business used by `--sample` and in tests.
    pub fn sample() -> Self {
        Self {
            company_name: "Acme Local Services".to_string(),
            team_size: 12,
            revenue_range: "$500K – $1M".to_string(),
            goals: vec![
                "Reduce wasted spend".to_string(),
                "Streamline operations".to_string(),
                "Automate follow-up".to_string(),
            ],
            bottleneck: "Too many disconnected tools".to_string(),
            financial_data: [
                "QuickBooks - $30/mo",
                "Slack - $12/user × 12 = $144/mo",
                "Monday.com - $10/user × 8 = $80/mo",
                "Asana - $11/user × 8 = $88/mo",
                "FreshBooks - $25/mo",
                "Google Workspace - $12/user × 12 = $144/mo",
                "Mailchimp - $20/mo",
                "ConvertKit - $79/mo",
                "Calendly Teams - $48/mo",
                "Microsoft 365 - $15/user × 12 = $180/mo",
                "HubSpot CRM - $150/mo",
                "Zoom Pro - $15/mo",
            ]
            .join("\n"),
            tool_list: [
                "Slack, $144/mo, Communication, Daily",
                "Monday.com, $80/mo, Project Management, Daily",
                "Asana, $88/mo, Project Management, Weekly",
                "QuickBooks, $30/mo, Accounting, Daily",
                "FreshBooks, $25/mo, Invoicing, Weekly",
                "Google Workspace, $144/mo, Cloud / Storage, Daily",
                "Microsoft 365, $180/mo, Cloud / Storage, Daily",
                "Mailchimp, $20/mo, Marketing, Rarely",
                "ConvertKit, $79/mo, Marketing, Rarely",
                "Calendly, $48/mo, Scheduling, Weekly",
                "HubSpot, $150/mo, CRM, Daily",
                "Zoom, $15/mo, Communication, Daily",
            ]
            .join("\n"),
            processes: vec![
                "New Client Onboarding: When we close a deal, the sales person sends a welcome email, then ops creates a project board. Account manager schedules a kickoff call. Finance sets up invoicing. Takes about 2 days total but steps get missed sometimes.".to_string(),
                "Lead Intake: Leads come in through the website form and referrals. Sales person logs them in HubSpot, sends acknowledgment email, then tries to qualify them on a call. Follow-up is manual and inconsistent.".to_string(),
                "Monthly Invoice Review: Finance exports outstanding invoices from QuickBooks at month end, cross-references with project completion in Monday.com, sends payment reminders for overdue ones, then updates the cash flow forecast.".to_string(),
            ],
            follow_up: "Mostly manual, the sales team tries to remember who to follow up with. Sometimes we use reminder tasks in Monday.com but it's inconsistent. Important leads definitely slip through the cracks.".to_string(),
            lead_sources: vec![
                "Website forms".to_string(),
                "Referrals".to_string(),
                "Social media".to_string(),
            ],
            channels: vec!["email".to_string(), "sms".to_string()],
            tone: "friendly".to_string(),
        }
    }
}
