//! Trigger CLI commands.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use std::collections::HashMap;
use uuid::Uuid;

use super::{open_service, resolve_host, resolve_trigger, CliService};
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::errors::DomainError;
use crate::domain::models::{Config, Trigger, TriggerSeverity};
use crate::domain::ports::TriggerFilter;

/// Prefix printed above every rejected dependency change.
pub const UPDATE_REJECTED: &str = "Cannot update trigger";

#[derive(Args, Debug)]
pub struct TriggerArgs {
    #[command(subcommand)]
    pub command: TriggerCommands,
}

#[derive(Subcommand, Debug)]
pub enum TriggerCommands {
    /// Create a trigger on a host or template
    Add {
        /// Owning host or template
        owner: String,
        /// Trigger name, unique per owner
        name: String,
        /// Trigger expression
        #[arg(short, long)]
        expression: Option<String>,
        /// Severity (not_classified, information, warning, average, high, disaster)
        #[arg(short, long, default_value = "not_classified")]
        severity: String,
    },
    /// List triggers
    List {
        /// Only triggers of this host or template
        #[arg(short, long)]
        owner: Option<String>,
        /// Maximum number of triggers to display
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Show a trigger with its dependencies and dependents
    Show {
        owner: String,
        name: String,
    },
    /// Make a trigger depend on another trigger
    Depend {
        /// Owner of the dependent trigger
        owner: String,
        /// Dependent trigger
        name: String,
        /// Owner of the trigger depended on
        #[arg(long = "on-owner")]
        on_owner: String,
        /// Trigger depended on
        #[arg(long = "on")]
        on: String,
    },
    /// Remove a dependency
    Undepend {
        owner: String,
        name: String,
        #[arg(long = "on-owner")]
        on_owner: String,
        #[arg(long = "on")]
        on: String,
    },
    /// Delete a trigger and every dependency touching it
    Delete {
        owner: String,
        name: String,
    },
    /// Check stored dependencies for cycles and broken template links
    Audit,
}

#[derive(Debug, serde::Serialize)]
pub struct TriggerOutput {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub expression: String,
    pub severity: String,
    pub depends_on: Vec<String>,
}

impl TriggerOutput {
    fn new(trigger: &Trigger, owners: &HashMap<Uuid, String>, names: &HashMap<Uuid, String>) -> Self {
        Self {
            id: trigger.id.to_string(),
            owner: lookup(owners, trigger.owner_id),
            name: trigger.name.clone(),
            expression: trigger.expression.clone(),
            severity: trigger.severity.as_str().to_string(),
            depends_on: trigger.depends_on.iter().map(|&id| lookup(names, id)).collect(),
        }
    }
}

fn lookup(map: &HashMap<Uuid, String>, id: Uuid) -> String {
    map.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

#[derive(Debug, serde::Serialize)]
pub struct TriggerListOutput {
    pub triggers: Vec<TriggerOutput>,
    pub total: usize,
}

impl CommandOutput for TriggerListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["owner", "name", "severity", "depends on"]);
        for t in &self.triggers {
            table.add_row(vec![
                t.owner.clone(),
                truncate(&t.name, 48),
                t.severity.clone(),
                t.depends_on.len().to_string(),
            ]);
        }
        render_list("trigger", table, self.total)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TriggerDetailOutput {
    pub trigger: TriggerOutput,
    pub dependents: Vec<String>,
}

impl CommandOutput for TriggerDetailOutput {
    fn to_human(&self) -> String {
        let t = &self.trigger;
        let mut lines = vec![
            format!("Trigger: {}", t.name),
            format!("ID: {}", t.id),
            format!("Owner: {}", t.owner),
            format!("Severity: {}", t.severity),
        ];
        if !t.expression.is_empty() {
            lines.push(format!("Expression: {}", t.expression));
        }
        if !t.depends_on.is_empty() {
            lines.push("\nDepends on:".to_string());
            lines.extend(t.depends_on.iter().map(|d| format!("  - {d}")));
        }
        if !self.dependents.is_empty() {
            lines.push("\nDependents:".to_string());
            lines.extend(self.dependents.iter().map(|d| format!("  - {d}")));
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TriggerActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for TriggerActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

fn action(message: String) -> TriggerActionOutput {
    TriggerActionOutput {
        success: true,
        message,
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AuditOutput {
    pub clean: bool,
    pub triggers: usize,
    pub edges: usize,
    pub cycle: Option<Vec<String>>,
    pub linkage_violations: Vec<String>,
}

impl CommandOutput for AuditOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Checked {} trigger(s) and {} dependency edge(s).",
            self.triggers, self.edges
        )];
        if let Some(cycle) = &self.cycle {
            lines.push(format!("Cycle: {}", cycle.join(" -> ")));
        }
        lines.extend(self.linkage_violations.iter().cloned());
        if self.clean {
            lines.push("No problems found.".to_string());
        }
        lines.join("\n")
    }
}

/// Attach the rejection prefix to validation failures; pass everything else through.
fn rejected(err: DomainError) -> anyhow::Error {
    match err {
        DomainError::DependencyRejected(_) => anyhow::Error::from(err).context(UPDATE_REJECTED),
        other => other.into(),
    }
}

/// "owner: name" labels for every trigger, plus owner names by id.
async fn labels(service: &CliService) -> Result<(HashMap<Uuid, String>, HashMap<Uuid, String>)> {
    let owners: HashMap<Uuid, String> = service
        .list_hosts()
        .await?
        .into_iter()
        .map(|h| (h.id, h.name))
        .collect();
    let names = service
        .list_triggers(TriggerFilter::default())
        .await?
        .into_iter()
        .map(|t| (t.id, format!("{}: {}", lookup(&owners, t.owner_id), t.name)))
        .collect();
    Ok((owners, names))
}

pub async fn execute(args: TriggerArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = open_service(config).await?;

    match args.command {
        TriggerCommands::Add { owner, name, expression, severity } => {
            let severity = TriggerSeverity::from_str(&severity)
                .ok_or_else(|| anyhow!("Invalid severity: {severity}"))?;
            let owner = resolve_host(&service, &owner).await?;
            let trigger = service
                .create_trigger(owner.id, name, expression, severity)
                .await?;
            output(
                &action(format!("Created trigger \"{}\" on \"{}\" ({})", trigger.name, owner.name, trigger.id)),
                json_mode,
            );
        }
        TriggerCommands::List { owner, limit } => {
            let owner_id = match owner {
                Some(name) => Some(resolve_host(&service, &name).await?.id),
                None => None,
            };
            let triggers = service.list_triggers(TriggerFilter { owner_id, limit }).await?;
            let (owners, names) = labels(&service).await?;
            let out = TriggerListOutput {
                total: triggers.len(),
                triggers: triggers.iter().map(|t| TriggerOutput::new(t, &owners, &names)).collect(),
            };
            output(&out, json_mode);
        }
        TriggerCommands::Show { owner, name } => {
            let trigger = resolve_trigger(&service, &owner, &name).await?;
            let (owners, names) = labels(&service).await?;
            let dependents = service
                .dependents_of(trigger.id)
                .await?
                .iter()
                .map(|t| lookup(&names, t.id))
                .collect();
            let out = TriggerDetailOutput {
                trigger: TriggerOutput::new(&trigger, &owners, &names),
                dependents,
            };
            output(&out, json_mode);
        }
        TriggerCommands::Depend { owner, name, on_owner, on } => {
            let dependent = resolve_trigger(&service, &owner, &name).await?;
            let depends_on = resolve_trigger(&service, &on_owner, &on).await?;
            let added = service
                .add_dependency(dependent.id, depends_on.id)
                .await
                .map_err(rejected)?;
            let message = if added {
                format!("\"{}\" now depends on \"{}\"", dependent.name, depends_on.name)
            } else {
                format!("\"{}\" already depends on \"{}\"", dependent.name, depends_on.name)
            };
            output(&action(message), json_mode);
        }
        TriggerCommands::Undepend { owner, name, on_owner, on } => {
            let dependent = resolve_trigger(&service, &owner, &name).await?;
            let depends_on = resolve_trigger(&service, &on_owner, &on).await?;
            let message = if service.remove_dependency(dependent.id, depends_on.id).await? {
                format!("\"{}\" no longer depends on \"{}\"", dependent.name, depends_on.name)
            } else {
                format!("\"{}\" does not depend on \"{}\"", dependent.name, depends_on.name)
            };
            output(&action(message), json_mode);
        }
        TriggerCommands::Delete { owner, name } => {
            let trigger = resolve_trigger(&service, &owner, &name).await?;
            let dropped = service
                .delete_trigger(trigger.id)
                .await
                .context("Failed to delete trigger")?;
            output(
                &action(format!("Deleted trigger \"{}\" and {} dependency edge(s)", trigger.name, dropped)),
                json_mode,
            );
        }
        TriggerCommands::Audit => {
            let report = service.audit().await?;
            let out = AuditOutput {
                clean: report.is_clean(),
                triggers: report.trigger_count,
                edges: report.edge_count,
                cycle: report
                    .cycle
                    .map(|c| c.iter().map(|n| format!("\"{n}\"")).collect()),
                linkage_violations: report.linkage_violations.iter().map(ToString::to_string).collect(),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
