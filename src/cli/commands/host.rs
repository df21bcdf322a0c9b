//! Host and template CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::collections::HashMap;
use uuid::Uuid;

use super::{open_service, resolve_host};
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, Host};

#[derive(Args, Debug)]
pub struct HostArgs {
    #[command(subcommand)]
    pub command: HostCommands,
}

#[derive(Subcommand, Debug)]
pub enum HostCommands {
    /// Create a host, or a template with --template
    Add {
        /// Host or template name
        name: String,
        /// Create a template instead of a host
        #[arg(short, long)]
        template: bool,
    },
    /// List hosts and templates
    List,
    /// Link a template to a host or another template
    Link {
        /// Host or template receiving the link
        host: String,
        /// Template to link
        template: String,
    },
    /// Remove a template link
    Unlink {
        /// Host or template holding the link
        host: String,
        /// Linked template
        template: String,
    },
    /// Delete a host or template together with its triggers
    Delete {
        /// Host or template name
        name: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct HostOutput {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub templates: Vec<String>,
}

impl HostOutput {
    fn new(host: &Host, names: &HashMap<Uuid, String>) -> Self {
        Self {
            id: host.id.to_string(),
            name: host.name.clone(),
            kind: host.kind.as_str().to_string(),
            templates: host
                .templates
                .iter()
                .map(|id| names.get(id).cloned().unwrap_or_else(|| id.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HostListOutput {
    pub hosts: Vec<HostOutput>,
    pub total: usize,
}

impl CommandOutput for HostListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "kind", "templates"]);
        for host in &self.hosts {
            table.add_row(vec![
                host.name.clone(),
                host.kind.clone(),
                host.templates.join(", "),
            ]);
        }
        render_list("host", table, self.total)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HostActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for HostActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

fn action(message: String) -> HostActionOutput {
    HostActionOutput {
        success: true,
        message,
    }
}

pub async fn execute(args: HostArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = open_service(config).await?;

    match args.command {
        HostCommands::Add { name, template } => {
            let host = if template {
                service.create_template(name).await?
            } else {
                service.create_host(name).await?
            };
            output(
                &action(format!("Created {} \"{}\" ({})", host.label(), host.name, host.id)),
                json_mode,
            );
        }
        HostCommands::List => {
            let hosts = service.list_hosts().await?;
            let names: HashMap<Uuid, String> =
                hosts.iter().map(|h| (h.id, h.name.clone())).collect();
            let out = HostListOutput {
                total: hosts.len(),
                hosts: hosts.iter().map(|h| HostOutput::new(h, &names)).collect(),
            };
            output(&out, json_mode);
        }
        HostCommands::Link { host, template } => {
            let host = resolve_host(&service, &host).await?;
            let template = resolve_host(&service, &template).await?;
            let message = if service.link_template(host.id, template.id).await? {
                format!("Linked \"{}\" to \"{}\"", template.name, host.name)
            } else {
                format!("\"{}\" is already linked to \"{}\"", template.name, host.name)
            };
            output(&action(message), json_mode);
        }
        HostCommands::Unlink { host, template } => {
            let host = resolve_host(&service, &host).await?;
            let template = resolve_host(&service, &template).await?;
            let message = if service.unlink_template(host.id, template.id).await? {
                format!("Unlinked \"{}\" from \"{}\"", template.name, host.name)
            } else {
                format!("\"{}\" is not linked to \"{}\"", template.name, host.name)
            };
            output(&action(message), json_mode);
        }
        HostCommands::Delete { name } => {
            let host = resolve_host(&service, &name).await?;
            service.delete_host(host.id).await?;
            output(
                &action(format!("Deleted {} \"{}\"", host.label(), host.name)),
                json_mode,
            );
        }
    }

    Ok(())
}
