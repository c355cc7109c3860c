// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Dashboard pages in the terminal
//!
//! A location is resolved with the dashboard's router, then the page is
//! filled from the same control service calls the web page makes.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::io::Write;

use fleetdeck_dashboard::{Page, Params, ResolvedView, ViewRouter};
use fleetdeck_sdk::{FleetClient, NodeListRequest, NodeName, Transport};

use crate::render;

#[derive(Args)]
pub struct ViewArgs {
    /// Dashboard location, e.g. `/node/docker?node_name=edge-1`
    #[arg(value_name = "LOCATION", default_value = "/")]
    pub location: String,

    /// Print the resolved route instead of rendering the page
    #[arg(long)]
    pub resolve_only: bool,
}

/// Data a page loads when shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Overview,
    Nodes,
    Containers(NodeName),
    Templates,
    Template(String),
}

impl PageRequest {
    pub fn for_page(page: Page, params: &Params) -> Result<Self> {
        let required = |key: &str| {
            params
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .with_context(|| format!("This page needs a '{}' parameter", key))
        };

        Ok(match page {
            Page::Dashboard => PageRequest::Overview,
            Page::NodeManager => PageRequest::Nodes,
            Page::Docker => PageRequest::Containers(NodeName::new(required("node_name")?)),
            Page::Applications => PageRequest::Templates,
            Page::ApplicationDeploy => PageRequest::Template(required("id")?),
        })
    }
}

pub async fn handle_command<T: Transport>(
    args: ViewArgs,
    client: &FleetClient<T>,
) -> Result<()> {
    let router = ViewRouter::dashboard();
    let view = router.resolve(&args.location);
    let mut out = std::io::stdout();

    if args.resolve_only {
        render::write_json(&mut out, &view)?;
        return Ok(());
    }

    render_view(client, &router, &view, &mut out).await
}

/// Render `view` into `out`.
pub async fn render_view<T: Transport, W: Write>(
    client: &FleetClient<T>,
    router: &ViewRouter,
    view: &ResolvedView,
    out: &mut W,
) -> Result<()> {
    let request = router.materialize(view, PageRequest::for_page)?;

    write!(out, "{} {}", "▸".bold(), view.path.bold())?;
    if let Some(from) = &view.redirected_from {
        write!(out, " {}", format!("(from {})", from).dimmed())?;
    }
    writeln!(out)?;

    match request {
        PageRequest::Overview => {
            let nodes = client
                .list_nodes(&NodeListRequest { all: true })
                .await?
                .into_data()
                .context("Failed to list nodes")?;
            let templates = client
                .list_app_templates()
                .await?
                .into_optional_data()
                .context("Failed to list application templates")?
                .unwrap_or_default();

            let online = nodes.iter().filter(|node| node.status).count();
            writeln!(
                out,
                "Nodes:        {} ({} online, {} offline)",
                nodes.len(),
                online.to_string().green(),
                (nodes.len() - online).to_string().red()
            )?;
            writeln!(out, "Applications: {}", templates.len())?;
        }
        PageRequest::Nodes => {
            let nodes = client
                .list_nodes(&NodeListRequest { all: true })
                .await?
                .into_data()
                .context("Failed to list nodes")?;
            render::write_nodes(out, &nodes)?;
        }
        PageRequest::Containers(node) => {
            let containers = client
                .list_containers(&node)
                .await?
                .into_data()
                .with_context(|| format!("Failed to list containers on node '{}'", node))?;
            writeln!(out, "Node: {}", node.as_str().bold())?;
            render::write_containers(out, &containers)?;
        }
        PageRequest::Templates => {
            let templates = client
                .list_app_templates()
                .await?
                .into_data()
                .context("Failed to list application templates")?;
            render::write_templates(out, &templates)?;
        }
        PageRequest::Template(id) => {
            let template = client
                .app_template_info(&id)
                .await?
                .into_data()
                .with_context(|| format!("Failed to load application template '{}'", id))?;
            render::write_template(out, &template)?;
        }
    }

    Ok(())
}
