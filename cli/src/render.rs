// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Terminal tables for control service payloads.
//!
//! Writers take any `io::Write` so the view command can render into a buffer.
//! Runtime payloads are passed through as JSON and only the columns shown
//! here are picked out of them.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

use fleetdeck_sdk::{AppTemplate, NodeItem, RuntimeResource, SystemInfo};

pub fn write_json<W: Write, S: Serialize + ?Sized>(out: &mut W, value: &S) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{}", text)
}

pub fn write_nodes<W: Write>(out: &mut W, nodes: &[NodeItem]) -> io::Result<()> {
    if nodes.is_empty() {
        return writeln!(out, "{}", "No nodes found".yellow());
    }

    writeln!(
        out,
        "{:<20} {:<16} {:<6} {:<9} {:<10} {}",
        "NAME", "IP", "PORT", "STATUS", "VERSION", "OS"
    )?;
    for node in nodes {
        let status = if node.status {
            "online".green()
        } else {
            "offline".red()
        };
        writeln!(
            out,
            "{:<20} {:<16} {:<6} {:<9} {:<10} {} {}",
            node.name.bold(),
            node.ip,
            node.port,
            status,
            node.version,
            node.os,
            node.os_version
        )?;
    }
    Ok(())
}

pub fn write_node<W: Write>(out: &mut W, node: &NodeItem) -> io::Result<()> {
    writeln!(out, "{}", node.name.bold())?;
    writeln!(out, "  Host:     {}", node.host_name)?;
    writeln!(out, "  Address:  {}:{}", node.ip, node.port)?;
    writeln!(
        out,
        "  Status:   {}",
        if node.status { "online".green() } else { "offline".red() }
    )?;
    writeln!(out, "  Version:  {}", node.version)?;
    writeln!(out, "  Platform: {} {} ({})", node.os, node.os_version, node.arch)?;
    writeln!(out, "  Kernel:   {}", node.os_kernel)
}

pub fn write_system_info<W: Write>(out: &mut W, info: &SystemInfo) -> io::Result<()> {
    if let Some(host) = &info.host_name {
        writeln!(out, "{}", host.bold())?;
    }
    if let Some(os) = info.long_os_version.as_ref().or(info.os_version.as_ref()) {
        writeln!(out, "  OS:     {}", os)?;
    }
    if let Some(kernel) = &info.kernel_version {
        writeln!(out, "  Kernel: {}", kernel)?;
    }
    writeln!(out, "  CPU:    {} cores, {:.1}% used", info.cpu_count, info.cpu_usage)?;
    writeln!(
        out,
        "  Memory: {} / {} ({:.1}% used)",
        human_bytes(info.mem_used),
        human_bytes(info.mem_total),
        info.mem_usage
    )?;

    if !info.disks.is_empty() {
        writeln!(out, "  Disks:")?;
        for disk in &info.disks {
            writeln!(
                out,
                "    {:<16} {:<20} {} free of {}",
                disk.name,
                disk.mount,
                human_bytes(disk.free),
                human_bytes(disk.total)
            )?;
        }
    }
    if !info.networks.is_empty() {
        writeln!(out, "  Networks:")?;
        for net in &info.networks {
            writeln!(
                out,
                "    {:<16} {:<18} in {} / out {}",
                net.name,
                net.ips.join(","),
                human_bytes(net.total_in),
                human_bytes(net.total_out)
            )?;
        }
    }
    Ok(())
}

pub fn write_containers<W: Write>(out: &mut W, containers: &Value) -> io::Result<()> {
    let items = as_items(containers, None);
    if items.is_empty() {
        return writeln!(out, "{}", "No containers found".yellow());
    }

    writeln!(
        out,
        "{:<14} {:<28} {:<32} {:<10} {}",
        "ID", "NAME", "IMAGE", "STATE", "STATUS"
    )?;
    for container in items {
        let name = container
            .get("Names")
            .and_then(Value::as_array)
            .and_then(|names| names.first())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim_start_matches('/');
        let state = text(container, "State");
        let state = if state == "running" {
            state.green()
        } else {
            state.normal()
        };
        writeln!(
            out,
            "{:<14} {:<28} {:<32} {:<10} {}",
            short_id(text(container, "Id")),
            name.bold(),
            text(container, "Image"),
            state,
            text(container, "Status")
        )?;
    }
    Ok(())
}

pub fn write_resources<W: Write>(
    out: &mut W,
    resource: RuntimeResource,
    payload: &Value,
) -> io::Result<()> {
    match resource {
        RuntimeResource::Image => {
            let items = as_items(payload, None);
            if items.is_empty() {
                return writeln!(out, "{}", "No images found".yellow());
            }
            writeln!(out, "{:<14} {:<48} {}", "ID", "TAGS", "SIZE")?;
            for image in items {
                let tags = image
                    .get("RepoTags")
                    .and_then(Value::as_array)
                    .map(|tags| {
                        tags.iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .unwrap_or_default();
                let id = text(image, "Id");
                let id = id.strip_prefix("sha256:").unwrap_or(id);
                let size = image.get("Size").and_then(Value::as_u64).unwrap_or(0);
                writeln!(out, "{:<14} {:<48} {}", short_id(id), tags, human_bytes(size))?;
            }
        }
        RuntimeResource::Network => {
            let items = as_items(payload, None);
            if items.is_empty() {
                return writeln!(out, "{}", "No networks found".yellow());
            }
            writeln!(out, "{:<14} {:<28} {:<10} {}", "ID", "NAME", "DRIVER", "SCOPE")?;
            for network in items {
                writeln!(
                    out,
                    "{:<14} {:<28} {:<10} {}",
                    short_id(text(network, "Id")),
                    text(network, "Name").bold(),
                    text(network, "Driver"),
                    text(network, "Scope")
                )?;
            }
        }
        RuntimeResource::Volume => {
            // Volume listings come wrapped as `{"Volumes": [...], "Warnings": [...]}`.
            let items = as_items(payload, Some("Volumes"));
            if items.is_empty() {
                return writeln!(out, "{}", "No volumes found".yellow());
            }
            writeln!(out, "{:<40} {:<10} {}", "NAME", "DRIVER", "MOUNTPOINT")?;
            for volume in items {
                writeln!(
                    out,
                    "{:<40} {:<10} {}",
                    text(volume, "Name").bold(),
                    text(volume, "Driver"),
                    text(volume, "Mountpoint")
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_templates<W: Write>(out: &mut W, templates: &[AppTemplate]) -> io::Result<()> {
    if templates.is_empty() {
        return writeln!(out, "{}", "No application templates found".yellow());
    }

    writeln!(out, "{:<24} {:<24} {:<10} {}", "ID", "NAME", "VERSION", "DESCRIPTION")?;
    for template in templates {
        writeln!(
            out,
            "{:<24} {:<24} {:<10} {}",
            template.id,
            template.name.bold(),
            template.version,
            template.description
        )?;
    }
    Ok(())
}

pub fn write_template<W: Write>(out: &mut W, template: &AppTemplate) -> io::Result<()> {
    writeln!(out, "{} ({})", template.name.bold(), template.id)?;
    writeln!(out, "  Version:     {}", template.version)?;
    writeln!(out, "  Description: {}", template.description)?;
    if !template.tmpls.is_empty() {
        writeln!(out, "  Templates:   {}", template.tmpls.join(", "))?;
    }
    if !template.values.trim().is_empty() {
        writeln!(out, "  Values:")?;
        for line in template.values.lines() {
            writeln!(out, "    {}", line)?;
        }
    }
    Ok(())
}

fn as_items<'a>(payload: &'a Value, wrapper: Option<&str>) -> &'a [Value] {
    let payload = match wrapper {
        Some(key) => payload.get(key).unwrap_or(payload),
        None => payload,
    };
    payload.as_array().map(Vec::as_slice).unwrap_or_default()
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
