//! Plain-text tables and summaries written to stdout.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use podcycle_adapter_kube::{DeploymentRow, PodRow, UsageReport};
use podcycle_domain::{CycleSummary, format_age};

const RULE: usize = 80;

fn rule(width: usize) -> String {
    "=".repeat(width)
}

pub fn render_summary(summary: &CycleSummary) -> String {
    let mut lines = vec![
        String::new(),
        rule(60),
        "RESTART SUMMARY".to_string(),
        rule(60),
        format!("Successfully restarted: {}", summary.succeeded),
        format!("Failed to restart: {}", summary.failed),
        format!("Total processed: {}", summary.total),
    ];
    if summary.all_succeeded() {
        lines.push("\nAll pods restarted successfully!".to_string());
    } else {
        lines.push("\nSome pods failed to restart. Check the output above for details.".to_string());
    }
    lines.join("\n")
}

pub fn render_pods(rows: &[PodRow], since_hours: Option<u32>, now: DateTime<Utc>) -> String {
    let scope = since_hours
        .map(|hours| format!(" created in the last {hours} hours"))
        .unwrap_or_default();
    if rows.is_empty() {
        return format!("No pods found{scope}");
    }

    let mut lines = vec![
        format!("Found {} pods{scope}:", rows.len()),
        String::new(),
        format!("{:<20} {:<40} {:<15} {}", "NAMESPACE", "NAME", "STATUS", "AGE"),
        "-".repeat(RULE),
    ];
    lines.extend(rows.iter().map(|row| {
        format!(
            "{:<20} {:<40} {:<15} {}",
            row.namespace,
            row.name,
            row.phase.as_str(),
            format_age(row.created_at, now)
        )
    }));
    lines.push(String::new());
    lines.push(format!("Total pods: {}", rows.len()));
    lines.join("\n")
}

pub fn render_deployments(rows: &[DeploymentRow], now: DateTime<Utc>) -> String {
    if rows.is_empty() {
        return "No deployments found".to_string();
    }

    let mut lines = vec![
        format!("Found {} deployments:", rows.len()),
        String::new(),
        format!(
            "{:<20} {:<40} {:<9} {:<6} {:<10} {}",
            "NAMESPACE", "NAME", "REPLICAS", "READY", "AVAILABLE", "AGE"
        ),
        "-".repeat(RULE + 10),
    ];
    lines.extend(rows.iter().map(|row| {
        format!(
            "{:<20} {:<40} {:<9} {:<6} {:<10} {}",
            row.namespace,
            row.name,
            row.replicas,
            row.ready,
            row.available,
            format_age(row.created_at, now)
        )
    }));

    let mut per_namespace: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *per_namespace.entry(row.namespace.as_str()).or_insert(0) += 1;
    }
    lines.push(String::new());
    lines.push("Deployments per namespace:".to_string());
    lines.extend(
        per_namespace
            .iter()
            .map(|(namespace, count)| format!("  {namespace}: {count}")),
    );
    lines.join("\n")
}

fn usage_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| format!("{value:.0}"))
}

pub fn render_usage(report: &UsageReport) -> String {
    if report.rows.is_empty() {
        return "No pods found in the cluster".to_string();
    }

    let mut lines = vec![
        format!("Found {} pods with resource information:", report.rows.len()),
        String::new(),
        format!(
            "{:<20} {:<35} {:<12} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
            "NAMESPACE", "POD NAME", "STATUS", "CPU REQ", "CPU LIM", "MEM REQ", "MEM LIM", "CPU USE",
            "MEM USE"
        ),
        format!(
            "{:<20} {:<35} {:<12} {:<8} {:<8} {:<8} {:<8} {:<8} {:<8}",
            "", "", "", "(mCPU)", "(mCPU)", "(MiB)", "(MiB)", "(mCPU)", "(MiB)"
        ),
        "-".repeat(RULE + 50),
    ];
    lines.extend(report.rows.iter().map(|row| {
        format!(
            "{:<20} {:<35} {:<12} {:<8.0} {:<8.0} {:<8.0} {:<8.0} {:<8} {:<8}",
            row.namespace,
            row.name,
            row.phase.as_str(),
            row.cpu_request,
            row.cpu_limit,
            row.memory_request,
            row.memory_limit,
            usage_cell(row.cpu_usage),
            usage_cell(row.memory_usage)
        )
    }));

    let totals = report.totals();
    lines.push(String::new());
    lines.push(rule(RULE));
    lines.push("CLUSTER RESOURCE SUMMARY".to_string());
    lines.push(rule(RULE));
    lines.push(format!("Total pods: {}", report.rows.len()));
    for (phase, count) in report.phase_counts() {
        lines.push(format!("{phase} pods: {count}"));
    }
    lines.push(String::new());
    lines.push("RESOURCE REQUESTS:".to_string());
    lines.push(cpu_line("CPU requests", totals.cpu_request));
    lines.push(memory_line("Memory requests", totals.memory_request));
    lines.push(String::new());
    lines.push("RESOURCE LIMITS:".to_string());
    lines.push(cpu_line("CPU limits", totals.cpu_limit));
    lines.push(memory_line("Memory limits", totals.memory_limit));

    lines.push(String::new());
    if report.metrics_available {
        lines.push("CURRENT USAGE:".to_string());
        lines.push(cpu_line("CPU usage", totals.cpu_usage));
        lines.push(memory_line("Memory usage", totals.memory_usage));
        if let Some(percent) = totals.cpu_utilisation() {
            lines.push(format!("  CPU utilisation: {percent:.1}% of requests"));
        }
        if let Some(percent) = totals.memory_utilisation() {
            lines.push(format!("  Memory utilisation: {percent:.1}% of requests"));
        }
    } else {
        lines.push(
            "Current usage metrics not available (metrics-server may not be installed)"
                .to_string(),
        );
    }
    lines.join("\n")
}

fn cpu_line(label: &str, millicores: f64) -> String {
    format!(
        "  {label}: {millicores:.0} mCPU ({:.2} CPU cores)",
        millicores / 1000.0
    )
}

fn memory_line(label: &str, mib: f64) -> String {
    format!("  {label}: {mib:.0} MiB ({:.2} GiB)", mib / 1024.0)
}
