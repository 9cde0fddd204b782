//! Human-readable output for `--summary` and the submit workflow.
//!
//! Summaries go to stdout. The live poll status line goes to stderr so it
//! never ends up in redirected output.

use console::{style, Term};
use urlquery_lib::{
    report_url, queue_url, ConfigKey, DomainSummary, HttpTransaction, QueuedJob, Report,
    ReputationResult, SearchResponse, Verdict,
};

const RULE: &str =
    "─────────────────────────────────────────────────────────────────────────────";

/// URLs longer than this are cut in search summaries.
const MAX_URL_WIDTH: usize = 76;

// ── Formatting helpers ───────────────────────────────────────────────────────

/// Byte count in SI units, e.g. `82 B`, `1.5 kB`, `12 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{} B", bytes);
    }

    let mut exp = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1000.0 && exp < UNITS.len() - 1 {
        scaled /= 1000.0;
        exp += 1;
    }

    let mut value = round_tenth(scaled);
    // 999.95 kB rounds to "1000 kB"; show it as the next unit instead
    if value >= 999.5 && exp < UNITS.len() - 1 {
        exp += 1;
        value = round_tenth(scaled / 1000.0);
    }

    if value < 10.0 {
        format!("{:.1} {}", value, UNITS[exp])
    } else {
        format!("{:.0} {}", value, UNITS[exp])
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// `YYYY-MM-DD` for RFC 3339 timestamps; anything else is shown as-is.
pub fn format_date(value: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Flag emoji for a two-letter country code, empty otherwise.
pub fn country_flag(code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return String::new();
    }
    code.chars()
        .filter_map(|c| char::from_u32(c as u32 + 127_397))
        .collect()
}

pub fn truncate_url(url: &str) -> String {
    if url.chars().count() > MAX_URL_WIDTH {
        let head: String = url.chars().take(70).collect();
        format!("{} (...)", head)
    } else {
        url.to_string()
    }
}

pub fn verdict_icon(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Malicious => "🚫",
        Verdict::Suspicious => "⚠️",
        Verdict::Benign => "✅",
        Verdict::Unknown | Verdict::Other(_) => "❔",
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

fn domain_row(d: &DomainSummary) -> String {
    format!(
        "{:<57} | {:<12} | {:<10} | {:<10} | {:<10} | {:<10} | {:>6}",
        d.fqdn,
        d.domain_registered,
        format_date(&d.first_seen),
        format_date(&d.last_seen),
        format_bytes(d.received_data),
        format_bytes(d.sent_data),
        d.alert_count
    )
}

fn transaction_block(t: &HttpTransaction) -> Vec<String> {
    let content = &t.response.content;
    let mut lines = vec![
        RULE.to_string(),
        format!("🔗 URL       : {}://{}", t.url.schema, t.url.addr),
        format!("🌐 IP        : {} {}", t.ip.addr, country_flag(&t.ip.country_code)),
        format!("🌐 ASN       : #{} {}", t.ip.asn, t.ip.as_name),
        format!("📡 Method    : {}", t.request.method),
        format!(
            "📥 Status    : {} {}",
            t.response.status_code, t.response.status_text
        ),
        format!("⏱️  Duration  : {}ms", t.total_time_used),
        format!("🔐 Security  : {}", t.security_state),
        String::new(),
        "📦 Response Content:".to_string(),
        format!("   └─ Size     : {}", format_bytes(content.size)),
        format!("   └─ MIME     : {}", content.mime_type),
        format!("   └─ Magic    : {}", content.magic),
        format!("   └─ MD5      : {}", content.md5),
        format!("   └─ SHA1     : {}", content.sha1),
        format!("   └─ SHA256   : {}", content.sha256),
        format!("   └─ SHA512   : {}", content.sha512),
        String::new(),
        "🚨 Detections:".to_string(),
    ];

    if t.alerts.is_empty() {
        lines.push("   └─ None".to_string());
    } else {
        let sources = [
            ("IDS", &t.alerts.ids_alerts),
            ("Analyzer", &t.alerts.analyzer_alerts),
            ("Urlquery", &t.alerts.urlquery_alerts),
        ];
        for (source, alerts) in sources {
            for alert in alerts {
                lines.push(format!("   └─ {}: {}", source, alert.alert));
            }
        }
    }

    lines.push(String::new());
    lines
}

/// Plain-text report summary (no styling, so it can be tested).
pub fn render_report_summary(report: &Report) -> String {
    let mut lines = vec![
        format!("📝 Report ID     : {}", report.id),
        format!("📝 Created       : {}", report.date),
        format!("🔗 Submitted URL : {}", report.url.addr),
        format!(
            "🌐 IP            : {} {}",
            report.ip.addr,
            country_flag(&report.ip.country_code)
        ),
        format!("🔗 Final URL     : {}", report.final_page.url.addr),
        format!("📄 Webpage Title : {}", report.final_page.title),
        format!(
            "🚨 Detections    : {}",
            report.stats.alert_count.urlquery
        ),
        format!("🏷️  Tags          : {}", report.tags.join(" ")),
        format!("🌐 HTTP Requests : {}", report.http_transactions.len()),
        String::new(),
        "🌍 Domain Summary:".to_string(),
    ];

    if report.summary.is_empty() {
        lines.push("No domain summary available.".to_string());
    } else {
        lines.push(format!(
            "{:<57} | {:<12} | {:<10} | {:<10} | {:<10} | {:<10} | {:>6}",
            "FQDN", "Registered", "First Seen", "Last Seen", "RX Bytes", "TX Bytes", "Alerts"
        ));
        lines.extend(report.summary.iter().map(domain_row));
    }

    lines.push(String::new());
    lines.push("🚨 URLQuery Detections:".to_string());
    for alert in &report.sensors.urlquery_alerts {
        lines.push(format!("   └─ {}", alert.alert));
    }

    lines.push(String::new());
    lines.push("🌍 HTTP Transactions:".to_string());
    for transaction in &report.http_transactions {
        lines.extend(transaction_block(transaction));
    }

    lines.join("\n")
}

pub fn print_report_summary(report: &Report) {
    println!("{}", render_report_summary(report));
}

// ── Search ───────────────────────────────────────────────────────────────────

pub fn print_search_summary(results: &SearchResponse) {
    println!("🔍 Search Query: {}", style(&results.query).bold());
    println!("Hits:    {}", results.total_hits);
    println!("Limit:   {}", results.limit);
    println!("Offset:  {}", results.offset);
    println!();

    for report in &results.reports {
        println!("{}", style(RULE).dim());
        println!("{}", style(format!("📝 Report ID:  {}", report.id)).bold());
        println!("🔗 URL:        {}", truncate_url(&report.url.addr));
        println!("🚨 Detections: {}", report.stats.alert_count.urlquery);
        println!("🏷️  Tags:       {}", report.tags.join(" "));
    }
    println!();
}

// ── Reputation ───────────────────────────────────────────────────────────────

pub fn print_reputation_summary(result: &ReputationResult) {
    let verdict = result.verdict_kind();
    let label = title_case(&result.verdict);
    let label = match verdict {
        Verdict::Malicious => style(label).red().bold(),
        Verdict::Suspicious => style(label).yellow().bold(),
        Verdict::Benign => style(label).green().bold(),
        Verdict::Unknown | Verdict::Other(_) => style(label).dim(),
    };

    println!("🔎 Reputation Summary");
    println!("{}", style(RULE).dim());
    println!("🔗 URL:     {}", result.url);
    println!("🛡️  Verdict: {} {}", verdict_icon(&verdict), label);

    if let Some(details) = &result.details {
        if !details.report_id.is_empty() {
            println!("📝 Report:  {}", report_url(&details.report_id));
        }
        if !details.phishing_target.is_empty() {
            println!("🎣 Target:  {}", details.phishing_target);
        }
        if !details.malware_family.is_empty() {
            println!("🦠 Family:  {}", details.malware_family);
        }
    }
}

// ── Submit ───────────────────────────────────────────────────────────────────

pub fn print_submit_summary(job: &QueuedJob) {
    let addr = job.url.as_ref().map(|u| u.addr.as_str()).unwrap_or_default();

    println!("Submitted URL:");
    println!("🔗 URL:      {}", style(addr).bold());
    println!("🆔 Queue ID: {}", job.queue_id);
    println!("📊 Status:   {}", job.status);
    println!();
    println!("{}", queue_url(&job.queue_id));
}

/// Overwrite the status line on stderr.
pub fn print_poll_status(job: &QueuedJob) {
    let term = Term::stderr();
    let _ = term.clear_line();
    let _ = term.write_str(&format!(
        "{} Current status: {}",
        style("⏳").cyan(),
        style(&job.status).bold()
    ));
}

pub fn clear_poll_status() {
    let _ = Term::stderr().clear_line();
}

pub fn print_report_finished(job: &QueuedJob) {
    println!("{}", style("Report finished:").green().bold());
    println!("  - {}", job.report_id);
    println!("  - {}", report_url(&job.report_id));
    println!();
    println!("To grab the report run:");
    println!("   urlquery-cli report {} report", job.report_id);
}

// ── Config ───────────────────────────────────────────────────────────────────

pub fn print_config_entries(path: &str, entries: &[(ConfigKey, String)]) {
    println!("Current Configuration ({}):", style(path).dim());
    if entries.is_empty() {
        println!("  {}", style("(no values set)").dim());
        return;
    }
    for (key, value) in entries {
        println!("  {}: {}", style(key).bold(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urlquery_lib::{Alert, TransactionAlerts};

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(82), "82 B");
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1000), "1.0 kB");
        assert_eq!(format_bytes(1500), "1.5 kB");
        assert_eq!(format_bytes(12_345), "12 kB");
        assert_eq!(format_bytes(3_400_000), "3.4 MB");
        assert_eq!(format_bytes(999_950), "1.0 MB");
        assert_eq!(format_bytes(999_999), "1.0 MB");
        assert_eq!(format_bytes(999_449), "999 kB");
        assert_eq!(format_bytes(9_999), "10 kB");
        assert_eq!(format_bytes(1_000_000), "1.0 MB");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05T12:30:00Z"), "2024-03-05");
        assert_eq!(format_date("2024-03-05T23:30:00+02:00"), "2024-03-05");
        assert_eq!(format_date("2001-07-14"), "2001-07-14");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_country_flag() {
        assert_eq!(country_flag("no"), "🇳🇴");
        assert_eq!(country_flag("US"), "🇺🇸");
        assert_eq!(country_flag(""), "");
        assert_eq!(country_flag("USA"), "");
        assert_eq!(country_flag("1A"), "");
    }

    #[test]
    fn test_truncate_url() {
        let short = "example.com/path";
        assert_eq!(truncate_url(short), short);

        let long = format!("example.com/{}", "a".repeat(100));
        let cut = truncate_url(&long);
        assert!(cut.ends_with(" (...)"));
        assert_eq!(cut.chars().count(), 76);
    }

    #[test]
    fn test_verdict_icon() {
        assert_eq!(verdict_icon(&Verdict::Malicious), "🚫");
        assert_eq!(verdict_icon(&Verdict::Benign), "✅");
        assert_eq!(verdict_icon(&Verdict::Other("weird".to_string())), "❔");
    }

    #[test]
    fn test_render_report_summary() {
        let mut report = Report {
            id: "82c4121d-d037-4d60-9f74-517bf00091ce".to_string(),
            tags: vec!["phish".to_string(), "kit".to_string()],
            ..Default::default()
        };
        report.summary.push(DomainSummary {
            fqdn: "example.com".to_string(),
            first_seen: "2024-03-05T12:30:00Z".to_string(),
            received_data: 1500,
            alert_count: 3,
            ..Default::default()
        });
        report.http_transactions.push(HttpTransaction {
            alerts: TransactionAlerts {
                ids_alerts: vec![Alert {
                    alert: "ET PHISHING kit".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        });

        let rendered = render_report_summary(&report);
        assert!(rendered.contains("82c4121d-d037-4d60-9f74-517bf00091ce"));
        assert!(rendered.contains("phish kit"));
        assert!(rendered.contains("2024-03-05"));
        assert!(rendered.contains("1.5 kB"));
        assert!(rendered.contains("IDS: ET PHISHING kit"));
        assert!(!rendered.contains("No domain summary available."));
    }

    #[test]
    fn test_render_empty_report_summary() {
        let rendered = render_report_summary(&Report::default());
        assert!(rendered.contains("No domain summary available."));
        assert!(rendered.contains("🌐 HTTP Requests : 0"));
    }
}
