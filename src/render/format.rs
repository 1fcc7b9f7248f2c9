// src/render/format.rs
use chrono::{DateTime, Utc};

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Keep at most `budget` characters, then mark the cut with "...".
pub fn truncate_label(s: &str, budget: usize) -> String {
    if s.chars().count() > budget {
        let mut out: String = s.chars().take(budget).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

pub fn stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn repo_link(web_base_url: &str, full_name: &str) -> String {
    format!("{web_base_url}/{full_name}")
}

/// Tick label: integers (and anything past 100) get separators, small fractions one decimal.
pub fn axis_number(v: f64) -> String {
    if v.abs() >= 100.0 || v.fract() == 0.0 {
        let r = v.round();
        if r < 0.0 {
            format!("-{}", thousands(r.abs() as u64))
        } else {
            thousands(r as u64)
        }
    } else {
        format!("{v:.1}")
    }
}

/// Markdown table cells cannot contain raw pipes, and brackets would break `[name](url)`.
pub fn md_cell(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '|' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
