//! Number formatting shared by the table reports and the TUI.

/// Thousands separators: 1234567 -> "1,234,567".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact form for tight layouts: 1234567 -> "1.2M".
pub fn format_count_compact(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}

/// Currency with separators and two decimals: 1234.5 -> "$1,234.50".
pub fn format_currency(amount: f64) -> String {
    let total_cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        format_count(total_cents / 100),
        total_cents % 100
    )
}

/// Ratio to percentage, one decimal: 0.034 -> "3.4%".
pub fn format_pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
