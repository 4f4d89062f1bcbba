/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    if negative {
        format!("-${}.{dec_part}", group_thousands(int_part))
    } else {
        format!("${}.{dec_part}", group_thousands(int_part))
    }
}

/// Format a count with thousands separators: 12,345
pub fn number(val: usize) -> String {
    group_thousands(&val.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Short amount for chart bars: 950, 1.2k, 3.4M
pub fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{sign}{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}{:.1}k", abs / 1_000.0)
    } else {
        format!("{sign}{abs:.0}")
    }
}

const MONTH_ABBR: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short chart label for a period key: "2024-03" -> "Mar 2024". Other keys
/// (semesters, years) pass through.
pub fn period_label(key: &str) -> String {
    if let Some((year, month)) = key.split_once('-') {
        if let Ok(m) = month.parse::<usize>() {
            if let Some(name) = MONTH_ABBR.get(m.wrapping_sub(1)) {
                return format!("{name} {year}");
            }
        }
    }
    key.to_string()
}

/// Reformat an ISO date as DD/MM/YYYY; unparseable values pass through.
pub fn day_month_year(raw: &str) -> String {
    crate::loader::parse_date(raw)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}
