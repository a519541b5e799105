use std::collections::HashSet;

pub fn parse_csv_list(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for part in value.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_string()) {
            out.push(item.to_string());
        }
    }
    out
}

pub fn parse_positive_u32(value: &str) -> Result<u32, String> {
    let raw = value.trim();
    let n: u32 = raw
        .parse()
        .map_err(|_| format!("expected a positive integer, got '{raw}'"))?;
    if n == 0 {
        return Err("expected a positive integer, got 0".to_string());
    }
    Ok(n)
}

/// Renders a number the way a JavaScript `Number#toString` would for the
/// values this crate deals with: integral values lose their fraction and
/// NaN stays visible instead of failing.
pub fn js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if value.fract() == 0.0 && value.abs() < 1e21 {
        return format!("{}", value as i128);
    }
    format!("{value}")
}

/// en-US digit grouping with at most three fraction digits.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return js_number(value);
    }
    let negative = value < 0.0;
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (rounded.clone(), String::new()),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let mut out = String::new();
    if negative && (grouped != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    out
}
