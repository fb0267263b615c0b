const NBSP: char = '\u{a0}';

pub fn round_currency(value: f64) -> f64 {
    value.round()
}

/// Formats a whole-zloty amount the way pl-PL locales print currency:
/// non-breaking space separators, grouping only from five digits up.
pub fn format_pln(value: f64) -> String {
    let rounded = round_currency(value);
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    let grouped = if digits.len() > 4 {
        group_thousands(&digits)
    } else {
        digits
    };
    format!("{sign}{grouped}{NBSP}zł")
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * NBSP.len_utf8());
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(NBSP);
        }
        out.push(ch);
    }
    out
}
