//! Line grammar of IMGW legend (`*_info.txt`) files.

use crate::utils::normalize_label;

const SENTINEL_KEYWORDS: [&str; 2] = ["oznacza", "means"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LegendLine {
    Column {
        key: Option<String>,
        display_name: String,
        unit: Option<String>,
        is_status_field: bool,
    },
    Sentinel {
        subject: String,
        value: f64,
        description: String,
    },
}

/// Classifies one legend line. Blank and unrecognised lines yield `None`.
pub(crate) fn parse_line(line: &str) -> Option<LegendLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    parse_sentinel(&tokens).or_else(|| parse_column(&tokens))
}

fn parse_sentinel(tokens: &[&str]) -> Option<LegendLine> {
    let keyword = tokens
        .iter()
        .position(|token| SENTINEL_KEYWORDS.contains(&token.to_lowercase().as_str()))?;
    if keyword < 2 || keyword + 1 >= tokens.len() {
        return None;
    }
    let value = tokens[keyword - 1].replace(',', ".").parse::<f64>().ok()?;
    Some(LegendLine::Sentinel {
        subject: tokens[..keyword - 1].join(" "),
        value,
        description: tokens[keyword + 1..].join(" "),
    })
}

fn parse_column(tokens: &[&str]) -> Option<LegendLine> {
    if tokens.iter().any(|token| token.contains(':')) {
        return None;
    }
    let mut name_tokens = tokens;

    let key = match name_tokens.split_first() {
        Some((first, rest)) if !rest.is_empty() && is_key_token(first) => {
            name_tokens = rest;
            Some(first.trim_end_matches(['.', ')']).to_string())
        }
        _ => None,
    };
    if let Some((last, rest)) = name_tokens.split_last() {
        if !rest.is_empty() && is_width_token(last) {
            name_tokens = rest;
        }
    }

    let display_name = name_tokens.join(" ");
    let display_name = display_name.trim_matches(|c: char| c == '-' || c.is_whitespace());
    if !display_name.chars().next().is_some_and(char::is_alphabetic) {
        return None;
    }
    Some(LegendLine::Column {
        key,
        unit: unit_of(display_name),
        is_status_field: normalize_label(display_name).starts_with("status"),
        display_name: display_name.to_string(),
    })
}

/// `H1`, `TMAX1`, `7`, `12.` or `3)`: up to four letters followed by one to three digits.
fn is_key_token(token: &str) -> bool {
    let token = token.trim_end_matches(['.', ')']);
    let letters = token.chars().take_while(char::is_ascii_alphabetic).count();
    let digits = &token[letters..];
    letters <= 4
        && (1..=3).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// `5`, `30` or `5/1`: field width with optional decimals.
fn is_width_token(token: &str) -> bool {
    let mut parts = token.splitn(2, '/');
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    parts.next().is_some_and(all_digits) && parts.next().map_or(true, all_digits)
}

fn unit_of(display_name: &str) -> Option<String> {
    let open = display_name.rfind('[')?;
    let close = display_name[open..].find(']')? + open;
    let unit = display_name[open + 1..close].trim();
    (!unit.is_empty()).then(|| unit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(line: &str) -> (Option<String>, String, Option<String>, bool) {
        match parse_line(line) {
            Some(LegendLine::Column {
                key,
                display_name,
                unit,
                is_status_field,
            }) => (key, display_name, unit, is_status_field),
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn test_column_with_width_and_unit() {
        let (key, name, unit, status) = column("Maksymalna temperatura dobowa [°C]    5/1");
        assert_eq!(key, None);
        assert_eq!(name, "Maksymalna temperatura dobowa [°C]");
        assert_eq!(unit.as_deref(), Some("°C"));
        assert!(!status);
    }

    #[test]
    fn test_column_with_key() {
        let (key, name, unit, _) = column("H1  Water level [cm]");
        assert_eq!(key.as_deref(), Some("H1"));
        assert_eq!(name, "Water level [cm]");
        assert_eq!(unit.as_deref(), Some("cm"));

        let (key, name, _, _) = column("7. Kod stacji 9");
        assert_eq!(key.as_deref(), Some("7"));
        assert_eq!(name, "Kod stacji");
    }

    #[test]
    fn test_plain_name_and_status() {
        let (key, name, unit, status) = column("Nazwa stacji");
        assert_eq!((key, unit), (None, None));
        assert_eq!(name, "Nazwa stacji");
        assert!(!status);

        let (_, name, _, status) = column("Status pomiaru TMAX 1");
        assert_eq!(name, "Status pomiaru TMAX");
        assert!(status);
    }

    #[test]
    fn test_sentinel_line() {
        assert_eq!(
            parse_line("Stan wody 9999 oznacza brak danych"),
            Some(LegendLine::Sentinel {
                subject: "Stan wody".into(),
                value: 9999.0,
                description: "brak danych".into(),
            })
        );
        assert!(matches!(
            parse_line("Flow 99999.999 means missing value"),
            Some(LegendLine::Sentinel { value, .. }) if value == 99999.999
        ));
    }

    #[test]
    fn test_unrecognised_lines() {
        for line in ["", "   ", "-----------", "=== 2023 ===", "Opis: plik dobowy", "5/1"] {
            assert_eq!(parse_line(line), None, "{line:?}");
        }
    }

    #[test]
    fn test_tokens() {
        assert!(is_key_token("H1"));
        assert!(is_key_token("TMAX12"));
        assert!(is_key_token("3)"));
        assert!(!is_key_token("Rok"));
        assert!(!is_key_token("ABCDE1"));
        assert!(is_width_token("5/1"));
        assert!(is_width_token("30"));
        assert!(!is_width_token("5/"));
        assert!(!is_width_token("[cm]"));
    }
}
