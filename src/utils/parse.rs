pub fn parse_int(value: Option<&str>, default: i64) -> i64 {
    let Some(text) = value.filter(|v| !v.is_empty()) else {
        return default;
    };
    text.parse::<i64>().unwrap_or(default)
}

/// Absent or empty values yield `default`. A non-empty value that is not one
/// of the recognized literals is `false`, not `default`.
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    let Some(text) = value.filter(|v| !v.is_empty()) else {
        return default;
    };
    parse_bool_strict(text).unwrap_or(false)
}

pub fn parse_bool_strict(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "on" | "yes" | "t" => Some(true),
        "false" | "0" | "off" | "no" | "f" => Some(false),
        _ => None,
    }
}
