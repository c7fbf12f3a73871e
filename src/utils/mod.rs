use crate::api::error::UploadError;

const KB: f64 = (1u64 << 10) as f64;
const MB: f64 = (1u64 << 20) as f64;
const GB: f64 = (1u64 << 30) as f64;

/// Parse a human readable size such as `"500kb"`, `"1.5MB"` or `"2048"` into bytes.
///
/// Units are binary (1kb = 1024 bytes). Input without a unit, or with a bare
/// `b`, is taken as bytes.
pub fn parse_size(input: &str) -> Result<u64, UploadError> {
    let s = input.trim().to_lowercase();

    let (number, multiplier) = if let Some(n) = s.strip_suffix("kb") {
        (n, KB)
    } else if let Some(n) = s.strip_suffix("mb") {
        (n, MB)
    } else if let Some(n) = s.strip_suffix("gb") {
        (n, GB)
    } else if let Some(n) = s.strip_suffix('b') {
        (n, 1.0)
    } else {
        (s.as_str(), 1.0)
    };

    let value = number
        .trim()
        .parse::<f64>()
        .map_err(|_| UploadError::InvalidSize(input.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(UploadError::InvalidSize(input.to_string()));
    }

    Ok((value * multiplier) as u64)
}

/// Render a byte count as `"N B"` or with one decimal in the largest binary unit.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

/// Lexically clean a client supplied relative path.
///
/// Backslashes count as separators, empty and `.` segments are dropped and
/// `..` pops the previous segment. Leading separators are ignored so the
/// result is always relative. Returns the remaining segments; a leading `..`
/// survives when the path climbs above its starting point.
pub fn clean_relative_path(raw: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();

    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push("..".to_string()),
            },
            other => parts.push(other.to_string()),
        }
    }

    parts
}
