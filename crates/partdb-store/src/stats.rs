use serde::Serialize;

/// Storage usage snapshot. Sizes count two bytes per UTF-16 code unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub component_count: usize,
    pub component_data_size: u64,
    pub component_data_size_formatted: String,
    pub total_used: u64,
    pub total_used_formatted: String,
    pub limit: u64,
    pub limit_formatted: String,
    pub percent_used: f64,
    pub last_updated: Option<String>,
}

impl StorageStats {
    pub(crate) fn empty(limit: u64) -> Self {
        Self {
            component_count: 0,
            component_data_size: 0,
            component_data_size_formatted: format_bytes(0),
            total_used: 0,
            total_used_formatted: format_bytes(0),
            limit,
            limit_formatted: format_bytes(limit),
            percent_used: 0.0,
            last_updated: None,
        }
    }
}

/// "0 B", or the value in the largest fitting unit with two decimals.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const SIZES: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let bytes = bytes as f64;
    let i = ((bytes.ln() / 1024f64.ln()).floor() as usize).min(SIZES.len() - 1);
    format!("{:.2} {}", bytes / 1024f64.powi(i as i32), SIZES[i])
}
