//! Kubernetes resource quantity conversions used by the usage report.

/// Convert a CPU quantity (`250m`, `2`, `1500000n`, `500u`) to millicores.
/// Empty or unparsable values count as zero.
pub fn cpu_to_millicores(quantity: &str) -> f64 {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return 0.0;
    }
    let (number, scale) = if let Some(value) = quantity.strip_suffix('n') {
        (value, 1e-6)
    } else if let Some(value) = quantity.strip_suffix('u') {
        (value, 1e-3)
    } else if let Some(value) = quantity.strip_suffix('m') {
        (value, 1.0)
    } else {
        (quantity, 1000.0)
    };
    number.parse::<f64>().map(|n| n * scale).unwrap_or(0.0)
}

const MEMORY_SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1.0 / 1024.0),
    ("Mi", 1.0),
    ("Gi", 1024.0),
    ("Ti", 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0),
    ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("k", 1e3 / MIB),
    ("M", 1e6 / MIB),
    ("G", 1e9 / MIB),
    ("T", 1e12 / MIB),
    ("P", 1e15 / MIB),
    ("E", 1e18 / MIB),
];

const MIB: f64 = 1024.0 * 1024.0;

/// Convert a memory quantity (`128Mi`, `1Gi`, `512Ki`, `1G`, `1e3`, bare bytes) to MiB.
/// Empty or unparsable values count as zero.
pub fn memory_to_mib(quantity: &str) -> f64 {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return 0.0;
    }
    for (suffix, scale) in MEMORY_SUFFIXES {
        if let Some(number) = quantity.strip_suffix(suffix) {
            return number.parse::<f64>().map(|n| n * scale).unwrap_or(0.0);
        }
    }
    quantity.parse::<f64>().map(|bytes| bytes / MIB).unwrap_or(0.0)
}
