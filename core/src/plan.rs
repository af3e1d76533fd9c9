use crate::config::{
    ProcessingConfig, RenditionTarget, MEDIUM_QUALITY, MEDIUM_WIDTH, SMALL_QUALITY, SMALL_WIDTH,
};

/// Text after the last `/` of an object key (`uploads/2024/a.png` -> `a.png`).
/// A key ending in `/` has an empty file name.
pub fn base_filename(key: &str) -> &str {
    match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}

/// Join a directory prefix and a file name with exactly one separator.
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Renditions for one upload, always in the order small, medium, original.
pub fn build_targets(config: &ProcessingConfig, base_filename: &str) -> Vec<RenditionTarget> {
    vec![
        RenditionTarget {
            name: "small",
            output_path: join_key(&config.small_dir, base_filename),
            width: SMALL_WIDTH,
            quality: SMALL_QUALITY,
            is_passthrough: false,
        },
        RenditionTarget {
            name: "medium",
            output_path: join_key(&config.medium_dir, base_filename),
            width: MEDIUM_WIDTH,
            quality: MEDIUM_QUALITY,
            is_passthrough: false,
        },
        RenditionTarget {
            name: "original",
            output_path: join_key(&config.original_dir, base_filename),
            width: 0,
            quality: 0,
            is_passthrough: true,
        },
    ]
}
