use crate::plan::base_filename;

/// Source formats accepted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Object keys are opaque strings: the extension is whatever follows the
    /// last `.` of the final `/`-separated component.
    pub fn from_key(key: &str) -> Option<Self> {
        let ext = extension(key)?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpg),
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Webp => "WebP",
        }
    }
}

/// Text after the last `.` of the key's file name, if there is one.
pub fn extension(key: &str) -> Option<&str> {
    let name = base_filename(key);
    name.rfind('.').map(|idx| &name[idx + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_any_case() {
        assert_eq!(ImageFormat::from_key("uploads/a.jpg"), Some(ImageFormat::Jpg));
        assert_eq!(ImageFormat::from_key("uploads/a.JPEG"), Some(ImageFormat::Jpg));
        assert_eq!(ImageFormat::from_key("uploads/a.Png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_key("uploads/a.webp"), Some(ImageFormat::Webp));
    }

    #[test]
    fn test_unsupported_extensions() {
        assert_eq!(ImageFormat::from_key("uploads/a.gif"), None);
        assert_eq!(ImageFormat::from_key("uploads/a.bmp"), None);
        assert_eq!(ImageFormat::from_key("uploads/README"), None);
        assert_eq!(ImageFormat::from_key("uploads/"), None);
        assert_eq!(ImageFormat::from_key("uploads/x.png/"), None);
        assert_eq!(ImageFormat::from_key("uploads/x.png/."), None);
        assert_eq!(ImageFormat::from_key("uploads/x."), None);
    }

    #[test]
    fn test_dotfile_name_has_extension() {
        assert_eq!(extension("uploads/.png"), Some("png"));
        assert_eq!(ImageFormat::from_key("uploads/.png"), Some(ImageFormat::Png));
    }

    #[test]
    fn test_extension_uses_final_component_only() {
        assert_eq!(extension("uploads/v1.2/photo"), None);
        assert_eq!(extension("uploads/v1.2/photo.jpg"), Some("jpg"));
    }
}
