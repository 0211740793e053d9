//! The document's extensions manifest.

use serde::{Deserialize, Serialize};

/// One entry of the top-level `extensions` map: where an extension schema
/// lives and which version of it the document uses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl Extension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Apply a version string; anything not of the form `<digit>.<digit>` is
    /// ignored.
    pub fn set_version(&mut self, version: &str) {
        if is_valid_version(version) {
            self.version = Some(version.to_string());
        }
    }

    pub fn set_version_parts(&mut self, major: u8, minor: u8) {
        if major < 10 && minor < 10 {
            self.version = Some(format!("{major}.{minor}"));
        }
    }
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_digit()
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_guard() {
        let mut extension = Extension::new();
        extension.set_version("1.x");
        assert_eq!(extension.version(), None);
        extension.set_version("10.1");
        assert_eq!(extension.version(), None);

        extension.set_version("1.1");
        assert_eq!(extension.version(), Some("1.1"));

        // an invalid value keeps the previous one
        extension.set_version("abc");
        assert_eq!(extension.version(), Some("1.1"));
    }

    #[test]
    fn test_version_parts() {
        let mut extension = Extension::new();
        extension.set_version_parts(12, 0);
        assert_eq!(extension.version(), None);
        extension.set_version_parts(2, 0);
        assert_eq!(extension.version(), Some("2.0"));
    }
}
