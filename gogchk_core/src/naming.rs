/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::naming
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Encode and decode the backtick directory naming scheme:
    package identities, installer variant tags, and the
    reserved prefix that hides non-package folders.

  Security / Safety Notes:
    Pure string handling; no I/O performed in this module.

  Dependencies:
    serde for serialising platforms and tags into reports.

  Operational Scope:
    Used by local scans to classify variant directories and by
    reconciliation to build comparable tags from catalog data.

  Revision History:
    2025-11-12 COD  Introduced naming codec and Platform enum.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Total mappings with explicit no-match branches
    - Clear data contracts between modules
============================================================*/

use std::fmt;

use serde::Serialize;

use crate::error::{GogchkError, Result};

/// Delimiter between name fields; as a leading character it marks a
/// reserved entry that inventory scans ignore.
pub const FIELD_SEPARATOR: char = '`';

/// Name of the per-title add-ons folder.
pub const ADDONS_DIR: &str = "`dlc";

/// Stand-in for a catalog installer without a version string.
pub const VERSION_PLACEHOLDER: &str = "_";

const FORBIDDEN_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];
const SUBSTITUTE: char = '_';

/// Operating systems an installer build can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
}

impl Platform {
    /// Every platform, in report order.
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::MacOs];

    /// Suffix used in variant directory names.
    pub fn suffix(self) -> &'static str {
        match self {
            Platform::Windows => "win",
            Platform::Linux => "linux",
            Platform::MacOs => "osx",
        }
    }

    /// Label used in console summaries.
    pub fn label(self) -> &'static str {
        match self {
            Platform::Windows => "Win",
            Platform::Linux => "Linux",
            Platform::MacOs => "OSX",
        }
    }

    /// Resolve a variant directory name such as ``1.0`win`` to its platform.
    pub fn from_variant_dir(name: &str) -> Option<Platform> {
        let (_, suffix) = name.rsplit_once(FIELD_SEPARATOR)?;
        Platform::ALL.into_iter().find(|p| p.suffix() == suffix)
    }

    /// Resolve the `os` field of a catalog installer entry.
    pub fn from_catalog_os(os: &str) -> Option<Platform> {
        match os {
            "windows" => Some(Platform::Windows),
            "linux" => Some(Platform::Linux),
            "osx" => Some(Platform::MacOs),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one installer build for one platform, e.g. ``2.0`win``.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    /// Tag text as used in directory names.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a variant directory name that already carries a platform suffix.
    pub(crate) fn from_dir_name(name: &str) -> Self {
        VersionTag(name.to_string())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a package directory name into `(slug, id)`.
pub fn decode_identity(dir_name: &str) -> Result<(String, String)> {
    let malformed = || GogchkError::MalformedName {
        name: dir_name.to_string(),
    };
    if dir_name.matches(FIELD_SEPARATOR).count() != 1 {
        return Err(malformed());
    }
    let (slug, id) = dir_name.split_once(FIELD_SEPARATOR).ok_or_else(malformed)?;
    if slug.is_empty() || id.is_empty() {
        return Err(malformed());
    }
    Ok((slug.to_string(), id.to_string()))
}

/// Make a raw catalog version safe for use in a directory name.
pub fn sanitize(raw_version: Option<&str>) -> String {
    match raw_version {
        None => VERSION_PLACEHOLDER.to_string(),
        Some(raw) => raw
            .chars()
            .map(|c| if FORBIDDEN_CHARS.contains(&c) { SUBSTITUTE } else { c })
            .collect(),
    }
}

/// Join a sanitised version and a platform suffix into a tag.
pub fn make_version_tag(sanitized_version: &str, platform: Platform) -> VersionTag {
    VersionTag(format!(
        "{sanitized_version}{FIELD_SEPARATOR}{}",
        platform.suffix()
    ))
}

/// True when the entry lives in the reserved namespace.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(FIELD_SEPARATOR)
}
