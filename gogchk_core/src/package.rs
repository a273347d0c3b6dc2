/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::package
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Model one inventory unit (title or add-on): read its variant
    directories into per-platform version sets and reconcile them
    against catalog data.

  Security / Safety Notes:
    Read-only directory enumeration; network access is delegated
    to the Catalog implementation supplied by the caller.

  Dependencies:
    serde for report serialisation.

  Operational Scope:
    Built by title scans; consumed by the reporter.

  Revision History:
    2025-11-12 COD  Split local scan from catalog reconciliation.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Immutable records returned fully reconciled
    - Ownership gate: unowned platforms are never flagged
============================================================*/

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogRecord};
use crate::error::{GogchkError, Result};
use crate::naming::{self, Platform, VersionTag};

/// Version tags grouped by platform; platforms without tags are absent.
pub type VersionSets = BTreeMap<Platform, BTreeSet<VersionTag>>;

/// Local facts about a package directory, before any catalog lookup.
#[derive(Debug, Clone)]
pub struct LocalPackage {
    slug: String,
    id: String,
    path: PathBuf,
    has_installer: bool,
    local_versions: VersionSets,
}

impl LocalPackage {
    /// Read `<parent>/<dir_name>` and classify its variant directories.
    pub fn scan(parent: &Path, dir_name: &str) -> Result<Self> {
        let (slug, id) = naming::decode_identity(dir_name)?;
        let path = parent.join(dir_name);

        let mut has_installer = false;
        let mut local_versions = VersionSets::new();
        for name in list_entries(&path)? {
            if naming::is_reserved(&name) {
                continue;
            }
            has_installer = true;
            let platform =
                Platform::from_variant_dir(&name).ok_or_else(|| GogchkError::UnknownVariant {
                    variant: name.clone(),
                    slug: slug.clone(),
                })?;
            local_versions
                .entry(platform)
                .or_default()
                .insert(VersionTag::from_dir_name(&name));
        }

        Ok(Self {
            slug,
            id,
            path,
            has_installer,
            local_versions,
        })
    }

    /// Human-readable slug decoded from the directory name.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Catalog id decoded from the directory name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Only packages holding at least one installer consult the catalog.
    pub fn needs_catalog(&self) -> bool {
        self.has_installer
    }

    /// Fetch catalog data when needed and reconcile.
    pub async fn resolve<C: Catalog>(self, catalog: &C) -> Result<PackageRecord> {
        if !self.needs_catalog() {
            return PackageRecord::reconcile(self, None);
        }
        let remote = catalog.fetch_catalog(&self.id).await?;
        PackageRecord::reconcile(self, Some(&remote))
    }
}

/// A fully reconciled inventory unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    slug: String,
    id: String,
    path: PathBuf,
    has_installer: bool,
    local_versions: VersionSets,
    remote_versions: VersionSets,
    updates: BTreeSet<Platform>,
}

impl PackageRecord {
    /// Scan `<parent>/<dir_name>` and reconcile it against `catalog`.
    pub async fn build<C: Catalog>(parent: &Path, dir_name: &str, catalog: &C) -> Result<Self> {
        LocalPackage::scan(parent, dir_name)?.resolve(catalog).await
    }

    /// Combine local facts with catalog data.
    ///
    /// `remote` is ignored for packages without installers. Remote tags
    /// already held locally are removed; a platform is flagged only when
    /// it is owned locally and some remote tag remains.
    pub fn reconcile(local: LocalPackage, remote: Option<&CatalogRecord>) -> Result<Self> {
        let remote = match remote {
            Some(record) if local.has_installer => record,
            _ => return Ok(Self::without_updates(local)),
        };
        if remote.slug != local.slug {
            return Err(GogchkError::IdentityMismatch {
                id: local.id,
                local: local.slug,
                remote: remote.slug.clone(),
            });
        }

        let mut remote_versions = fold_installers(remote);
        for (platform, owned) in &local.local_versions {
            if let Some(tags) = remote_versions.get_mut(platform) {
                tags.retain(|tag| !owned.contains(tag));
            }
        }
        remote_versions.retain(|_, tags| !tags.is_empty());

        let updates = remote_versions
            .keys()
            .copied()
            .filter(|platform| local.local_versions.contains_key(platform))
            .collect();

        Ok(Self {
            slug: local.slug,
            id: local.id,
            path: local.path,
            has_installer: local.has_installer,
            local_versions: local.local_versions,
            remote_versions,
            updates,
        })
    }

    fn without_updates(local: LocalPackage) -> Self {
        Self {
            slug: local.slug,
            id: local.id,
            path: local.path,
            has_installer: local.has_installer,
            local_versions: local.local_versions,
            remote_versions: VersionSets::new(),
            updates: BTreeSet::new(),
        }
    }

    /// Human-readable slug decoded from the directory name.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Catalog id decoded from the directory name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Location of the package directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when at least one non-reserved entry sits in the package directory.
    pub fn has_installer(&self) -> bool {
        self.has_installer
    }

    /// Variant tags held locally for `platform`.
    pub fn local_versions(&self, platform: Platform) -> Option<&BTreeSet<VersionTag>> {
        self.local_versions.get(&platform)
    }

    /// Catalog tags not held locally, including unowned platforms.
    pub fn remote_versions(&self, platform: Platform) -> Option<&BTreeSet<VersionTag>> {
        self.remote_versions.get(&platform)
    }

    /// True when `platform` is owned locally and the catalog lists a newer tag.
    pub fn update_available(&self, platform: Platform) -> bool {
        self.updates.contains(&platform)
    }

    /// True when any platform has an update.
    pub fn any_update(&self) -> bool {
        !self.updates.is_empty()
    }

    /// New tags for every flagged platform.
    pub fn new_versions(&self) -> impl Iterator<Item = (Platform, &BTreeSet<VersionTag>)> {
        self.updates.iter().filter_map(|platform| {
            self.remote_versions
                .get(platform)
                .map(|tags| (*platform, tags))
        })
    }
}

fn fold_installers(record: &CatalogRecord) -> VersionSets {
    let mut sets = VersionSets::new();
    for installer in &record.installers {
        let version = naming::sanitize(installer.version.as_deref());
        sets.entry(installer.os)
            .or_default()
            .insert(naming::make_version_tag(&version, installer.os));
    }
    sets
}

/// Names of the direct children of `path`.
pub(crate) fn list_entries(path: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(path).map_err(|err| {
        GogchkError::Filesystem(format!("Failed to read directory {}: {err}", path.display()))
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            GogchkError::Filesystem(format!("Failed to read entry in {}: {err}", path.display()))
        })?;
        let name = entry.file_name().into_string().map_err(|raw| {
            GogchkError::MalformedName {
                name: raw.to_string_lossy().into_owned(),
            }
        })?;
        names.push(name);
    }
    Ok(names)
}
