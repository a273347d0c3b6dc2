/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::title
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Compose a title record with the add-on records discovered in
    its reserved `dlc folder.

  Security / Safety Notes:
    Read-only directory enumeration.

  Dependencies:
    None beyond crate modules.

  Operational Scope:
    Built by the collection scanner, one per title directory.

  Revision History:
    2025-11-12 COD  Introduced title/add-on composition.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Composition over specialisation
    - Add-on failures abort the owning title
============================================================*/

use std::path::Path;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::naming::{self, ADDONS_DIR};
use crate::package::{list_entries, LocalPackage, PackageRecord};

/// Local facts for a title and its add-ons.
#[derive(Debug, Clone)]
pub struct LocalTitle {
    pub record: LocalPackage,
    pub addons: Vec<LocalPackage>,
}

impl LocalTitle {
    /// Scan `<root>/<dir_name>` and every add-on beneath its `dlc folder.
    pub fn scan(root: &Path, dir_name: &str) -> Result<Self> {
        let record = LocalPackage::scan(root, dir_name)?;
        let addons_path = root.join(dir_name).join(ADDONS_DIR);

        let mut addons = Vec::new();
        if addons_path.is_dir() {
            for name in list_entries(&addons_path)? {
                if naming::is_reserved(&name) {
                    continue;
                }
                addons.push(LocalPackage::scan(&addons_path, &name)?);
            }
        }

        Ok(Self { record, addons })
    }

    /// Resolve the title, then each add-on in order.
    pub async fn resolve<C: Catalog>(self, catalog: &C) -> Result<Title> {
        let record = self.record.resolve(catalog).await?;
        let mut addons = Vec::with_capacity(self.addons.len());
        for addon in self.addons {
            addons.push(addon.resolve(catalog).await?);
        }
        Ok(Title { record, addons })
    }
}

/// A reconciled title owning its add-ons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    record: PackageRecord,
    addons: Vec<PackageRecord>,
}

impl Title {
    /// Scan `<root>/<dir_name>` with its add-ons and reconcile them all.
    pub async fn build<C: Catalog>(root: &Path, dir_name: &str, catalog: &C) -> Result<Self> {
        LocalTitle::scan(root, dir_name)?.resolve(catalog).await
    }

    pub(crate) fn from_parts(record: PackageRecord, addons: Vec<PackageRecord>) -> Self {
        Self { record, addons }
    }

    /// The title's own package record.
    pub fn record(&self) -> &PackageRecord {
        &self.record
    }

    /// Add-ons in directory enumeration order.
    pub fn addons(&self) -> &[PackageRecord] {
        &self.addons
    }

    /// True when the title or any add-on has an update.
    pub fn needs_attention(&self) -> bool {
        self.record.any_update() || self.addons.iter().any(PackageRecord::any_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GogchkError;
    use crate::naming::Platform;
    use crate::package::tests::{make_package, product, FakeCatalog};

    #[tokio::test]
    async fn discovers_addons_and_skips_reserved_entries() {
        let root = tempfile::tempdir().unwrap();
        let title = make_package(root.path(), "game`1", &["1.0`win"]);
        let addons = title.join(ADDONS_DIR);
        make_package(&addons, "game_soundtrack`2", &["1.0`win"]);
        make_package(&addons, "`artwork", &[]);

        let catalog = FakeCatalog::with(vec![
            ("1", product("game", &[(Some("1.0"), Platform::Windows)])),
            (
                "2",
                product("game_soundtrack", &[(Some("1.1"), Platform::Windows)]),
            ),
        ]);

        let title = Title::build(root.path(), "game`1", &catalog).await.unwrap();

        assert_eq!(title.addons().len(), 1);
        let addon = &title.addons()[0];
        assert_eq!(addon.slug(), "game_soundtrack");
        assert_eq!(addon.id(), "2");
        assert!(addon.update_available(Platform::Windows));
        assert!(!title.record().any_update());
        assert!(title.needs_attention());
    }

    #[tokio::test]
    async fn title_without_addons_folder_has_no_addons() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "game`1", &[]);

        let title = Title::build(root.path(), "game`1", &FakeCatalog::default())
            .await
            .unwrap();

        assert!(title.addons().is_empty());
        assert!(!title.needs_attention());
    }

    #[test]
    fn addon_failure_aborts_title() {
        let root = tempfile::tempdir().unwrap();
        let title = make_package(root.path(), "game`1", &["1.0`win"]);
        make_package(&title.join(ADDONS_DIR), "broken_dlc`3", &["1.0`amiga"]);

        let err = LocalTitle::scan(root.path(), "game`1").unwrap_err();

        assert!(matches!(
            err,
            GogchkError::UnknownVariant { ref slug, .. } if slug == "broken_dlc"
        ));
    }

    #[test]
    fn malformed_addon_name_aborts_title() {
        let root = tempfile::tempdir().unwrap();
        let title = make_package(root.path(), "game`1", &[]);
        make_package(&title.join(ADDONS_DIR), "readme", &[]);

        let err = LocalTitle::scan(root.path(), "game`1").unwrap_err();

        assert!(matches!(err, GogchkError::MalformedName { ref name } if name == "readme"));
    }
}
