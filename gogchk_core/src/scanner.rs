/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::scanner
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Walk a collection root, scan every title directory, and
    reconcile all owned packages against the catalog.

  Security / Safety Notes:
    Read-only traversal; catalog requests are bounded by a
    semaphore to avoid hammering the public API.

  Dependencies:
    tokio (JoinSet, Semaphore) for bounded concurrent lookups.

  Operational Scope:
    Invoked once per run by the entry point. Fail-fast unless
    keep-going diagnostics are requested.

  Revision History:
    2025-11-12 COD  Implemented two-phase collection scan.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Output order independent of fetch completion order
    - First failure cancels outstanding lookups
============================================================*/

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::catalog::Catalog;
use crate::error::{GogchkError, Result};
use crate::logger::Logger;
use crate::naming;
use crate::package::{list_entries, LocalPackage, PackageRecord};
use crate::title::{LocalTitle, Title};

/// Tunables for a collection scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_parallel_requests: usize,
    /// Record per-title failures instead of aborting the scan.
    pub keep_going: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_parallel_requests: 4,
            keep_going: false,
        }
    }
}

/// A title dropped from the collection in keep-going mode.
#[derive(Debug)]
pub struct ScanFailure {
    pub directory: String,
    pub error: GogchkError,
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub titles: Vec<Title>,
    pub failures: Vec<ScanFailure>,
}

/// Per-title reconciliation slots; index 0 is the title, the rest add-ons.
struct Slots {
    directory: String,
    packages: Vec<Option<PackageRecord>>,
    error: Option<GogchkError>,
}

/// Scan every non-reserved directory under `root` as a title.
pub async fn scan<C: Catalog>(
    root: &Path,
    catalog: &C,
    options: &ScanOptions,
    logger: &Logger,
) -> Result<ScanOutcome> {
    let mut names = list_entries(root)?;
    names.sort();

    let mut outcome = ScanOutcome::default();
    let mut locals = Vec::new();
    for name in names {
        if naming::is_reserved(&name) {
            logger.debug("SCAN", format!("Skipping reserved entry [{name}]"));
            continue;
        }
        logger.info("TITLE", format!("Found title [{name}]"));
        match LocalTitle::scan(root, &name) {
            Ok(local) => {
                for addon in &local.addons {
                    logger.info(
                        "ADDON",
                        format!("Found add-on [{}] under [{name}]", addon.slug()),
                    );
                }
                locals.push((name, local));
            }
            Err(error) if options.keep_going => {
                logger.warn("TITLE", format!("Skipping [{name}]: {error}"));
                outcome.failures.push(ScanFailure {
                    directory: name,
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    let slots = reconcile_all(locals, catalog, options, logger).await?;
    for slot in slots {
        if let Some(error) = slot.error {
            logger.warn("TITLE", format!("Skipping [{}]: {error}", slot.directory));
            outcome.failures.push(ScanFailure {
                directory: slot.directory,
                error,
            });
            continue;
        }
        let mut packages = slot.packages.into_iter();
        let record = packages.next().flatten().ok_or_else(|| missing(&slot.directory))?;
        let addons = packages
            .map(|addon| addon.ok_or_else(|| missing(&slot.directory)))
            .collect::<Result<Vec<_>>>()?;
        outcome.titles.push(Title::from_parts(record, addons));
    }

    logger.info(
        "SCAN",
        format!(
            "Scanned {} titles ({} failed)",
            outcome.titles.len(),
            outcome.failures.len()
        ),
    );
    Ok(outcome)
}

async fn reconcile_all<C: Catalog>(
    locals: Vec<(String, LocalTitle)>,
    catalog: &C,
    options: &ScanOptions,
    logger: &Logger,
) -> Result<Vec<Slots>> {
    let semaphore = Arc::new(Semaphore::new(options.max_parallel_requests.max(1)));
    let mut tasks: JoinSet<(usize, usize, Result<PackageRecord>)> = JoinSet::new();
    let mut slots = Vec::with_capacity(locals.len());

    for (title_idx, (directory, local)) in locals.into_iter().enumerate() {
        let packages: Vec<LocalPackage> = std::iter::once(local.record).chain(local.addons).collect();
        let mut slot = Slots {
            directory,
            packages: vec![None; packages.len()],
            error: None,
        };
        for (pkg_idx, package) in packages.into_iter().enumerate() {
            if !package.needs_catalog() {
                slot.packages[pkg_idx] = Some(PackageRecord::reconcile(package, None)?);
                continue;
            }
            let catalog = catalog.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let resolved = match semaphore.acquire_owned().await {
                    Ok(_permit) => package.resolve(&catalog).await,
                    Err(_) => Err(GogchkError::Runtime("Catalog semaphore closed".into())),
                };
                (title_idx, pkg_idx, resolved)
            });
        }
        slots.push(slot);
    }

    while let Some(joined) = tasks.join_next().await {
        let (title_idx, pkg_idx, resolved) = joined
            .map_err(|err| GogchkError::Runtime(format!("Catalog task failed: {err}")))?;
        let slot = &mut slots[title_idx];
        match resolved {
            Ok(record) => {
                logger.debug(
                    "FETCH",
                    format!("{} `{}` reconciled", record.slug(), record.id()),
                );
                slot.packages[pkg_idx] = Some(record);
            }
            Err(error) if options.keep_going => {
                if slot.error.is_none() {
                    slot.error = Some(error);
                }
            }
            Err(error) => {
                tasks.abort_all();
                return Err(error);
            }
        }
    }

    Ok(slots)
}

fn missing(directory: &str) -> GogchkError {
    GogchkError::Runtime(format!("Reconciliation incomplete for [{directory}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecord;
    use crate::naming::{Platform, ADDONS_DIR};
    use crate::package::tests::{make_package, product, FakeCatalog};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn logger() -> Logger {
        Logger::stderr_only(false)
    }

    /// Catalog answering each id after a fixed delay; unknown ids are 404s.
    #[derive(Clone)]
    struct DelayedCatalog {
        entries: Arc<HashMap<String, (Duration, Option<CatalogRecord>)>>,
        completed: Arc<AtomicUsize>,
    }

    impl DelayedCatalog {
        fn with(entries: Vec<(&str, u64, Option<CatalogRecord>)>) -> Self {
            Self {
                entries: Arc::new(
                    entries
                        .into_iter()
                        .map(|(id, millis, record)| {
                            (id.to_string(), (Duration::from_millis(millis), record))
                        })
                        .collect(),
                ),
                completed: Arc::default(),
            }
        }

        fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }
    }

    impl Catalog for DelayedCatalog {
        async fn fetch_catalog(&self, id: &str) -> Result<CatalogRecord> {
            let (delay, record) = self
                .entries
                .get(id)
                .cloned()
                .unwrap_or((Duration::ZERO, None));
            tokio::time::sleep(delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            record.ok_or_else(|| GogchkError::NotFound { id: id.to_string() })
        }
    }

    #[tokio::test]
    async fn output_order_ignores_fetch_completion_order() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "alpha`1", &["1.0`win"]);
        make_package(root.path(), "beta`2", &["1.0`win"]);
        let catalog = DelayedCatalog::with(vec![
            (
                "1",
                300,
                Some(product("alpha", &[(Some("2.0"), Platform::Windows)])),
            ),
            (
                "2",
                0,
                Some(product("beta", &[(Some("2.0"), Platform::Windows)])),
            ),
        ]);

        let outcome = scan(root.path(), &catalog, &ScanOptions::default(), &logger())
            .await
            .unwrap();

        let slugs: Vec<&str> = outcome.titles.iter().map(|t| t.record().slug()).collect();
        assert_eq!(slugs, vec!["alpha", "beta"]);
        assert_eq!(catalog.completed(), 2);
    }

    #[tokio::test]
    async fn failure_cancels_outstanding_fetches() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "alpha`1", &["1.0`win"]);
        make_package(root.path(), "beta`2", &["1.0`win"]);
        let catalog = DelayedCatalog::with(vec![
            (
                "1",
                2_000,
                Some(product("alpha", &[(Some("2.0"), Platform::Windows)])),
            ),
            ("2", 50, None),
        ]);

        let err = scan(root.path(), &catalog, &ScanOptions::default(), &logger())
            .await
            .unwrap_err();
        assert!(matches!(err, GogchkError::NotFound { ref id } if id == "2"));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(catalog.completed(), 1);
    }

    #[tokio::test]
    async fn scans_titles_in_name_order_and_skips_reserved() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "zeta`3", &["1.0`win"]);
        make_package(root.path(), "alpha`1", &["1.0`linux"]);
        make_package(root.path(), "`incoming", &["whatever"]);
        let catalog = FakeCatalog::with(vec![
            ("1", product("alpha", &[(Some("2.0"), Platform::Linux)])),
            ("3", product("zeta", &[(Some("1.0"), Platform::Windows)])),
        ]);

        let outcome = scan(root.path(), &catalog, &ScanOptions::default(), &logger())
            .await
            .unwrap();

        let slugs: Vec<&str> = outcome.titles.iter().map(|t| t.record().slug()).collect();
        assert_eq!(slugs, vec!["alpha", "zeta"]);
        assert!(outcome.titles[0].record().update_available(Platform::Linux));
        assert!(!outcome.titles[1].record().any_update());
        assert!(outcome.failures.is_empty());
        assert_eq!(catalog.call_count(), 2);
    }

    #[tokio::test]
    async fn addons_keep_their_title() {
        let root = tempfile::tempdir().unwrap();
        let title = make_package(root.path(), "game`1", &[]);
        make_package(&title.join(ADDONS_DIR), "game_dlc`2", &["1.0`osx"]);
        let catalog = FakeCatalog::with(vec![(
            "2",
            product("game_dlc", &[(Some("1.5"), Platform::MacOs)]),
        )]);

        let outcome = scan(root.path(), &catalog, &ScanOptions::default(), &logger())
            .await
            .unwrap();

        assert_eq!(outcome.titles.len(), 1);
        let title = &outcome.titles[0];
        assert!(!title.record().has_installer());
        assert_eq!(title.addons().len(), 1);
        assert!(title.addons()[0].update_available(Platform::MacOs));
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn first_failure_aborts_scan() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "alpha`1", &["1.0`win"]);
        make_package(root.path(), "beta`2", &["1.0`win"]);
        let catalog = FakeCatalog::with(vec![(
            "1",
            product("alpha", &[(Some("1.0"), Platform::Windows)]),
        )]);

        let err = scan(root.path(), &catalog, &ScanOptions::default(), &logger())
            .await
            .unwrap_err();

        assert!(matches!(err, GogchkError::NotFound { ref id } if id == "2"));
    }

    #[tokio::test]
    async fn local_failure_aborts_before_any_fetch() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "alpha`1", &["1.0`win"]);
        make_package(root.path(), "beta`2", &["1.0_beos"]);
        let catalog = FakeCatalog::with(vec![(
            "1",
            product("alpha", &[(Some("1.0"), Platform::Windows)]),
        )]);

        let err = scan(root.path(), &catalog, &ScanOptions::default(), &logger())
            .await
            .unwrap_err();

        assert!(matches!(err, GogchkError::UnknownVariant { .. }));
        assert_eq!(catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn keep_going_collects_failures_per_title() {
        let root = tempfile::tempdir().unwrap();
        make_package(root.path(), "alpha`1", &["1.0`win"]);
        make_package(root.path(), "beta`2", &["1.0`win"]);
        make_package(root.path(), "gamma`3", &["1.0_beos"]);
        make_package(root.path(), "not-a-package", &[]);
        let catalog = FakeCatalog::with(vec![(
            "1",
            product("alpha", &[(Some("1.1"), Platform::Windows)]),
        )]);
        let options = ScanOptions {
            keep_going: true,
            ..ScanOptions::default()
        };

        let outcome = scan(root.path(), &catalog, &options, &logger())
            .await
            .unwrap();

        assert_eq!(outcome.titles.len(), 1);
        assert_eq!(outcome.titles[0].record().slug(), "alpha");
        let mut failed: Vec<&str> = outcome
            .failures
            .iter()
            .map(|f| f.directory.as_str())
            .collect();
        failed.sort();
        assert_eq!(failed, vec!["beta`2", "gamma`3", "not-a-package"]);
    }

    #[tokio::test]
    async fn missing_root_is_a_filesystem_error() {
        let root = tempfile::tempdir().unwrap();
        let err = scan(
            &root.path().join("absent"),
            &FakeCatalog::default(),
            &ScanOptions::default(),
            &logger(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GogchkError::Filesystem(_)));
    }
}
