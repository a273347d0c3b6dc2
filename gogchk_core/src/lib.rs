/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Update-detection engine for installer collections kept under
    the backtick naming scheme: directory parsing, per-platform
    version reconciliation, and title/add-on reporting.

  Security / Safety Notes:
    Read-only access to the collection; HTTPS GET only.

  Dependencies:
    See module headers.

  Operational Scope:
    Linked by the `gogchk-core` binary.

  Revision History:
    2025-11-12 COD  Split library from binary entry point.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Construction separated from output
    - Explicit error taxonomy
============================================================*/

pub mod catalog;
pub mod config;
pub mod error;
pub mod logger;
pub mod naming;
pub mod package;
pub mod report;
pub mod scanner;
pub mod title;
