//! Idempotent metadata directory provisioning.

use std::io::ErrorKind;

use crate::context::RunContext;
use crate::error::{metadata_io, MetadataError};

/// What [`ensure_metadata_dir`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyPresent,
}

impl Provisioned {
    pub fn created(self) -> bool {
        matches!(self, Provisioned::Created)
    }
}

/// Make sure `<repo_dir>/.github` exists as a directory.
///
/// An existing directory is left untouched. Only a single level is created:
/// the repository directory itself must already exist. A file (or anything
/// else that is not a directory) at the path is an error, never replaced.
pub fn ensure_metadata_dir(ctx: &RunContext) -> Result<Provisioned, MetadataError> {
    let meta = ctx.meta_dir();
    if plan_metadata_dir(ctx)? == Provisioned::AlreadyPresent {
        tracing::debug!(candidate = %ctx.candidate(), "metadata directory already present");
        return Ok(Provisioned::AlreadyPresent);
    }

    match std::fs::create_dir(meta) {
        Ok(()) => {
            tracing::debug!(candidate = %ctx.candidate(), path = %meta.display(), "created metadata directory");
            Ok(Provisioned::Created)
        }
        // Lost a race with another writer; fine as long as it is a directory.
        Err(e) if e.kind() == ErrorKind::AlreadyExists && meta.is_dir() => {
            Ok(Provisioned::AlreadyPresent)
        }
        Err(e) => Err(metadata_io(meta, e)),
    }
}

/// Report what [`ensure_metadata_dir`] would do, without touching disk.
pub fn plan_metadata_dir(ctx: &RunContext) -> Result<Provisioned, MetadataError> {
    let meta = ctx.meta_dir();
    match std::fs::metadata(meta) {
        Ok(md) if md.is_dir() => Ok(Provisioned::AlreadyPresent),
        Ok(_) => Err(MetadataError::NotADirectory {
            path: meta.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Provisioned::Created),
        Err(e) => Err(metadata_io(meta, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
