//! Rolls a [`SliceError`] up into an `anyhow::Error`. `SliceError`'s own
//! `Display` already renders the kind and the originating object id
//! (`"configuration error (table foo): ..."`), which is exactly the single
//! line §7 asks user-visible output to carry — this just lifts it into the
//! `anyhow` chain the CLI reports through.

use slicedb_errors::SliceError;

pub fn into_anyhow(err: SliceError) -> anyhow::Error {
    anyhow::Error::new(err)
}
