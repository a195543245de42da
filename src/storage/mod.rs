//! Persistence is organized through [blob_store::FileBlobStore].
//! The basic idea is:
//!  - State lives in named slots under the application directory.
//!  - Each slot holds a single JSON document, rewritten whole after a mutation.
//!  - A missing slot reads as nothing; corrupt contents are recovered by the
//!    callers that parse them.

pub mod blob_store;
