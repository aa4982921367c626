//! Project identity detection.
//!
//! A digest is scoped to one project, named by a [`ProjectIdentity`]: the
//! repository name (shared by every clone and worktree) and the folder the
//! session was started in.
//!
//! # Overview
//!
//! The detector uses git2 to discover the repository containing a path and
//! takes the repository name from its remotes. It handles edge cases
//! gracefully:
//!
//! - Non-git directories (repository name `unknown`, so no digest is built)
//! - Repositories without remotes (top-level directory name)
//! - Git worktrees (resolve to the main repository's remotes)
//! - Credentials in remote URLs (stripped before anything is logged)
//!
//! # Example
//!
//! ```rust,ignore
//! use faildigest::context::resolve_identity;
//! use std::path::Path;
//!
//! let identity = resolve_identity(Path::new("/work/api-feature"));
//! println!("Repo: {} | Folder: {}", identity.repo_name, identity.folder_name);
//! ```
//!
//! [`ProjectIdentity`]: crate::models::ProjectIdentity

mod detector;

pub use detector::{GitContext, resolve_identity, resolve_identity_from_cwd};
