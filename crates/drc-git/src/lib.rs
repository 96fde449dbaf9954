//! `git clone` backed [`RepositoryFetcher`](drc_core::fetch::RepositoryFetcher).
//!
//! Each fetch clones into `<work_root>/<stack identifier>` and reads the
//! manifest from the root of the checkout. The clone runs as a child process
//! bounded by the request timeout.

mod fetcher;
mod workspace;

pub use fetcher::GitFetcher;
pub use workspace::workspace_dir;
