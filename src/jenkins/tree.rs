//! Job tree walker.
//!
//! Expands a folder-structured job listing into a flat list of leaf jobs,
//! depth-first, in the order first encountered. A listing failure at any
//! folder downgrades that folder to zero children and the walk continues.

use super::{JobListing, JobRef};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Collect every leaf job reachable from the server root.
pub fn collect_jobs(listing: &dyn JobListing) -> Vec<JobRef> {
    let mut jobs = Vec::new();
    let mut visited_folders = HashSet::new();
    let mut seen_urls = HashSet::new();
    walk(listing, "", &mut visited_folders, &mut seen_urls, &mut jobs);
    debug!(count = jobs.len(), "Job tree walk complete");
    jobs
}

fn walk(
    listing: &dyn JobListing,
    folder_path: &str,
    visited_folders: &mut HashSet<String>,
    seen_urls: &mut HashSet<String>,
    jobs: &mut Vec<JobRef>,
) {
    // The upstream hierarchy is a tree, but malformed data could produce a
    // self-referential URL; skip any folder path already expanded.
    if !visited_folders.insert(folder_path.to_string()) {
        warn!(folder_path, "Skipping already-visited folder");
        return;
    }

    let children = match listing.list_children(folder_path) {
        Ok(children) => children,
        Err(e) => {
            warn!(folder_path, error = %e, "Folder listing failed; treating as empty");
            return;
        }
    };

    for child in children {
        if child.is_folder() {
            let child_path = listing.relativize(&child.url);
            walk(listing, &child_path, visited_folders, seen_urls, jobs);
        } else if seen_urls.insert(child.url.clone()) {
            jobs.push(child);
        }
    }
}
