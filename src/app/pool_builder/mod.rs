// Pool builder - Discovers replacement candidates per segment index

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::adapters::toml_config::{AssetConfig, CandidateOrder};
use crate::domain::model::*;
use crate::error::{CueMixError, CueMixResult};

/// Scans `<root>/<1-based index>/*.<ext>` into candidate pools
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    extensions: Vec<String>,
    order: CandidateOrder,
}

impl PoolBuilder {
    pub fn new(extensions: Vec<String>, order: CandidateOrder) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        Self { extensions, order }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config.extensions.clone(), config.candidate_order)
    }

    /// Build pools from the immediate subdirectories of `root`.
    ///
    /// Directory `n` feeds segment `n - 1`. Names that are not positive
    /// integers are skipped with a warning.
    pub fn build(&self, root: &Path) -> CueMixResult<CandidatePools> {
        if !root.is_dir() {
            return Err(CueMixError::AssetRootNotFound {
                path: root.display().to_string(),
            });
        }

        let mut pools = CandidatePools::new();
        for entry in self.walk(root) {
            if !entry.file_type().is_dir() {
                debug!("Ignoring stray file {}", entry.path().display());
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(index) = Self::segment_index(&name) else {
                warn!(
                    "Skipping asset directory '{}': name is not a 1-based segment number",
                    name
                );
                continue;
            };

            let candidates = self.scan_pool(entry.path());
            if candidates.is_empty() {
                debug!("Asset directory '{}' holds no candidates", name);
                continue;
            }
            let mut pool = pools.get(index).map(<[Candidate]>::to_vec).unwrap_or_default();
            if !pool.is_empty() {
                warn!(
                    "Asset directory '{}' maps to segment {} which already has a pool; appending",
                    name,
                    index + 1
                );
            }
            pool.extend(candidates);
            pools.insert(index, pool);
        }

        info!(
            "Found {} candidate pools under {} (largest holds {})",
            pools.len(),
            root.display(),
            pools.max_pool_size()
        );
        Ok(pools)
    }

    /// `"3"` -> segment 2; `"0"`, `"+1"`, `" 1"`, `"intro"` -> none
    pub fn segment_index(name: &str) -> Option<usize> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match name.parse::<usize>() {
            Ok(n) if n > 0 => Some(n - 1),
            _ => None,
        }
    }

    fn scan_pool(&self, dir: &Path) -> Vec<Candidate> {
        self.walk(dir)
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(|path| self.accepts(path))
            .map(Candidate::new)
            .collect()
    }

    fn walk(&self, dir: &Path) -> impl Iterator<Item = DirEntry> {
        let walker = WalkDir::new(dir).min_depth(1).max_depth(1);
        let walker = match self.order {
            CandidateOrder::Name => walker.sort_by_file_name(),
            CandidateOrder::Listing => walker,
        };
        walker.into_iter().filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable asset entry: {}", e);
                None
            }
        })
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn builder() -> PoolBuilder {
        PoolBuilder::new(vec!["mp4".to_string()], CandidateOrder::Name)
    }

    #[test]
    fn test_segment_index() {
        assert_eq!(PoolBuilder::segment_index("1"), Some(0));
        assert_eq!(PoolBuilder::segment_index("12"), Some(11));
        assert_eq!(PoolBuilder::segment_index("0"), None);
        assert_eq!(PoolBuilder::segment_index("intro"), None);
        assert_eq!(PoolBuilder::segment_index("-2"), None);
        assert_eq!(PoolBuilder::segment_index("01"), Some(0));
    }

    #[test]
    fn test_segment_index_requires_plain_digits() {
        assert_eq!(PoolBuilder::segment_index("+1"), None);
        assert_eq!(PoolBuilder::segment_index(" 1"), None);
        assert_eq!(PoolBuilder::segment_index("1 "), None);
        assert_eq!(PoolBuilder::segment_index(""), None);
        assert_eq!(PoolBuilder::segment_index("１"), None);
    }

    #[test]
    fn test_signed_directory_name_is_not_a_pool() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("+1/a.mp4"));
        touch(&root.path().join("2/b.mp4"));

        let pools = builder().build(root.path()).unwrap();

        assert!(pools.get(0).is_none());
        assert_eq!(pools.get(1).unwrap().len(), 1);
    }

    #[test]
    fn test_listing_order_is_stable_across_scans() {
        let root = tempfile::tempdir().unwrap();
        for name in ["c.mp4", "a.mp4", "d.mp4", "b.mp4"] {
            touch(&root.path().join("1").join(name));
        }
        let listing = PoolBuilder::new(vec!["mp4".to_string()], CandidateOrder::Listing);

        let scan = || -> Vec<String> {
            let pools = listing.build(root.path()).unwrap();
            pools.get(0).unwrap().iter().map(Candidate::file_name).collect()
        };
        let first = scan();
        let second = scan();

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a.mp4", "b.mp4", "c.mp4", "d.mp4"]);

        // listing order is the directory's own order
        let raw: Vec<String> = fs::read_dir(root.path().join("1"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(first, raw);
    }

    #[test]
    fn test_build_pools_sorted_by_name() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("1/b.mp4"));
        touch(&root.path().join("1/a.MP4"));
        touch(&root.path().join("1/notes.txt"));
        touch(&root.path().join("3/only.mp4"));
        touch(&root.path().join("broll/ignored.mp4"));
        touch(&root.path().join("0/ignored.mp4"));
        touch(&root.path().join("readme.md"));

        let pools = builder().build(root.path()).unwrap();

        assert_eq!(pools.len(), 2);
        let first: Vec<String> = pools.get(0).unwrap().iter().map(Candidate::file_name).collect();
        assert_eq!(first, vec!["a.MP4", "b.mp4"]);
        assert_eq!(pools.get(2).unwrap().len(), 1);
        assert!(pools.get(1).is_none());
        assert_eq!(pools.max_pool_size(), 2);
    }

    #[test]
    fn test_empty_root_gives_no_pools() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("2")).unwrap();
        let pools = builder().build(root.path()).unwrap();
        assert!(pools.is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let err = builder().build(&root.path().join("absent")).unwrap_err();
        assert!(matches!(err, CueMixError::AssetRootNotFound { .. }));
        assert!(err.is_fatal());
    }
}
