//! Vector index adapters

mod file_index;

pub use file_index::FileVectorIndex;

use crate::config::FileConfig;

/// Build the index described by `[index]` and `[collections.*]`.
pub fn index_from_config(config: &FileConfig) -> FileVectorIndex {
    let index = match &config.index.data_dir {
        Some(dir) => FileVectorIndex::open(dir),
        None => FileVectorIndex::in_memory(),
    };
    index.with_dimensions(config.collection_dimensions())
}
