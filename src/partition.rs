//! Track-keyed partitioning.
//!
//! A partition holds every fix of one track, in the relative order the fixes
//! appear in the source collection. Partitions are returned in
//! first-encountered track order.

use std::collections::HashMap;

use crate::{Fix, TrackCollection};

/// All fixes of one track, owned so it can be moved into a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub track_id: String,
    pub fixes: Vec<Fix>,
}

impl Partition {
    pub fn new(track_id: impl Into<String>, fixes: Vec<Fix>) -> Self {
        Self {
            track_id: track_id.into(),
            fixes,
        }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

/// Split a collection into one partition per track identifier.
///
/// Builds an explicit `track_id -> row indices` mapping, then copies the rows
/// out in index order. An empty collection yields no partitions.
///
/// # Example
/// ```
/// use trackdist::{Fix, TrackCollection, partition_tracks};
///
/// let t = chrono::NaiveDateTime::default();
/// let collection = TrackCollection::new(
///     vec![
///         Fix::new(t, 1.0, 1.0, "b"),
///         Fix::new(t, 2.0, 2.0, "a"),
///         Fix::new(t, 3.0, 3.0, "b"),
///     ],
///     "track_id",
/// );
///
/// let partitions = partition_tracks(&collection);
/// assert_eq!(partitions.len(), 2);
/// assert_eq!(partitions[0].track_id, "b");
/// assert_eq!(partitions[0].len(), 2);
/// ```
pub fn partition_tracks(collection: &TrackCollection) -> Vec<Partition> {
    let mut order: Vec<&str> = Vec::new();
    let mut rows: HashMap<&str, Vec<usize>> = HashMap::new();

    for (idx, fix) in collection.fixes.iter().enumerate() {
        let id = fix.track_id.as_str();
        rows.entry(id)
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(idx);
    }

    order
        .into_iter()
        .map(|id| {
            let fixes = rows[id]
                .iter()
                .map(|&i| collection.fixes[i].clone())
                .collect();
            Partition::new(id, fixes)
        })
        .collect()
}

/// Concatenate partitions back into a flat fix list, in partition order.
pub(crate) fn merge_partitions(partitions: Vec<Partition>) -> Vec<Fix> {
    let total = partitions.iter().map(|p| p.len()).sum();
    let mut fixes = Vec::with_capacity(total);
    for partition in partitions {
        fixes.extend(partition.fixes);
    }
    fixes
}
