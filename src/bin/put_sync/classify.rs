//! Decide what a root item is: a movie, a TV show, a loose video, or noise.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::types::Item;

/// Matches TV episode markers like `S01E03` anywhere in a name.
pub static RE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S\d+E\d+").expect("Invalid episode regex"));

/// Result of classifying one root item.
#[derive(Debug, PartialEq, Eq)]
pub enum Classification<'a> {
    Skip(SkipReason),
    /// A loose video file that is not an episode.
    PlainVideo(&'a Item),
    /// A folder holding exactly one non-episode video.
    MovieCandidate { folder: &'a Item, video: &'a Item },
    /// A show folder, or a single episode, split into batches offered one at a time.
    TvCandidate { folder: &'a Item, batches: Vec<TvBatch<'a>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blocklisted,
    NoVideo,
    NotVideo,
}

/// A group of episodes offered to the operator with a single prompt.
#[derive(Debug, PartialEq, Eq)]
pub struct TvBatch<'a> {
    /// Season folder, or the candidate itself for a flat batch.
    pub(crate) folder: &'a Item,
    pub(crate) videos: Vec<&'a Item>,
    /// Remote items removed when the operator chooses delete.
    pub(crate) delete_targets: Vec<&'a Item>,
}

/// Classifies root items against a catalog snapshot.
#[derive(Debug)]
pub struct Classifier<'a> {
    catalog: &'a Catalog,
    blocklist: &'a [String],
}

impl<'a> Classifier<'a> {
    pub(crate) const fn new(catalog: &'a Catalog, blocklist: &'a [String]) -> Self {
        Self { catalog, blocklist }
    }

    pub(crate) fn is_blocklisted(&self, item: &Item) -> bool {
        self.blocklist
            .iter()
            .any(|blocked| *blocked == item.path || *blocked == item.name)
    }

    pub(crate) fn classify(&self, item: &'a Item) -> Classification<'a> {
        if self.is_blocklisted(item) {
            return Classification::Skip(SkipReason::Blocklisted);
        }

        if !item.is_dir {
            if !item.is_video() {
                return Classification::Skip(SkipReason::NotVideo);
            }
            if is_episode(&item.name) {
                return Classification::TvCandidate {
                    folder: item,
                    batches: vec![TvBatch {
                        folder: item,
                        videos: vec![item],
                        delete_targets: vec![item],
                    }],
                };
            }
            return Classification::PlainVideo(item);
        }

        let videos = self.catalog.videos_under(item);
        if videos.is_empty() {
            return Classification::Skip(SkipReason::NoVideo);
        }
        if let [video] = videos.as_slice()
            && !is_episode(&item.name)
            && !is_episode(&video.name)
        {
            return Classification::MovieCandidate {
                folder: item,
                video: *video,
            };
        }

        Classification::TvCandidate {
            folder: item,
            batches: self.partition_batches(item, videos),
        }
    }

    /// Split a show folder into season batches.
    ///
    /// Top-level subfolders with at least one nested video become season batches.
    /// Without any, all videos form a single flat batch for the whole folder.
    /// Loose top-level videos next to season folders get one extra batch.
    fn partition_batches(&self, folder: &'a Item, videos: Vec<&'a Item>) -> Vec<TvBatch<'a>> {
        let mut batches: Vec<TvBatch<'a>> = self
            .catalog
            .top_level_children_of(folder)
            .filter(|child| child.is_dir)
            .filter_map(|season| {
                let season_videos = self.catalog.videos_under(season);
                (!season_videos.is_empty()).then(|| TvBatch {
                    folder: season,
                    videos: season_videos,
                    delete_targets: vec![season],
                })
            })
            .collect();

        if batches.is_empty() {
            return vec![TvBatch {
                folder,
                videos,
                delete_targets: vec![folder],
            }];
        }

        let loose_videos: Vec<&Item> = self
            .catalog
            .top_level_children_of(folder)
            .filter(|child| child.is_video())
            .collect();
        if !loose_videos.is_empty() {
            batches.push(TvBatch {
                folder,
                videos: loose_videos.clone(),
                delete_targets: loose_videos,
            });
        }

        batches
    }
}

/// Check if a name contains a TV episode marker.
#[must_use]
pub fn is_episode(name: &str) -> bool {
    RE_EPISODE.is_match(name)
}

impl TvBatch<'_> {
    /// Combined size of all videos in this batch.
    pub(crate) fn total_size(&self) -> u64 {
        self.videos.iter().map(|video| video.size).sum()
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocklisted => write!(f, "blocklisted"),
            Self::NoVideo => write!(f, "no video"),
            Self::NotVideo => write!(f, "not a video"),
        }
    }
}
