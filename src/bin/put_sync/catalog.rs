//! Flat snapshot of the remote hierarchy.
//!
//! Parent and child relationships are reconstructed from path strings.
//! Containment compares whole path segments, so `Foo2/movie.mkv` is not under `Foo`.

use crate::types::{Item, PATH_SEPARATOR};

/// Ordered list of remote items from a single listing.
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Store the full flat list, keeping the listing order.
    pub(crate) const fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub(crate) const fn len(&self) -> usize {
        self.items.len()
    }

    /// Items at depth 1, in catalog order.
    pub(crate) fn roots(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| depth(&item.path) == 1)
    }

    /// All items strictly below the given item, in catalog order.
    pub(crate) fn children_under<'a>(&'a self, parent: &'a Item) -> impl Iterator<Item = &'a Item> {
        self.items.iter().filter(move |item| is_under(&item.path, &parent.path))
    }

    /// Direct children of the given item.
    pub(crate) fn top_level_children_of<'a>(&'a self, parent: &'a Item) -> impl Iterator<Item = &'a Item> {
        let child_depth = depth(&parent.path) + 1;
        self.children_under(parent)
            .filter(move |item| depth(&item.path) == child_depth)
    }

    /// All video files below the given item.
    pub(crate) fn videos_under<'a>(&'a self, parent: &'a Item) -> Vec<&'a Item> {
        self.children_under(parent).filter(|item| item.is_video()).collect()
    }

    /// All subtitle files below the given item.
    pub(crate) fn subtitles_under<'a>(&'a self, parent: &'a Item) -> Vec<&'a Item> {
        self.children_under(parent).filter(|item| item.is_subtitle()).collect()
    }
}

/// Split a remote path into its non-empty segments.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Number of segments in a remote path.
#[must_use]
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

/// Check if `path` lies strictly below `ancestor`.
#[must_use]
pub fn is_under(path: &str, ancestor: &str) -> bool {
    let mut path_segments = segments(path);
    for ancestor_segment in segments(ancestor) {
        match path_segments.next() {
            Some(segment) if segment == ancestor_segment => {}
            _ => return false,
        }
    }
    path_segments.next().is_some()
}
