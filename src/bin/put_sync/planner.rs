//! Turn classification results and operator answers into queued actions.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use thiserror::Error;

use media_tools::{format_size, print_warning};

use crate::catalog::Catalog;
use crate::classify::{Classification, TvBatch};
use crate::prompt::Prompt;
use crate::types::{Action, Item};

/// Local directory for movies under the media root.
const MOVIES_DIR: &str = "Movies";

/// Local directory for TV shows under the media root.
const TV_SHOWS_DIR: &str = "TV Shows";

/// Errors that abort planning for the current root item only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: NameKind },
    #[error("{kind} name cannot contain path separators: \"{name}\"")]
    InvalidName { kind: NameKind, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Movie,
    Show,
}

/// Per-run state shared across planning steps.
#[derive(Debug, Default)]
pub struct RunContext {
    pub(crate) dryrun: bool,
    show_name: Option<String>,
    movie_name: Option<String>,
    /// Downloads left out of the current item because the target already exists locally.
    skipped: Vec<PathBuf>,
}

/// Operator intent parsed from a multi-letter answer like `dx`.
///
/// Any character other than `d`, `x`, `s` or `t` turns the whole answer into a skip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Choice {
    download: bool,
    delete: bool,
    subtitles: bool,
}

/// Builds actions for classified root items.
#[derive(Debug)]
pub struct Planner<'a> {
    catalog: &'a Catalog,
    media_root: &'a Path,
}

impl RunContext {
    pub(crate) fn new(dryrun: bool) -> Self {
        Self {
            dryrun,
            ..Self::default()
        }
    }

    /// Forget remembered names before moving on to the next root item.
    pub(crate) fn begin_item(&mut self) {
        self.show_name = None;
        self.movie_name = None;
        self.skipped.clear();
    }

    /// Local paths whose download was skipped for the current item.
    pub(crate) fn take_skipped(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.skipped)
    }

    /// Movie name for the current root item, asked on first use.
    pub(crate) fn movie_name(&mut self, prompt: &mut dyn Prompt) -> Result<String> {
        if let Some(name) = &self.movie_name {
            return Ok(name.clone());
        }
        let name = ask_name(prompt, NameKind::Movie)?;
        self.movie_name = Some(name.clone());
        Ok(name)
    }

    /// Show name for the current root item, asked on first use.
    pub(crate) fn show_name(&mut self, prompt: &mut dyn Prompt) -> Result<String> {
        if let Some(name) = &self.show_name {
            return Ok(name.clone());
        }
        let name = ask_name(prompt, NameKind::Show)?;
        self.show_name = Some(name.clone());
        Ok(name)
    }
}

impl Choice {
    fn parse(answer: &str) -> Self {
        let answer = answer.to_lowercase();
        if !answer.chars().all(|c| matches!(c, 'd' | 'x' | 's' | 't')) {
            return Self::default();
        }
        Self {
            download: answer.contains('d'),
            delete: answer.contains('x'),
            subtitles: answer.contains('t'),
        }
    }
}

impl<'a> Planner<'a> {
    pub(crate) const fn new(catalog: &'a Catalog, media_root: &'a Path) -> Self {
        Self { catalog, media_root }
    }

    /// Plan actions for one classified root item.
    ///
    /// Returns the actions only if the whole item was planned successfully,
    /// so a [`PlanError`] leaves nothing half-queued.
    pub(crate) fn plan(
        &self,
        classification: &Classification<'_>,
        context: &mut RunContext,
        prompt: &mut dyn Prompt,
    ) -> Result<Vec<Action>> {
        match classification {
            Classification::Skip(_) => Ok(Vec::new()),
            Classification::PlainVideo(video) => self.plan_movie(video, None, video, context, prompt),
            Classification::MovieCandidate { folder, video } => {
                self.plan_movie(folder, Some(*folder), video, context, prompt)
            }
            Classification::TvCandidate { batches, .. } => self.plan_tv(batches, context, prompt),
        }
    }

    fn movie_destination(&self, name: &str) -> PathBuf {
        self.media_root.join(MOVIES_DIR).join(name)
    }

    fn show_destination(&self, name: &str) -> PathBuf {
        self.media_root.join(TV_SHOWS_DIR).join(name)
    }

    fn plan_movie(
        &self,
        item: &Item,
        folder: Option<&Item>,
        video: &Item,
        context: &mut RunContext,
        prompt: &mut dyn Prompt,
    ) -> Result<Vec<Action>> {
        let answer = prompt.ask(&format!(
            "{} | Download / Delete / Skip / Subtitles (d/x/s/t)?: ",
            format_size(video.size)
        ))?;
        let choice = Choice::parse(&answer);
        let mut actions = Vec::new();

        if choice.download {
            let destination = self.movie_destination(&context.movie_name(prompt)?);
            if destination.exists() {
                println!(
                    "  {} {}",
                    "Already exists, skipping download:".yellow(),
                    destination.display()
                );
                context.skipped.push(destination);
            } else {
                actions.push(Action::Download {
                    source: video.path.clone(),
                    destination,
                });
            }
        }

        if (choice.download || choice.subtitles)
            && let Some(folder) = folder
            && let Some(subtitle) = self.pick_subtitle(folder, prompt)?
        {
            let destination = self.movie_destination(&context.movie_name(prompt)?);
            actions.push(Action::Download {
                source: subtitle.path.clone(),
                destination,
            });
        }

        if choice.delete {
            if folder.is_some() {
                print_warning!("  Delete removes the whole folder \"{}\"", item.path);
            }
            actions.push(Action::Delete {
                path: item.path.clone(),
                is_dir: item.is_dir,
            });
        }

        Ok(actions)
    }

    /// Let the operator choose at most one subtitle file from the folder.
    fn pick_subtitle<'c>(&'c self, folder: &'c Item, prompt: &mut dyn Prompt) -> Result<Option<&'c Item>> {
        let subtitles = self.catalog.subtitles_under(folder);
        match subtitles.as_slice() {
            [] => Ok(None),
            [subtitle] => {
                let confirmed = prompt.confirm(&format!("Download subtitle \"{}\"?", subtitle.name))?;
                Ok(confirmed.then_some(*subtitle))
            }
            _ => {
                println!("  {}", "Subtitles:".bold());
                for (index, subtitle) in subtitles.iter().enumerate() {
                    println!("    {}. {}", index + 1, subtitle.name);
                }
                let answer = prompt.ask(&format!(
                    "Subtitle number (1-{}, anything else to skip): ",
                    subtitles.len()
                ))?;
                let selected = parse_selection(&answer, subtitles.len()).map(|index| subtitles[index]);
                if selected.is_none() {
                    println!("  Skipping subtitles");
                }
                Ok(selected)
            }
        }
    }

    fn plan_tv(
        &self,
        batches: &[TvBatch<'_>],
        context: &mut RunContext,
        prompt: &mut dyn Prompt,
    ) -> Result<Vec<Action>> {
        let mut actions = Vec::new();

        for batch in batches {
            let answer = prompt.ask(&format!(
                "{} | {} episode(s) | {} | Download / Delete / Skip (d/x/s)?: ",
                batch.folder.name,
                batch.videos.len(),
                format_size(batch.total_size())
            ))?;
            let choice = Choice::parse(&answer);

            if choice.download {
                let destination = self.show_destination(&context.show_name(prompt)?);
                for video in &batch.videos {
                    let target = destination.join(&video.name);
                    if target.exists() {
                        println!("  {} {}", "Already exists, skipping:".yellow(), video.name);
                        context.skipped.push(target);
                        continue;
                    }
                    actions.push(Action::Download {
                        source: video.path.clone(),
                        destination: destination.clone(),
                    });
                }
            }

            if choice.delete {
                actions.extend(batch.delete_targets.iter().map(|target| Action::Delete {
                    path: target.path.clone(),
                    is_dir: target.is_dir,
                }));
            }
        }

        Ok(actions)
    }
}

/// Ask for a non-empty name that can be used as a single directory name.
fn ask_name(prompt: &mut dyn Prompt, kind: NameKind) -> Result<String> {
    let name = prompt.ask(&format!("{kind} name?: "))?;
    if name.is_empty() {
        return Err(PlanError::EmptyName { kind }.into());
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(PlanError::InvalidName { kind, name }.into());
    }
    Ok(name)
}

/// Convert a 1-based selection into an index. Anything else declines.
fn parse_selection(answer: &str, count: usize) -> Option<usize> {
    if answer.is_empty() || !answer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    answer
        .parse::<usize>()
        .ok()
        .filter(|number| (1..=count).contains(number))
        .map(|number| number - 1)
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "Movie"),
            Self::Show => write!(f, "TV show"),
        }
    }
}
