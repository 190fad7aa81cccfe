use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use media_tools::{print_error, print_warning};

use crate::PutSyncArgs;
use crate::catalog::Catalog;
use crate::classify::{Classification, Classifier};
use crate::config::{Config, PutSyncConfig};
use crate::executor::{ActionQueue, Executor};
use crate::logger::FileLogger;
use crate::planner::{PlanError, Planner, RunContext};
use crate::prompt::{Prompt, StdinPrompt};
use crate::rclone::{Rclone, Remote};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";

#[derive(Debug)]
pub struct PutSync {
    config: Config,
}

impl PutSync {
    /// Create a new instance from command line arguments and the user config file.
    pub fn new(args: PutSyncArgs) -> Self {
        let config = Config::from_args(args, PutSyncConfig::get_user_config());
        if config.verbose {
            eprintln!("Config: {config:#?}");
        }
        Self { config }
    }

    /// Run one full pass: list, classify and plan every root item, then execute the queue.
    pub fn run(&self) -> Result<()> {
        let mut remote = Rclone::new(&self.config.remote)?;
        let mut prompt = StdinPrompt;
        let mut logger = if self.config.log {
            FileLogger::new()
                .map_err(|error| print_warning!("Could not create log file: {error}"))
                .ok()
        } else {
            None
        };

        self.sync(&mut remote, &mut prompt, logger.as_mut())?;
        Ok(())
    }

    fn sync(
        &self,
        remote: &mut dyn Remote,
        prompt: &mut dyn Prompt,
        mut logger: Option<&mut FileLogger>,
    ) -> Result<usize> {
        if let Some(logger) = logger.as_deref_mut() {
            logger.log_init(&self.config);
        }

        let catalog = self.fetch_catalog(remote)?;
        let mut context = RunContext::new(self.config.dryrun);
        let queue = self.build_queue(&catalog, &mut context, prompt, logger.as_deref_mut())?;

        Executor::new(remote, prompt, logger).execute(queue, &context)
    }

    fn fetch_catalog(&self, remote: &mut dyn Remote) -> Result<Catalog> {
        let spinner = Self::create_spinner();
        spinner.set_message(format!("Listing {}:", self.config.remote));

        let items = remote.list(self.config.max_depth);
        spinner.finish_and_clear();
        let items = items.with_context(|| format!("Failed to list remote {}:", self.config.remote))?;

        let catalog = Catalog::new(items);
        println!("Found {} items", catalog.len());
        Ok(catalog)
    }

    /// Classify and plan every root item, collecting the actions into one queue.
    fn build_queue(
        &self,
        catalog: &Catalog,
        context: &mut RunContext,
        prompt: &mut dyn Prompt,
        mut logger: Option<&mut FileLogger>,
    ) -> Result<ActionQueue> {
        let classifier = Classifier::new(catalog, &self.config.blocklist);
        let planner = Planner::new(catalog, &self.config.media_root);
        let mut queue = ActionQueue::default();

        for root in catalog.roots() {
            let classification = classifier.classify(root);
            if let Classification::Skip(reason) = classification {
                if self.config.verbose {
                    println!("{} {}", format!("Skipping {}:", root.name).dimmed(), reason);
                }
                continue;
            }

            println!("\n{}", root.name.cyan().bold());
            context.begin_item();
            match planner.plan(&classification, context, prompt) {
                Ok(actions) => {
                    let skipped = context.take_skipped();
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_skipped(&root.path, &skipped);
                        logger.log_planned(&root.path, &actions);
                    }
                    queue.extend(actions);
                }
                Err(error) => {
                    let Some(plan_error) = error.downcast_ref::<PlanError>() else {
                        return Err(error);
                    };
                    print_error!("{plan_error}, skipping \"{}\"", root.name);
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_plan_error(&root.path, &plan_error.to_string());
                    }
                }
            }
        }

        Ok(queue)
    }

    /// Create a listing spinner that is hidden during tests.
    fn create_spinner() -> ProgressBar {
        if cfg!(test) {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}
