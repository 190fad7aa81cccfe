//! Review, confirm, and replay the action queue.

use anyhow::Result;
use colored::Colorize;

use media_tools::print_bold;

use crate::logger::FileLogger;
use crate::planner::RunContext;
use crate::prompt::Prompt;
use crate::rclone::Remote;
use crate::types::Action;

/// Ordered, append-only list of actions built during planning.
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

/// Replays a confirmed queue against a remote.
pub struct Executor<'a> {
    remote: &'a mut dyn Remote,
    prompt: &'a mut dyn Prompt,
    logger: Option<&'a mut FileLogger>,
}

impl ActionQueue {
    pub(crate) fn extend(&mut self, actions: Vec<Action>) {
        self.actions.extend(actions);
    }

    pub(crate) const fn len(&self) -> usize {
        self.actions.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Print all actions with 1-based numbering.
    pub(crate) fn print(&self) {
        print_bold!("\nQueued actions:");
        for (index, action) in self.actions.iter().enumerate() {
            println!("{:>3}. {action}", index + 1);
        }
    }
}

impl<'a> Executor<'a> {
    pub(crate) fn new(
        remote: &'a mut dyn Remote,
        prompt: &'a mut dyn Prompt,
        logger: Option<&'a mut FileLogger>,
    ) -> Self {
        Self { remote, prompt, logger }
    }

    /// Show the queue, ask once for confirmation, then run every action in order.
    ///
    /// Returns the number of executed actions.
    /// The first remote failure stops the run and is returned as an error.
    pub(crate) fn execute(&mut self, queue: ActionQueue, context: &RunContext) -> Result<usize> {
        if queue.is_empty() {
            println!("\nNothing to do.");
            return Ok(0);
        }

        queue.print();
        let total = queue.len();
        let confirmed = self.prompt.confirm(&format!("\nExecute {total} action(s)?"))?;
        if let Some(logger) = self.logger.as_deref_mut() {
            logger.log_confirmation(confirmed, total);
        }
        if !confirmed {
            println!("{}", "Aborted, nothing was executed.".yellow());
            return Ok(0);
        }

        for (index, action) in queue.actions().iter().enumerate() {
            let number = index + 1;
            if let Some(logger) = self.logger.as_deref_mut() {
                logger.log_start(number, action, context.dryrun);
            }

            if context.dryrun {
                println!("{} {action}", "DRYRUN:".cyan().bold());
                continue;
            }

            println!("{} {action}", format!("[{number}/{total}]").bold());
            if let Err(error) = self.run_action(action) {
                if let Some(logger) = self.logger.as_deref_mut() {
                    logger.log_failure(number, action, &format!("{error:#}"));
                    logger.log_summary(index, total);
                }
                return Err(error.context(format!("Action {number}/{total} failed: {action}")));
            }

            if let Some(logger) = self.logger.as_deref_mut() {
                logger.log_success(number, action);
            }
        }

        if let Some(logger) = self.logger.as_deref_mut() {
            logger.log_summary(total, total);
        }
        if context.dryrun {
            println!("\n{}", "Dry-run mode: nothing was transferred or deleted.".cyan());
        } else {
            println!("\n{}", format!("Finished {total} action(s).").green());
        }

        Ok(total)
    }

    fn run_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Download { source, destination } => self.remote.copy(source, destination),
            Action::Delete { path, is_dir } => self.remote.purge(path, *is_dir),
        }
    }
}

#[cfg(test)]
mod test_executor {
    use std::path::PathBuf;

    use super::*;

    use crate::prompt::scripted::ScriptedPrompt;
    use crate::rclone::recording::{Call, RecordingRemote};

    fn sample_queue() -> ActionQueue {
        let mut queue = ActionQueue::default();
        queue.extend(vec![
            Action::Download {
                source: "Foo/movie.mkv".to_string(),
                destination: PathBuf::from("/media/Movies/Foo"),
            },
            Action::Delete {
                path: "Foo".to_string(),
                is_dir: true,
            },
            Action::Delete {
                path: "loose.mp4".to_string(),
                is_dir: false,
            },
        ]);
        queue
    }

    fn run(answers: &[&str], dryrun: bool, remote: &mut RecordingRemote) -> (Result<usize>, ScriptedPrompt) {
        let mut prompt = ScriptedPrompt::new(answers);
        let context = RunContext::new(dryrun);
        let result = Executor::new(remote, &mut prompt, None).execute(sample_queue(), &context);
        (result, prompt)
    }

    #[test]
    fn confirmed_queue_runs_in_order() {
        let mut remote = RecordingRemote::default();
        let (result, _) = run(&["y"], false, &mut remote);
        assert_eq!(result.expect("execute"), 3);
        assert_eq!(
            remote.calls,
            vec![
                Call::Copy("Foo/movie.mkv".to_string(), PathBuf::from("/media/Movies/Foo")),
                Call::Purge("Foo".to_string(), true),
                Call::Purge("loose.mp4".to_string(), false),
            ]
        );
    }

    #[test]
    fn declined_queue_makes_no_calls() {
        for answer in ["n", "", "yes please", "Y "] {
            let mut remote = RecordingRemote::default();
            let (result, _) = run(&[answer], false, &mut remote);
            assert_eq!(result.expect("execute"), 0);
            assert!(remote.calls.is_empty(), "answer {answer:?} should decline");
        }
    }

    #[test]
    fn dryrun_asks_same_question_without_calls() {
        let mut live_remote = RecordingRemote::default();
        let (_, live_prompt) = run(&["n"], false, &mut live_remote);

        let mut dry_remote = RecordingRemote::default();
        let (result, dry_prompt) = run(&["y"], true, &mut dry_remote);

        assert_eq!(result.expect("execute"), 3);
        assert!(dry_remote.calls.is_empty());
        assert_eq!(live_prompt.questions, dry_prompt.questions);
    }

    #[test]
    fn first_failure_stops_the_run() {
        let mut remote = RecordingRemote {
            fail_at: Some(1),
            ..RecordingRemote::default()
        };
        let (result, _) = run(&["y"], false, &mut remote);
        let error = result.expect_err("should fail");
        assert!(format!("{error:#}").contains("Action 2/3 failed"));
        assert_eq!(remote.calls.len(), 2);
    }

    #[test]
    fn empty_queue_does_not_prompt() {
        let mut remote = RecordingRemote::default();
        let mut prompt = ScriptedPrompt::new(&[]);
        let context = RunContext::new(false);
        let result = Executor::new(&mut remote, &mut prompt, None).execute(ActionQueue::default(), &context);
        assert_eq!(result.expect("execute"), 0);
        assert!(prompt.questions.is_empty());
    }
}
