use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single remote job, as reported by the training service, plus the
/// local `NotStarted` marker for records whose jobs were never submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    NotStarted,
    #[default]
    StateUnspecified,
    Queued,
    Preparing,
    Running,
    Succeeded,
    Failed,
    Cancelling,
    Cancelled,
}

impl JobState {
    pub const REMOTE: [JobState; 7] = [
        JobState::Queued,
        JobState::Preparing,
        JobState::Running,
        JobState::Succeeded,
        JobState::Failed,
        JobState::Cancelling,
        JobState::Cancelled,
    ];

    /// The service is running the job or is about to.
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Queued | Self::Preparing | Self::Running)
    }

    /// Irrecoverably terminated, or termination in progress.
    pub fn is_dead_or_dying(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelling | Self::Cancelled)
    }

    /// `Cancelling` is both not done and dead or dying.
    pub fn is_not_done(self) -> bool {
        !matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn is_done(self) -> bool {
        !self.is_not_done()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::StateUnspecified => "STATE_UNSPECIFIED",
            Self::Queued => "QUEUED",
            Self::Preparing => "PREPARING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelling => "CANCELLING",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two kinds of remote job that make up one training attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubJob {
    Train,
    Eval,
}

impl SubJob {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Eval => "eval",
        }
    }

    pub fn job_id(self, model_id: &str) -> String {
        format!("{}_{}", self.prefix(), model_id)
    }

    /// Fully qualified name used by the get and cancel calls.
    pub fn job_name(self, parent: &str, model_id: &str) -> String {
        format!("{}/jobs/{}", parent, self.job_id(model_id))
    }
}

/// Composite view over the train job and the optional eval job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeState {
    NotStarted,
    TrainOnly(JobState),
    TrainAndEval(JobState, JobState),
    Terminal,
}

impl CompositeState {
    pub fn from_states(train: JobState, eval: Option<JobState>) -> Self {
        match (train, eval) {
            (JobState::NotStarted, _) => Self::NotStarted,
            (train, None) if train.is_done() => Self::Terminal,
            (train, None) => Self::TrainOnly(train),
            (train, Some(eval)) if train.is_done() && eval.is_done() => Self::Terminal,
            (train, Some(eval)) => Self::TrainAndEval(train, eval),
        }
    }

    /// Whether the remote service has to be asked before trusting the stored states.
    pub fn needs_poll(self) -> bool {
        !matches!(self, Self::Terminal)
    }
}

/// What to do with a freshly polled pair of states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    Store,
    /// Train is dead or dying while eval is still alive.
    CancelEval,
}

pub fn next_action(train: JobState, eval: Option<JobState>) -> PollAction {
    match eval {
        Some(eval) if train.is_dead_or_dying() && eval.is_alive() => PollAction::CancelEval,
        _ => PollAction::Store,
    }
}
