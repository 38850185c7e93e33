//! Cron-driven posting loop using tokio-cron-scheduler.
//!
//! Cron jobs only send ticks; a single loop owns the day counter and runs the
//! pipeline, so scheduled runs never overlap and nothing mutable is shared.

use std::process::ExitCode;

use anyhow::{Context, Result};
use techtweet_common::TriggerMode;
use techtweet_config::{CounterKind, ScheduleConfig};
use techtweet_pipeline::{Pipeline, PipelineError, SequenceCounter, clock_day_now};
use tokio::sync::mpsc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Ticks that pile up while a run is in flight collapse into one.
const TICK_BUFFER: usize = 1;

/// Thin wrapper over [`JobScheduler`] that evaluates cron expressions in
/// local time.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    pub async fn new() -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner })
    }

    /// Register `task` on a standard five-field cron expression.
    pub async fn add_cron<F, Fut>(&self, schedule: &str, task: F) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let expr = with_seconds(schedule);
        let job = Job::new_async_tz(expr.as_str(), chrono::Local, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "scheduler.job.registered");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.inner.start().await?;
        tracing::info!("scheduler.started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("scheduler.stopped");
        Ok(())
    }
}

/// The underlying scheduler wants a leading seconds field.
pub fn with_seconds(five_field: &str) -> String {
    format!("0 {}", five_field.trim())
}

/// Day for the `run`-th scheduled run (1-based).
pub fn scheduled_day(counter: CounterKind, run: u32, cycle_days: u32) -> u32 {
    match counter {
        CounterKind::Sequence => run,
        CounterKind::Clock => clock_day_now(cycle_days),
    }
}

/// Why the posting loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `total_days` runs have happened.
    Complete,
    Interrupted,
    TicksClosed,
    VerificationFailed,
}

impl StopReason {
    fn exit_code(self) -> ExitCode {
        match self {
            StopReason::VerificationFailed => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    }
}

/// Post on every cron tick until `total_days` runs have happened or Ctrl-C
/// arrives. A verification failure at any point ends the process with a
/// failure status.
///
/// With `run_on_start` the immediate first run performs the verification, so
/// the account is only checked up front when the first run waits for cron.
pub async fn run_schedule(pipeline: Pipeline, cfg: &ScheduleConfig) -> Result<ExitCode> {
    if !cfg.run_on_start {
        if let Err(e) = pipeline.verify().await {
            tracing::error!(error = %e, "scheduler.verify.failed");
            return Ok(ExitCode::FAILURE);
        }
    }

    let (tx, mut rx) = mpsc::channel::<()>(TICK_BUFFER);
    let mut scheduler = Scheduler::new().await.context("starting job scheduler")?;
    let cron_tx = tx.clone();
    scheduler
        .add_cron(&cfg.cron, move || {
            let tx = cron_tx.clone();
            async move {
                if tx.try_send(()).is_err() {
                    tracing::warn!("scheduler.tick.skipped");
                }
            }
        })
        .await
        .with_context(|| format!("registering cron {:?}", cfg.cron))?;
    scheduler.start().await.context("starting job scheduler")?;

    if cfg.run_on_start {
        let _ = tx.try_send(());
    }
    drop(tx);

    let reason = drive(&pipeline, cfg, &mut rx, tokio::signal::ctrl_c()).await;

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!(error = %e, "scheduler.shutdown.failed");
    }
    Ok(reason.exit_code())
}

/// Run the pipeline once per tick. `shutdown` is checked before every tick,
/// so a signal that lands mid-run stops the loop once that run finishes.
async fn drive<S>(
    pipeline: &Pipeline,
    cfg: &ScheduleConfig,
    ticks: &mut mpsc::Receiver<()>,
    shutdown: S,
) -> StopReason
where
    S: std::future::Future,
{
    tokio::pin!(shutdown);
    let cycle_days = pipeline.settings().cycle_days;
    let mut counter = SequenceCounter::new(cfg.total_days);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!(completed = counter.completed(), "scheduler.interrupted");
                return StopReason::Interrupted;
            }
            tick = ticks.recv() => {
                if tick.is_none() {
                    return StopReason::TicksClosed;
                }
                let Some(run) = counter.advance() else {
                    return StopReason::Complete;
                };
                let day = scheduled_day(cfg.counter, run, cycle_days);
                match pipeline.run(day, TriggerMode::Scheduled).await {
                    Ok(outcome) => {
                        tracing::info!(
                            run,
                            day,
                            success = outcome.success,
                            post_id = ?outcome.post_id,
                            "scheduler.run.done"
                        );
                    }
                    Err(e @ PipelineError::Verification(_)) => {
                        tracing::error!(run, day, error = %e, "scheduler.verify.failed");
                        return StopReason::VerificationFailed;
                    }
                    Err(e) => {
                        tracing::error!(run, day, error = %e, code = ?e.code(), "scheduler.run.failed");
                    }
                }
                if counter.is_finished() {
                    tracing::info!(total = cfg.total_days, "challenge complete");
                    return StopReason::Complete;
                }
            }
        }
    }
}
