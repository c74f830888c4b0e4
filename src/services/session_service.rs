use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult, SessionError},
    models::{
        domain::QuizAttempt,
        dto::{
            request::StartSessionRequest,
            response::{
                AttemptListResponse, SessionResponse, SubmitCheckResponse, SubmitResponse,
                VisibilityOutcome, VisibilityResponse,
            },
        },
    },
    repositories::QuizAttemptRepository,
    services::quiz_generation_service::QuizGenerationService,
    session::{
        wall_clock_ticks, QuizSession, SessionPolicy, SessionSnapshot, SessionTimer,
        SubmissionResult, SubmitReason, TabSwitchOutcome, TickSourceFactory,
    },
};

struct LiveSession {
    session: Arc<Mutex<QuizSession>>,
    topic: Option<String>,
    // Held only so dropping the entry aborts the countdown.
    _timer: SessionTimer,
}

type SessionMap = Arc<RwLock<HashMap<String, LiveSession>>>;

const DEFAULT_SUBMITTED_RETENTION: Duration = Duration::from_secs(600);

/// Hosts in-progress sessions and records every first submission.
///
/// A submitted session stays readable for the retention window and is then
/// evicted; its attempt remains available from the repository.
pub struct QuizSessionService {
    sessions: SessionMap,
    generation: Arc<QuizGenerationService>,
    attempts: Arc<dyn QuizAttemptRepository>,
    policy: SessionPolicy,
    ticks: TickSourceFactory,
    retention: Duration,
}

impl QuizSessionService {
    pub fn new(
        generation: Arc<QuizGenerationService>,
        attempts: Arc<dyn QuizAttemptRepository>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            generation,
            attempts,
            policy,
            ticks: wall_clock_ticks(),
            retention: DEFAULT_SUBMITTED_RETENTION,
        }
    }

    pub fn with_tick_source(mut self, ticks: TickSourceFactory) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub async fn start_session(&self, request: StartSessionRequest) -> AppResult<SessionResponse> {
        request.validate()?;

        let topic = request.topic.as_deref().map(str::trim).map(str::to_string);
        let questions = match (request.questions, &topic) {
            (Some(questions), _) => questions,
            (None, Some(topic)) => self.generation.generate_quiz(topic).await?,
            (None, None) => {
                return Err(AppError::ValidationError(
                    "Either a topic or a question set is required".to_string(),
                ))
            }
        };

        let mut policy = self.policy;
        if let Some(duration) = request.duration_seconds {
            policy = policy.with_duration(duration);
        }
        if let Some(limit) = request.tab_switch_limit {
            policy = policy.with_tab_switch_limit(limit);
        }

        let quiz = QuizSession::start_with_policy(questions, policy)?;
        let snapshot = quiz.snapshot();
        let session = Arc::new(Mutex::new(quiz));
        let session_id = Uuid::new_v4().to_string();

        let timer = SessionTimer::spawn(
            Arc::clone(&session),
            (self.ticks)(),
            self.expiry_recorder(session_id.clone(), topic.clone()),
        );

        {
            let mut sessions = self.sessions.write().await;
            if let Some(old_id) = request.replaces.as_deref() {
                match sessions.remove(old_id) {
                    Some(_) => {
                        log::info!("Session {} discarded, replaced by {}", old_id, session_id)
                    }
                    None => log::warn!("Session {} to replace was not found", old_id),
                }
            }
            sessions.insert(
                session_id.clone(),
                LiveSession {
                    session,
                    topic: topic.clone(),
                    _timer: timer,
                },
            );
        }

        log::info!(
            "Session {} started with {} questions and {}s on the clock",
            session_id,
            snapshot.total_questions,
            snapshot.remaining_seconds
        );

        Ok(SessionResponse {
            session_id,
            topic,
            session: snapshot,
        })
    }

    pub async fn get_session(&self, session_id: &str) -> AppResult<SessionResponse> {
        let (session, topic) = self.live(session_id).await?;
        let snapshot = session.lock().await.snapshot();
        Ok(SessionResponse {
            session_id: session_id.to_string(),
            topic,
            session: snapshot,
        })
    }

    /// Drops a session and its countdown. Nothing is recorded for unsubmitted sessions.
    pub async fn discard_session(&self, session_id: &str) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| log::info!("Session {} discarded", session_id))
            .ok_or_else(|| session_not_found(session_id))
    }

    pub async fn select_answer(
        &self,
        session_id: &str,
        index: usize,
        option: &str,
    ) -> AppResult<SessionSnapshot> {
        self.mutate(session_id, |quiz| quiz.select_answer(index, option))
            .await
    }

    pub async fn clear_answer(&self, session_id: &str, index: usize) -> AppResult<SessionSnapshot> {
        self.mutate(session_id, |quiz| quiz.clear_answer(index)).await
    }

    pub async fn toggle_review_mark(
        &self,
        session_id: &str,
        index: usize,
    ) -> AppResult<SessionSnapshot> {
        self.mutate(session_id, |quiz| quiz.toggle_review_mark(index).map(|_| ()))
            .await
    }

    pub async fn navigate(&self, session_id: &str, index: usize) -> AppResult<SessionSnapshot> {
        self.mutate(session_id, |quiz| quiz.navigate_to(index)).await
    }

    /// Handles a page-visibility change. Only transitions to hidden count.
    pub async fn report_visibility(
        &self,
        session_id: &str,
        hidden: bool,
    ) -> AppResult<VisibilityResponse> {
        let (session, topic) = self.live(session_id).await?;
        let mut quiz = session.lock().await;

        if !hidden {
            return Ok(VisibilityResponse {
                outcome: VisibilityOutcome::Ignored,
                warning: None,
                session: quiz.snapshot(),
            });
        }

        let outcome = quiz.report_tab_hidden();
        let warning = match &outcome {
            TabSwitchOutcome::Warned { count } => {
                log::warn!("Session {} left the quiz tab ({} time(s))", session_id, count);
                let left = quiz.policy().tab_switch_limit.saturating_sub(*count);
                Some(format!(
                    "You switched tabs. {} more switch(es) will submit your quiz automatically.",
                    left
                ))
            }
            TabSwitchOutcome::ForcedSubmit(result) => {
                log::warn!("Session {} force-submitted after repeated tab switches", session_id);
                self.record(session_id, topic, &quiz, result).await;
                self.schedule_eviction(session_id);
                None
            }
            TabSwitchOutcome::Ignored => None,
        };

        Ok(VisibilityResponse {
            outcome: VisibilityOutcome::from(&outcome),
            warning,
            session: quiz.snapshot(),
        })
    }

    pub async fn submit_check(&self, session_id: &str) -> AppResult<SubmitCheckResponse> {
        let (session, _) = self.live(session_id).await?;
        let check = session.lock().await.request_submit();
        Ok(SubmitCheckResponse {
            session_id: session_id.to_string(),
            check,
        })
    }

    pub async fn submit(&self, session_id: &str) -> AppResult<SubmitResponse> {
        let (session, topic) = self.live(session_id).await?;
        let mut quiz = session.lock().await;

        let submission = quiz.submit(SubmitReason::Manual);
        let attempt_id = if submission.is_accepted() {
            let recorded = self
                .record(session_id, topic, &quiz, submission.result())
                .await
                .map(|attempt| attempt.id);
            self.schedule_eviction(session_id);
            recorded
        } else {
            self.attempts
                .find_by_session(session_id)
                .await?
                .map(|attempt| attempt.id)
        };

        Ok(SubmitResponse {
            session_id: session_id.to_string(),
            result: submission.into_result(),
            attempt_id,
        })
    }

    pub async fn get_attempt(&self, attempt_id: &str) -> AppResult<QuizAttempt> {
        self.attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))
    }

    pub async fn get_session_attempt(&self, session_id: &str) -> AppResult<QuizAttempt> {
        self.attempts
            .find_by_session(session_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No attempt recorded for session '{}'", session_id))
            })
    }

    pub async fn list_attempts(&self, offset: i64, limit: i64) -> AppResult<AttemptListResponse> {
        let (items, total) = self.attempts.list_recent(offset, limit).await?;
        Ok(AttemptListResponse {
            items,
            total,
            offset,
            limit,
        })
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn live(&self, session_id: &str) -> AppResult<(Arc<Mutex<QuizSession>>, Option<String>)> {
        let sessions = self.sessions.read().await;
        let live = sessions
            .get(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        Ok((Arc::clone(&live.session), live.topic.clone()))
    }

    async fn mutate<F>(&self, session_id: &str, op: F) -> AppResult<SessionSnapshot>
    where
        F: FnOnce(&mut QuizSession) -> Result<(), SessionError>,
    {
        let (session, _) = self.live(session_id).await?;
        let mut quiz = session.lock().await;
        op(&mut *quiz)?;
        Ok(quiz.snapshot())
    }

    async fn record(
        &self,
        session_id: &str,
        topic: Option<String>,
        quiz: &QuizSession,
        result: &SubmissionResult,
    ) -> Option<QuizAttempt> {
        let attempt = QuizAttempt::from_submission(
            session_id,
            topic,
            quiz.questions(),
            result,
            quiz.tab_switch_count(),
        );
        record_attempt(Arc::clone(&self.attempts), attempt).await
    }

    fn schedule_eviction(&self, session_id: &str) {
        evict_after(
            Arc::clone(&self.sessions),
            session_id.to_string(),
            self.retention,
        );
    }

    /// Called by the timer with the session still locked, so the attempt is
    /// stored before any other caller sees the expired session.
    fn expiry_recorder(
        &self,
        session_id: String,
        topic: Option<String>,
    ) -> impl FnOnce(SubmissionResult, QuizSession) -> BoxFuture<'static, ()> + Send + 'static {
        let attempts = Arc::clone(&self.attempts);
        let sessions = Arc::clone(&self.sessions);
        let retention = self.retention;
        move |result: SubmissionResult, quiz: QuizSession| -> BoxFuture<'static, ()> {
            Box::pin(async move {
                let attempt = QuizAttempt::from_submission(
                    &session_id,
                    topic,
                    quiz.questions(),
                    &result,
                    quiz.tab_switch_count(),
                );
                record_attempt(attempts, attempt).await;
                evict_after(sessions, session_id, retention);
            })
        }
    }
}

/// Stores the attempt for a just-accepted submission. The write runs on its
/// own task so aborting the caller cannot lose it. A storage failure is
/// logged; the submission itself stands.
async fn record_attempt(
    attempts: Arc<dyn QuizAttemptRepository>,
    attempt: QuizAttempt,
) -> Option<QuizAttempt> {
    let session_id = attempt.session_id.clone();
    match tokio::spawn(async move { attempts.create(attempt).await }).await {
        Ok(Ok(attempt)) => {
            log::info!(
                "Recorded attempt {} for session {}: {}/{} ({})",
                attempt.id,
                session_id,
                attempt.score,
                attempt.total_questions,
                attempt.reason
            );
            Some(attempt)
        }
        Ok(Err(e)) => {
            log::error!("Failed to record attempt for session {}: {}", session_id, e);
            None
        }
        Err(e) => {
            log::error!("Attempt write for session {} did not complete: {}", session_id, e);
            None
        }
    }
}

/// Drops a submitted session from the registry once `retention` has passed.
fn evict_after(sessions: SessionMap, session_id: String, retention: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(retention).await;
        if sessions.write().await.remove(&session_id).is_some() {
            log::debug!("Submitted session {} evicted", session_id);
        }
    });
}

fn session_not_found(session_id: &str) -> AppError {
    AppError::NotFound(format!("Session '{}' not found", session_id))
}
