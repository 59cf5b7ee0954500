//! Question listing, submission, details, answers and votes.
//!
//! Every write checks the session first and fails locally when no token is
//! held, so anonymous users never produce a network request.

mod types;

use serde_json::Value;
use tracing::{debug, info, warn};

pub use types::{
    Answer, AnswerDraft, PageQuery, Question, QuestionDetails, QuestionDraft, User, VoteAction,
    VoteCounts, VoteDirection, VoteOutcome, VoteTarget,
};
use types::{AnswerList, QuestionList, VoteRequest};

use crate::api::{ApiError, ApiResult};
use crate::session::{Navigation, Session};

const QUESTIONS_PATH: &str = "/api/questions";
const VOTES_PATH: &str = "/api/votes/";

pub const ASK_LOGIN_MESSAGE: &str = "You must be logged in to post a question.";
pub const ANSWER_LOGIN_MESSAGE: &str = "You must be logged in to post an answer.";
pub const VOTE_LOGIN_MESSAGE: &str = "You must be logged in to vote.";
const ASK_FAILED_MESSAGE: &str = "Failed to post question.";
const ANSWER_FAILED_MESSAGE: &str = "Failed to post answer.";

/// Result of loading the listing view.
///
/// Loading never fails outright: on error the list is empty and `error`
/// says why, so callers can tell "no questions" from "could not load".
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub questions: Vec<Question>,
    pub error: Option<ApiError>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Forum operations bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Forum<'a> {
    session: &'a Session,
}

impl<'a> Forum<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Fetches questions in server order.
    ///
    /// # Errors
    /// Returns the API error of the listing request.
    pub async fn list_questions(&self, page: PageQuery) -> ApiResult<Vec<Question>> {
        let path = format!("{QUESTIONS_PATH}{}", page.to_query_string());
        let list: QuestionList = self.session.api().get_json(&path, false).await?;
        let questions: Vec<Question> = list.into();
        debug!(count = questions.len(), "questions loaded");
        Ok(questions)
    }

    /// Loads the listing view, degrading to an empty list on failure.
    pub async fn load_listing(&self, page: PageQuery) -> Listing {
        match self.list_questions(page).await {
            Ok(questions) => Listing {
                questions,
                error: None,
            },
            Err(error) => {
                warn!(kind = %error.kind, error = %error, "failed to load questions");
                Listing {
                    questions: Vec::new(),
                    error: Some(error),
                }
            }
        }
    }

    /// Posts a new question. On success the caller returns to the listing.
    ///
    /// Title and content are sent as given; validation is the server's job.
    ///
    /// # Errors
    /// `NotAuthenticated` without a token (nothing is sent), otherwise the
    /// API error with "Failed to post question." as fallback message.
    pub async fn submit_question(&self, draft: &QuestionDraft) -> ApiResult<Navigation> {
        self.session.require_token(ASK_LOGIN_MESSAGE)?;

        let _: Value = self
            .session
            .api()
            .post_json(QUESTIONS_PATH, draft, true)
            .await
            .map_err(|e| e.or_fallback(ASK_FAILED_MESSAGE))?;

        info!(title = %draft.title, "question posted");
        Ok(Navigation::Home)
    }

    /// Fetches one question.
    ///
    /// # Errors
    /// Returns the API error (404 for an unknown id).
    pub async fn question(&self, id: u64) -> ApiResult<Question> {
        self.session
            .api()
            .get_json(&format!("{QUESTIONS_PATH}/{id}"), false)
            .await
    }

    /// Fetches the answers of a question.
    ///
    /// # Errors
    /// Returns the API error of the request.
    pub async fn answers(&self, question_id: u64) -> ApiResult<Vec<Answer>> {
        let list: AnswerList = self
            .session
            .api()
            .get_json(&format!("{QUESTIONS_PATH}/{question_id}/answers"), false)
            .await?;
        Ok(list.into())
    }

    /// Question plus answers. The answers are only requested once the
    /// question is known to exist.
    ///
    /// # Errors
    /// Returns the first API error.
    pub async fn details(&self, id: u64) -> ApiResult<QuestionDetails> {
        let question = self.question(id).await?;
        let answers = self.answers(id).await?;
        Ok(QuestionDetails { question, answers })
    }

    /// Posts an answer. On success the caller shows the question again.
    ///
    /// # Errors
    /// `NotAuthenticated` without a token (nothing is sent), otherwise the
    /// API error with "Failed to post answer." as fallback message.
    pub async fn post_answer(&self, question_id: u64, draft: &AnswerDraft) -> ApiResult<Navigation> {
        self.session.require_token(ANSWER_LOGIN_MESSAGE)?;

        let path = format!("{QUESTIONS_PATH}/{question_id}/answers");
        let _: Value = self
            .session
            .api()
            .post_json(&path, draft, true)
            .await
            .map_err(|e| e.or_fallback(ANSWER_FAILED_MESSAGE))?;

        info!(question_id, "answer posted");
        Ok(Navigation::Question(question_id))
    }

    /// Casts, changes or withdraws a vote. Repeating a vote removes it.
    ///
    /// # Errors
    /// `NotAuthenticated` without a token (nothing is sent), otherwise the
    /// API error.
    pub async fn vote(&self, target: VoteTarget, direction: VoteDirection) -> ApiResult<VoteOutcome> {
        self.session.require_token(VOTE_LOGIN_MESSAGE)?;

        let request = VoteRequest::new(target, direction);
        let outcome: VoteOutcome = self.session.api().post_json(VOTES_PATH, &request, true).await?;
        info!(?target, %direction, action = ?outcome.action, "vote applied");
        Ok(outcome)
    }
}
