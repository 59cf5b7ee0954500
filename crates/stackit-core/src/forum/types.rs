//! Wire types for questions, answers, users and votes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A forum question as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub title: String,
    /// Rich-text body. The backend calls this `content` on some routes.
    #[serde(default, alias = "content")]
    pub body: String,
    /// Net vote count; absent or null means zero.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub votes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// An answer attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: u64,
    #[serde(default)]
    pub question_id: Option<u64>,
    #[serde(default, alias = "body")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub reputation: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Question list payload: `{"questions": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum QuestionList {
    Wrapped { questions: Vec<Question> },
    Bare(Vec<Question>),
}

impl From<QuestionList> for Vec<Question> {
    fn from(list: QuestionList) -> Self {
        match list {
            QuestionList::Wrapped { questions } | QuestionList::Bare(questions) => questions,
        }
    }
}

/// Answer list payload: a bare array or `{"answers": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum AnswerList {
    Wrapped { answers: Vec<Answer> },
    Bare(Vec<Answer>),
}

impl From<AnswerList> for Vec<Answer> {
    fn from(list: AnswerList) -> Self {
        match list {
            AnswerList::Wrapped { answers } | AnswerList::Bare(answers) => answers,
        }
    }
}

/// A question with its answers, for the details view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDetails {
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// Draft of a new question. Passed through without validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionDraft {
    pub title: String,
    pub content: String,
}

/// Draft of a new answer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnswerDraft {
    pub content: String,
}

/// Optional pagination for the question listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Query string including the leading `?`, or empty when unset.
    pub fn to_query_string(self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(per_page) = self.per_page {
            serializer.append_pair("per_page", &per_page.to_string());
        }
        let query = serializer.finish();
        if query.is_empty() {
            query
        } else {
            format!("?{query}")
        }
    }
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl FromStr for VoteDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("Invalid vote type '{other}'. Must be \"up\" or \"down\"")),
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteDirection::Up => write!(f, "up"),
            VoteDirection::Down => write!(f, "down"),
        }
    }
}

/// What a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Question(u64),
    Answer(u64),
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<u64>,
    pub vote_type: VoteDirection,
}

impl VoteRequest {
    pub fn new(target: VoteTarget, direction: VoteDirection) -> Self {
        let (question_id, answer_id) = match target {
            VoteTarget::Question(id) => (Some(id), None),
            VoteTarget::Answer(id) => (None, Some(id)),
        };
        Self {
            question_id,
            answer_id,
            vote_type: direction,
        }
    }
}

/// How the server applied a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Created,
    Changed,
    Removed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub action: VoteAction,
    #[serde(default)]
    pub vote_counts: VoteCounts,
    #[serde(default)]
    pub reputation_change: i64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

fn default_true() -> bool {
    true
}
