// File: nina-common/src/models/conversation.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a follow-up conversation. The wire spellings are the
/// Portuguese values the messaging subsystem writes and must not change.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    AguardandoAtivacao,
    EmAcompanhamento,
    HumanoSolicitado,
    Finalizada,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::AguardandoAtivacao => write!(f, "aguardando_ativacao"),
            ConversationStatus::EmAcompanhamento => write!(f, "em_acompanhamento"),
            ConversationStatus::HumanoSolicitado => write!(f, "humano_solicitado"),
            ConversationStatus::Finalizada => write!(f, "finalizada"),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aguardando_ativacao" => Ok(ConversationStatus::AguardandoAtivacao),
            "em_acompanhamento" => Ok(ConversationStatus::EmAcompanhamento),
            "humano_solicitado" => Ok(ConversationStatus::HumanoSolicitado),
            "finalizada" => Ok(ConversationStatus::Finalizada),
            _ => Err(format!("Unknown conversation status: {}", s)),
        }
    }
}

/// One messaging thread between the Nina agent and a patient for one
/// procedure. A patient can have several over time.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub conversation_id: Uuid,
    pub patient_id: Uuid,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who authored a message inside a conversation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Human,
    Ai,
}

impl fmt::Display for MessageSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSender::Human => write!(f, "human"),
            MessageSender::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for MessageSender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(MessageSender::Human),
            "ai" => Ok(MessageSender::Ai),
            _ => Err(format!("Unknown message sender: {}", s)),
        }
    }
}

/// A single message in a conversation. The append-only log guarantees
/// `created_at` never decreases within one conversation.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Message {
    pub message_id: Uuid,
    pub conversation_id: Uuid,
    /// Stored in the `type` column; `human` rows are patient-sent.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// An escalation event: the agent handed a conversation over to a human
/// operator. One row per escalation.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct HumanActivation {
    pub activation_id: Uuid,
    pub conversation_id: Uuid,
    pub created_at: DateTime<Utc>,
}
