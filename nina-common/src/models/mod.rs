// File: nina-common/src/models/mod.rs
pub mod conversation;
pub mod follow_up;
pub mod metrics;
pub mod organization;
pub mod patient;

pub use conversation::{Conversation, ConversationStatus, HumanActivation, Message, MessageSender};
pub use follow_up::FollowUp;
pub use metrics::{
    ratio_percentage, MetricCount, MetricsSnapshot, OrganizationProfile, UpcomingAppointment,
};
pub use organization::{OperatorProfile, Organization};
pub use patient::Patient;
