use molgen::prelude::*;
use thiserror::Error;

use crate::generated::{
    Campaign, ProtocolData, Submission, UserProgress, CAMPAIGN, PROTOCOL_DATA, USER_PROGRESS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Quest {quest_id} is not part of campaign {campaign_id}")]
    UnknownQuest { campaign_id: Hex, quest_id: u32 },

    #[error("Quest {quest_id} has no subtask {subtask_id}")]
    UnknownSubtask { quest_id: u32, subtask_id: u8 },

    #[error("Subtask {subtask_id} of quest {quest_id} was already submitted")]
    DuplicateSubmission { quest_id: u32, subtask_id: u8 },

    #[error("Quest {quest_id} reached its completion limit")]
    QuestFull { quest_id: u32 },

    #[error("The progress record belongs to campaign {found}, not {expected}")]
    WrongCampaign { expected: Hex, found: Hex },

    #[error("Counter {counter} would overflow")]
    CounterOverflow { counter: &'static str },
}

/// A record stored as the data of one cell.
pub trait CellRecord: Sized {
    const KIND: &'static str;

    fn to_cell_data(&self) -> Result<Vec<u8>, CodecError>;

    fn from_cell_data(data: &[u8]) -> Result<Self, CodecError>;

    /// Cell data as the `0x`-prefixed hex string RPCs return.
    fn to_cell_data_hex(&self) -> Result<Hex, CodecError> {
        Ok(to_hex(&self.to_cell_data()?))
    }

    fn from_cell_data_hex(data: &str) -> Result<Self, CodecError> {
        Self::from_cell_data(&from_hex(data)?)
    }
}

macro_rules! cell_record {
    ($type:ty, $codec:expr, $kind:literal) => {
        impl CellRecord for $type {
            const KIND: &'static str = $kind;

            fn to_cell_data(&self) -> Result<Vec<u8>, CodecError> {
                $codec.encode(self)
            }

            fn from_cell_data(data: &[u8]) -> Result<Self, CodecError> {
                $codec.decode(data)
            }
        }
    };
}

cell_record!(Campaign, CAMPAIGN, "campaign");
cell_record!(UserProgress, USER_PROGRESS, "user");
cell_record!(ProtocolData, PROTOCOL_DATA, "protocol");

fn bump(value: u32, by: u32, counter: &'static str) -> Result<u32, RecordError> {
    value.checked_add(by).ok_or(RecordError::CounterOverflow { counter })
}

fn same_hash(a: &str, b: &str) -> bool {
    a.trim_start_matches("0x").eq_ignore_ascii_case(b.trim_start_matches("0x"))
}

/// Applies a user's submission to their progress record and to the campaign.
///
/// A quest counts as completed once every one of its subtasks has a
/// submission (quests without subtasks complete on the first submission);
/// completion awards the quest's points once.
pub fn record_submission(
    campaign: &mut Campaign,
    progress: &mut UserProgress,
    submission: Submission,
) -> Result<(), RecordError> {
    if !same_hash(&progress.campaign_id, &campaign.id) {
        return Err(RecordError::WrongCampaign {
            expected: campaign.id.clone(),
            found:    progress.campaign_id.clone(),
        });
    }

    let quest_id = submission.quest_id;
    let subtask_id = submission.subtask_id;
    let quest = campaign
        .quests
        .iter_mut()
        .find(|quest| quest.id == quest_id)
        .ok_or_else(|| RecordError::UnknownQuest { campaign_id: campaign.id.clone(), quest_id })?;

    if !quest.sub_tasks.is_empty() && !quest.sub_tasks.iter().any(|task| task.id == subtask_id) {
        return Err(RecordError::UnknownSubtask { quest_id, subtask_id });
    }
    if progress
        .submissions
        .iter()
        .any(|previous| previous.quest_id == quest_id && previous.subtask_id == subtask_id)
    {
        return Err(RecordError::DuplicateSubmission { quest_id, subtask_id });
    }

    let completes = !progress.completed_quest_ids.contains(&quest_id)
        && quest.sub_tasks.iter().all(|task| {
            task.id == subtask_id
                || progress
                    .submissions
                    .iter()
                    .any(|s| s.quest_id == quest_id && s.subtask_id == task.id)
        });
    if completes && quest.max_completions != 0 && quest.completion_count >= quest.max_completions {
        return Err(RecordError::QuestFull { quest_id });
    }

    let first_activity = progress.submissions.is_empty();
    // Counters are computed up front so an overflow leaves both records untouched.
    let completion = if completes {
        Some((
            bump(quest.completion_count, 1, "completion_count")?,
            bump(campaign.total_completions, 1, "total_completions")?,
            bump(progress.total_points, quest.points, "total_points")?,
        ))
    } else {
        None
    };
    let participants = if first_activity {
        Some(bump(campaign.participants_count, 1, "participants_count")?)
    } else {
        None
    };

    if submission.submission_timestamp > progress.last_activity_timestamp {
        progress.last_activity_timestamp = submission.submission_timestamp.clone();
    }
    progress.submissions.push(submission);

    if let Some((completion_count, total_completions, total_points)) = completion {
        quest.completion_count = completion_count;
        campaign.total_completions = total_completions;
        progress.completed_quest_ids.push(quest_id);
        progress.total_points = total_points;
    }
    if let Some(participants_count) = participants {
        campaign.participants_count = participants_count;
    }
    Ok(())
}

/// Adds `campaign` to the approved list, replacing an earlier version with
/// the same id.
pub fn approve_campaign(protocol: &mut ProtocolData, campaign: Campaign) {
    match protocol
        .campaigns_approved
        .iter_mut()
        .find(|approved| same_hash(&approved.id, &campaign.id))
    {
        Some(existing) => *existing = campaign,
        None => protocol.campaigns_approved.push(campaign),
    }
}

pub fn is_endorser_whitelisted(protocol: &ProtocolData, lock_hash: &str) -> bool {
    protocol
        .endorsers_whitelist
        .iter()
        .any(|endorser| same_hash(&endorser.endorser_lock_hash, lock_hash))
}

pub fn is_admin(protocol: &ProtocolData, lock_hash: &str) -> bool {
    protocol
        .protocol_config
        .admin_lock_hash_vec
        .iter()
        .any(|admin| same_hash(admin, lock_hash))
}
