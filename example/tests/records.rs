use molgen::prelude::*;
use quest_records::{
    records::{approve_campaign, is_admin, is_endorser_whitelisted, record_submission},
    *,
};

fn hash(byte: u8) -> Hex {
    to_hex(&[byte; 32])
}

fn campaign() -> Campaign {
    let task = |id: u8| QuestSubTask { id, title: format!("Step {}", id), ..QuestSubTask::default() };
    Campaign {
        id: hash(0x01),
        quests: vec![
            QuestData { id: 1, points: 10, ..QuestData::default() },
            QuestData { id: 2, points: 25, sub_tasks: vec![task(1), task(2)], ..QuestData::default() },
            QuestData { id: 3, points: 5, max_completions: 1, completion_count: 1, ..QuestData::default() },
        ],
        ..Campaign::default()
    }
}

fn progress() -> UserProgress {
    UserProgress { user_lock_hash: hash(0x02), campaign_id: hash(0x01), ..UserProgress::default() }
}

fn submission(quest_id: u32, subtask_id: u8, at: u64) -> Submission {
    Submission {
        user_lock_hash: hash(0x02),
        quest_id,
        subtask_id,
        submission_timestamp: BigUint::from(at),
        ..Submission::default()
    }
}

#[test]
fn quest_without_subtasks_completes_at_once() {
    let (mut campaign, mut progress) = (campaign(), progress());
    record_submission(&mut campaign, &mut progress, submission(1, 0, 100)).unwrap();

    assert_eq!(progress.completed_quest_ids, vec![1]);
    assert_eq!(progress.total_points, 10);
    assert_eq!(progress.last_activity_timestamp, BigUint::from(100u32));
    assert_eq!(campaign.quests[0].completion_count, 1);
    assert_eq!(campaign.total_completions, 1);
    assert_eq!(campaign.participants_count, 1);
}

#[test]
fn quest_completes_after_every_subtask() {
    let (mut campaign, mut progress) = (campaign(), progress());
    record_submission(&mut campaign, &mut progress, submission(2, 2, 200)).unwrap();
    assert!(progress.completed_quest_ids.is_empty());

    record_submission(&mut campaign, &mut progress, submission(2, 1, 150)).unwrap();
    assert_eq!(progress.completed_quest_ids, vec![2]);
    assert_eq!(progress.total_points, 25);
    assert_eq!(progress.submissions.len(), 2);
    // The clock never moves backwards.
    assert_eq!(progress.last_activity_timestamp, BigUint::from(200u32));
    assert_eq!(campaign.participants_count, 1);
}

#[test]
fn rejected_submissions_leave_records_untouched() {
    let (mut campaign, mut progress) = (campaign(), progress());
    let (before_campaign, before_progress) = (campaign.clone(), progress.clone());

    assert_eq!(
        record_submission(&mut campaign, &mut progress, submission(9, 0, 1)),
        Err(RecordError::UnknownQuest { campaign_id: hash(0x01), quest_id: 9 })
    );
    assert_eq!(
        record_submission(&mut campaign, &mut progress, submission(2, 7, 1)),
        Err(RecordError::UnknownSubtask { quest_id: 2, subtask_id: 7 })
    );
    assert_eq!(
        record_submission(&mut campaign, &mut progress, submission(3, 0, 1)),
        Err(RecordError::QuestFull { quest_id: 3 })
    );
    assert_eq!(campaign, before_campaign);
    assert_eq!(progress, before_progress);

    record_submission(&mut campaign, &mut progress, submission(2, 1, 1)).unwrap();
    assert_eq!(
        record_submission(&mut campaign, &mut progress, submission(2, 1, 2)),
        Err(RecordError::DuplicateSubmission { quest_id: 2, subtask_id: 1 })
    );

    let mut stranger = UserProgress { campaign_id: hash(0x09), ..UserProgress::default() };
    assert!(matches!(
        record_submission(&mut campaign, &mut stranger, submission(1, 0, 1)),
        Err(RecordError::WrongCampaign { .. })
    ));
}

#[test]
fn counter_overflow_is_an_error() {
    let (mut campaign, mut progress) = (campaign(), progress());
    progress.total_points = u32::MAX - 5;
    let (before_campaign, before_progress) = (campaign.clone(), progress.clone());

    assert_eq!(
        record_submission(&mut campaign, &mut progress, submission(1, 0, 100)),
        Err(RecordError::CounterOverflow { counter: "total_points" })
    );
    assert_eq!(campaign, before_campaign);
    assert_eq!(progress, before_progress);

    let (mut campaign, mut progress) = (self::campaign(), self::progress());
    campaign.participants_count = u32::MAX;
    assert_eq!(
        record_submission(&mut campaign, &mut progress, submission(2, 1, 100)),
        Err(RecordError::CounterOverflow { counter: "participants_count" })
    );
    assert!(progress.submissions.is_empty());
}

#[test]
fn protocol_helpers() {
    let mut protocol = ProtocolData::default();
    protocol.protocol_config.admin_lock_hash_vec.push(hash(0xad));
    protocol.endorsers_whitelist.push(EndorserInfo { endorser_lock_hash: hash(0xe1), ..EndorserInfo::default() });

    approve_campaign(&mut protocol, campaign());
    let mut updated = campaign();
    updated.status = 3;
    approve_campaign(&mut protocol, updated);
    assert_eq!(protocol.campaigns_approved.len(), 1);
    assert_eq!(protocol.campaigns_approved[0].status, 3);

    assert!(is_admin(&protocol, &hash(0xad).to_uppercase().replace("0X", "0x")));
    assert!(!is_admin(&protocol, &hash(0xae)));
    assert!(is_endorser_whitelisted(&protocol, &hash(0xe1)[2..]));
}

#[test]
fn cell_records_round_trip_through_hex() {
    let mut campaign = campaign();
    campaign.creator.code_hash = hash(0x10);
    campaign.creator.args = "0x".to_string();
    campaign.endorser.endorser_lock_hash = hash(0x20);
    for quest in &mut campaign.quests {
        quest.campaign_id = hash(0x01);
    }

    let hex = campaign.to_cell_data_hex().unwrap();
    assert_eq!(Campaign::from_cell_data_hex(&hex).unwrap(), campaign);
    assert_eq!(<Campaign as CellRecord>::KIND, "campaign");
    assert!(Campaign::from_cell_data_hex("0xzz").is_err());
}
