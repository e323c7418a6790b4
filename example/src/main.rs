// example/src/main.rs

use molgen::{decode_to_json, prelude::*};
use quest_records::{
    records::record_submission, AssetAmount, Campaign, CampaignMetadata, CellRecord, EndorserInfo,
    QuestData, QuestSubTask, Submission, UserProgress, CAMPAIGN,
};

fn hash(byte: u8) -> Hex {
    to_hex(&[byte; 32])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut campaign = Campaign {
        id: hash(0x01),
        creator: Script { code_hash: hash(0x10), hash_type: HashType::Type, args: "0x".to_string() },
        metadata: CampaignMetadata {
            title: "Onboarding".to_string(),
            short_description: "Learn the basics".to_string(),
            categories: vec!["education".to_string()],
            ..CampaignMetadata::default()
        },
        quests: vec![QuestData {
            id: 1,
            campaign_id: hash(0x01),
            title: "Say hello".to_string(),
            points: 50,
            rewards_on_completion: vec![AssetAmount {
                udt_hash: hash(0xaa),
                amount:   BigUint::from(1_000u32),
            }],
            sub_tasks: vec![QuestSubTask {
                id: 1,
                title: "Post on the forum".to_string(),
                type_: "link".to_string(),
                ..QuestSubTask::default()
            }],
            ..QuestData::default()
        }],
        endorser: EndorserInfo {
            endorser_lock_hash: hash(0x20),
            endorser_name: "Quest Guild".to_string(),
            verified: 1,
            ..EndorserInfo::default()
        },
        created_at: BigUint::from(1_700_000_000u64),
        ..Campaign::default()
    };

    let mut progress = UserProgress {
        user_lock_hash: hash(0x02),
        campaign_id: hash(0x01),
        ..UserProgress::default()
    };
    record_submission(
        &mut campaign,
        &mut progress,
        Submission {
            user_lock_hash: hash(0x02),
            quest_id: 1,
            subtask_id: 1,
            submission_timestamp: BigUint::from(1_700_000_100u64),
            submission_content: "https://forum.example/t/1".to_string(),
            proof: hash(0x03),
            signature: None,
        },
    )?;

    let data = campaign.to_cell_data()?;
    println!("campaign cell data: {} bytes", data.len());
    println!("user progress: {} points, {} quests", progress.total_points, progress.completed_quest_ids.len());

    let json = decode_to_json(&CAMPAIGN, &data)?;
    println!("{}", json);
    Ok(())
}
