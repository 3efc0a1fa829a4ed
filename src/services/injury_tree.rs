//! Rebuilds the injury → rehab hierarchy from a user's flat `injury_logs` rows.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::injury_log::{InjuryLog, LogType};
use crate::services::emotion::{attach, WithEmotion};

#[derive(Debug, Clone, Serialize)]
pub struct InjuryWithRehabs {
    #[serde(flatten)]
    pub injury: WithEmotion<InjuryLog>,
    pub rehab_logs: Vec<WithEmotion<InjuryLog>>,
}

/// Group rehab entries under their parent injury.
///
/// Injuries keep their input order and rehab entries keep their relative
/// order under each parent. Rehab entries whose parent is not in `records`
/// are dropped. Emotion is decoded per record; a bad blob only nulls that
/// record's field.
pub fn assemble(records: Vec<InjuryLog>) -> Vec<InjuryWithRehabs> {
    let mut tree: Vec<InjuryWithRehabs> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut pending = Vec::new();

    for record in records {
        match record.log_type {
            LogType::Injury => {
                index.insert(record.id, tree.len());
                tree.push(InjuryWithRehabs {
                    injury: attach(record),
                    rehab_logs: Vec::new(),
                });
            }
            LogType::Rehab => pending.push(record),
        }
    }

    for rehab in pending {
        let slot = rehab
            .parent_injury_id
            .and_then(|parent| index.get(&parent).copied());
        match slot {
            Some(i) => tree[i].rehab_logs.push(attach(rehab)),
            None => tracing::debug!(
                log_id = rehab.id,
                parent_injury_id = ?rehab.parent_injury_id,
                "Dropping rehab log without a parent injury"
            ),
        }
    }

    tree
}
