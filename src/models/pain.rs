use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Per-body-part pain level, 0 (none) to 10.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct PainMap {
    pub pain_head: i32,
    pub pain_neck: i32,
    pub pain_shoulder: i32,
    pub pain_chest: i32,
    pub pain_abdomen: i32,
    pub pain_waist: i32,
    pub pain_arm: i32,
    pub pain_wrist: i32,
    pub pain_pelvis: i32,
    pub pain_thigh: i32,
    pub pain_knee: i32,
    pub pain_calf: i32,
    pub pain_ankle: i32,
    pub pain_foot: i32,
}

impl PainMap {
    /// Column names in bind order, see [`PainMap::values`].
    pub const COLUMNS: [&'static str; 14] = [
        "pain_head",
        "pain_neck",
        "pain_shoulder",
        "pain_chest",
        "pain_abdomen",
        "pain_waist",
        "pain_arm",
        "pain_wrist",
        "pain_pelvis",
        "pain_thigh",
        "pain_knee",
        "pain_calf",
        "pain_ankle",
        "pain_foot",
    ];

    pub fn values(&self) -> [i32; 14] {
        [
            self.pain_head,
            self.pain_neck,
            self.pain_shoulder,
            self.pain_chest,
            self.pain_abdomen,
            self.pain_waist,
            self.pain_arm,
            self.pain_wrist,
            self.pain_pelvis,
            self.pain_thigh,
            self.pain_knee,
            self.pain_calf,
            self.pain_ankle,
            self.pain_foot,
        ]
    }
}

/// Pain fields as submitted; anything left out is stored as 0.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PainInput {
    #[validate(range(min = 0, max = 10))]
    pub pain_head: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_neck: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_shoulder: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_chest: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_abdomen: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_waist: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_arm: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_wrist: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_pelvis: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_thigh: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_knee: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_calf: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_ankle: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub pain_foot: Option<i32>,
}

impl From<PainInput> for PainMap {
    fn from(p: PainInput) -> Self {
        Self {
            pain_head: p.pain_head.unwrap_or(0),
            pain_neck: p.pain_neck.unwrap_or(0),
            pain_shoulder: p.pain_shoulder.unwrap_or(0),
            pain_chest: p.pain_chest.unwrap_or(0),
            pain_abdomen: p.pain_abdomen.unwrap_or(0),
            pain_waist: p.pain_waist.unwrap_or(0),
            pain_arm: p.pain_arm.unwrap_or(0),
            pain_wrist: p.pain_wrist.unwrap_or(0),
            pain_pelvis: p.pain_pelvis.unwrap_or(0),
            pain_thigh: p.pain_thigh.unwrap_or(0),
            pain_knee: p.pain_knee.unwrap_or(0),
            pain_calf: p.pain_calf.unwrap_or(0),
            pain_ankle: p.pain_ankle.unwrap_or(0),
            pain_foot: p.pain_foot.unwrap_or(0),
        }
    }
}
