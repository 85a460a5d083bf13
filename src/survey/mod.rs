//! Fixed layout of the survey sheet.
//!
//! This module provides:
//! - The four region definitions (bounds, title, answer vocabulary)
//! - Region cropping
//! - Per-region prompt text

pub mod crop;
pub mod prompts;

pub use crop::{crop_region, encode_png};
pub use prompts::build_prompt;

use serde::Serialize;

/// Pixel rectangle in source-image space: top-left (x1, y1), bottom-right (x2, y2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "[u32; 4]")]
pub struct Bounds {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Bounds {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub const fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub const fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

impl From<Bounds> for [u32; 4] {
    fn from(b: Bounds) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One example question embedded in a region's prompt.
#[derive(Clone, Copy, Debug)]
pub struct ExampleQuestion {
    pub question: &'static str,
    pub answer: &'static str,
}

/// One section of the survey sheet.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    /// Section letter ("A".."D"), also the key in the aggregate result
    pub id: &'static str,
    pub bounds: Bounds,
    /// Section heading as printed on the sheet
    pub title: &'static str,
    /// Closed set of answer choices for this section, left to right
    pub choices: &'static [&'static str],
    pub example: ExampleQuestion,
}

/// Region table, in processing order.
pub static REGIONS: [Region; 4] = [
    Region {
        id: "A",
        bounds: Bounds::new(47, 156, 880, 499),
        title: "あなたの仕事について",
        choices: &["そうだ", "まあそうだ", "ややちがう", "ちがう"],
        example: ExampleQuestion {
            question: "非常にたくさんの仕事をしなければならない",
            answer: "そうだ",
        },
    },
    Region {
        id: "B",
        bounds: Bounds::new(47, 504, 880, 902),
        title: "最近1か月間のあなたの状態について",
        choices: &[
            "ほとんどいつもあった",
            "しばしばあった",
            "ときどきあった",
            "ほとんどなかった",
        ],
        example: ExampleQuestion {
            question: "活気がわいてくる",
            answer: "ほとんどなかった",
        },
    },
    Region {
        id: "C",
        bounds: Bounds::new(47, 906, 881, 1083),
        title: "あなたの周りの方々について",
        choices: &["非常に", "かなり", "多少", "ない", "全くない"],
        example: ExampleQuestion {
            question: "上司",
            answer: "非常に",
        },
    },
    Region {
        id: "D",
        bounds: Bounds::new(45, 1083, 320, 1200),
        title: "満足度について",
        choices: &["満足", "まあ満足", "やや不満足", "不満足"],
        example: ExampleQuestion {
            question: "仕事に満足だ",
            answer: "満足",
        },
    },
];

/// Region table as `{id: [x1, y1, x2, y2]}`, in definition order.
pub fn bounds_table() -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = REGIONS
        .iter()
        .map(|r| (r.id.to_string(), serde_json::json!(r.bounds)))
        .collect();
    serde_json::Value::Object(map)
}
