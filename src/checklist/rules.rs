//! Fixed rule table for pre-start checklists.
//!
//! Declaration order is output order. Rules never interact.

use super::types::{ItemSource, RoomType, SiteVisit};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Trigger {
    Always,
    Room(RoomType),
    PromptTruthy(&'static str),
    PromptEquals(&'static str, &'static str),
}

impl Trigger {
    pub(crate) fn holds(self, visit: &SiteVisit) -> bool {
        match self {
            Self::Always => true,
            Self::Room(room_type) => visit.has_room(room_type),
            Self::PromptTruthy(key) => visit.prompt(key).is_some_and(|r| r.is_truthy()),
            Self::PromptEquals(key, value) => visit.prompt(key).is_some_and(|r| r.matches(value)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemTemplate {
    pub category: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub source: ItemSource,
    pub items: &'static [ItemTemplate],
}

const fn item(category: &'static str, description: &'static str, required: bool) -> ItemTemplate {
    ItemTemplate {
        category,
        description,
        required,
    }
}

const STANDARD_ITEMS: &[ItemTemplate] = &[
    item("Safety", "Carry out a dynamic risk assessment on arrival", true),
    item("Safety", "Confirm lock-off kit and warning labels are available for safe isolation", true),
    item("Safety", "Check PPE is available and in good condition", true),
    item("Site Setup", "Agree access, working areas and parking with the client", false),
    item("Site Setup", "Locate the consumer unit and main means of isolation", true),
    item("Tools", "Check the approved voltage indicator and proving unit", true),
    item("Tools", "Confirm the multifunction tester calibration is in date", true),
    item("Tools", "Confirm test leads and probes meet GS38", true),
    item("Documentation", "Review previous certificates and inspection reports", false),
    item("Documentation", "Prepare the schedule of inspections and test result forms", true),
];

pub(crate) const RULES: &[Rule] = &[
    Rule {
        name: "standard",
        trigger: Trigger::Always,
        source: ItemSource::Standard,
        items: STANDARD_ITEMS,
    },
    Rule {
        name: "bathroom-bonding",
        trigger: Trigger::Room(RoomType::Bathroom),
        source: ItemSource::Prompt,
        items: &[
            item("Bonding", "Verify supplementary bonding in the bathroom, or confirm the conditions for omitting it (701.415.2)", true),
            item("Bonding", "Confirm 30 mA RCD protection for all bathroom circuits", true),
        ],
    },
    Rule {
        name: "kitchen",
        trigger: Trigger::Room(RoomType::Kitchen),
        source: ItemSource::Room,
        items: &[item("Kitchen", "Check socket outlets and accessories are clear of the sink and hob", false)],
    },
    Rule {
        name: "garden",
        trigger: Trigger::Room(RoomType::Garden),
        source: ItemSource::Room,
        items: &[item("External", "Confirm RCD protection and IP rating for outdoor sockets and circuits", true)],
    },
    Rule {
        name: "garage",
        trigger: Trigger::Room(RoomType::Garage),
        source: ItemSource::Room,
        items: &[item("External", "Check for outbuilding submains or EV supply fed from the garage", false)],
    },
    Rule {
        name: "loft",
        trigger: Trigger::Room(RoomType::Loft),
        source: ItemSource::Room,
        items: &[item("Access", "Check loft hatch, boarding and lighting before entry", true)],
    },
    Rule {
        name: "occupied",
        trigger: Trigger::PromptTruthy("occupied"),
        source: ItemSource::Prompt,
        items: &[item("Communication", "Notify occupants of planned power interruptions", true)],
    },
    Rule {
        name: "asbestos",
        trigger: Trigger::PromptEquals("property_age", "pre-2000"),
        source: ItemSource::Prompt,
        items: &[item("Safety", "Check the asbestos register before drilling or lifting floors", true)],
    },
    Rule {
        name: "working-at-height",
        trigger: Trigger::PromptTruthy("working_at_height"),
        source: ItemSource::Prompt,
        items: &[item("Safety", "Inspect ladders and access equipment before use", true)],
    },
    Rule {
        name: "solar-pv",
        trigger: Trigger::PromptTruthy("solar_pv"),
        source: ItemSource::Prompt,
        items: &[
            item("Safety", "Isolate the PV inverter and confirm DC isolation before work", true),
            item("Documentation", "Record PV array and inverter details for the report", false),
        ],
    },
    Rule {
        name: "ev-charger",
        trigger: Trigger::PromptTruthy("ev_charger"),
        source: ItemSource::Prompt,
        items: &[item("Compliance", "Check the EV charge point earthing arrangement (722.411.4)", true)],
    },
];
