use proptest::prelude::*;

use crate::checklist::{PromptResponse, Room, RoomType, SiteVisit};
use crate::flow::{Reading, ResultData, StepCatalog, StepDefinition, TestOutcome};

pub fn arb_outcome() -> impl Strategy<Value = TestOutcome> {
    prop_oneof![
        Just(TestOutcome::Pass),
        Just(TestOutcome::Fail),
        Just(TestOutcome::NotApplicable),
        Just(TestOutcome::Limitation),
    ]
}

pub fn arb_result_data() -> impl Strategy<Value = ResultData> {
    (
        arb_outcome(),
        prop::option::of((0.0f64..500.0, "[A-Za-z]{1,3}")),
        prop::option::of(".{0,40}"),
    )
        .prop_map(|(outcome, reading, notes)| ResultData {
            outcome,
            reading: reading.map(|(value, unit)| Reading { value, unit }),
            notes,
        })
}

/// Catalog with `1..=max_steps` sequentially numbered steps.
pub fn arb_catalog(max_steps: usize) -> impl Strategy<Value = StepCatalog> {
    (1..=max_steps).prop_map(|len| {
        let steps = (1..=len)
            .map(|n| StepDefinition::new(format!("step-{n}"), format!("Step {n}")))
            .collect();
        StepCatalog::new("generated", "Generated", steps).expect("sequential ids are valid")
    })
}

fn arb_room_type() -> impl Strategy<Value = RoomType> {
    prop_oneof![
        Just(RoomType::Bathroom),
        Just(RoomType::Kitchen),
        Just(RoomType::Bedroom),
        Just(RoomType::LivingRoom),
        Just(RoomType::Hallway),
        Just(RoomType::Utility),
        Just(RoomType::Loft),
        Just(RoomType::Garage),
        Just(RoomType::Garden),
        Just(RoomType::Other),
    ]
}

fn arb_prompt_response() -> impl Strategy<Value = PromptResponse> {
    prop_oneof![
        Just(PromptResponse::Unanswered),
        any::<bool>().prop_map(PromptResponse::Flag),
        (0u8..3).prop_map(|n| PromptResponse::Number(f64::from(n))),
        prop_oneof![
            Just("yes"),
            Just("no"),
            Just("pre-2000"),
            Just("post-2000"),
            Just("")
        ]
        .prop_map(|s| PromptResponse::Text(s.to_string())),
    ]
}

pub fn arb_site_visit() -> impl Strategy<Value = SiteVisit> {
    let keys = prop_oneof![
        Just("occupied"),
        Just("property_age"),
        Just("working_at_height"),
        Just("solar_pv"),
        Just("ev_charger"),
        Just("unrelated"),
    ];
    (
        prop::collection::vec(arb_room_type().prop_map(Room::new), 0..8),
        prop::collection::btree_map(keys.prop_map(str::to_string), arb_prompt_response(), 0..6),
    )
        .prop_map(|(rooms, prompt_responses)| SiteVisit {
            rooms,
            prompt_responses,
        })
}
