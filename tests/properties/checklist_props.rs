use std::collections::HashMap;

use proptest::prelude::*;

use testflow::checklist::{
    Checklist, ChecklistItem, ItemSource, PromptResponse, Room, RoomType, SiteVisit,
    generate_checklist,
};

fn arb_room_type() -> impl Strategy<Value = RoomType> {
    prop_oneof![
        Just(RoomType::Bathroom),
        Just(RoomType::Kitchen),
        Just(RoomType::Bedroom),
        Just(RoomType::Loft),
        Just(RoomType::Garage),
        Just(RoomType::Garden),
        Just(RoomType::Other),
    ]
}

fn arb_answer() -> impl Strategy<Value = PromptResponse> {
    prop_oneof![
        any::<bool>().prop_map(PromptResponse::Flag),
        prop_oneof![Just("yes"), Just("no"), Just("pre-2000"), Just("1990s")]
            .prop_map(|text| PromptResponse::Text(text.to_string())),
        prop::collection::vec("[a-z]{1,6}", 0..3).prop_map(PromptResponse::Choices),
    ]
}

fn arb_visit() -> impl Strategy<Value = SiteVisit> {
    let key = prop_oneof![
        Just("occupied"),
        Just("property_age"),
        Just("working_at_height"),
        Just("solar_pv"),
        Just("ev_charger"),
    ];
    (
        prop::collection::vec(arb_room_type().prop_map(Room::new), 0..6),
        prop::collection::btree_map(key.prop_map(str::to_string), arb_answer(), 0..5),
    )
        .prop_map(|(rooms, prompt_responses)| SiteVisit {
            rooms,
            prompt_responses,
        })
}

type Key = (String, String, ItemSource);

fn key(item: &ChecklistItem) -> Key {
    (item.category.clone(), item.description.clone(), item.source)
}

fn keys(items: &[ChecklistItem]) -> Vec<Key> {
    items.iter().map(key).collect()
}

/// Whether `small` appears in `large` in the same relative order.
fn is_subsequence(small: &[Key], large: &[Key]) -> bool {
    let mut rest = large.iter();
    small.iter().all(|wanted| rest.any(|candidate| candidate == wanted))
}

proptest! {
    #[test]
    fn adding_a_room_never_removes_items(visit in arb_visit(), room in arb_room_type()) {
        let before = keys(&generate_checklist(&visit));
        let after = keys(&generate_checklist(&visit.clone().with_room(room)));
        prop_assert!(is_subsequence(&before, &after));
    }

    #[test]
    fn setting_a_truthy_prompt_never_removes_items(
        visit in arb_visit(),
        prompt in prop_oneof![Just("occupied"), Just("solar_pv"), Just("ev_charger")]
    ) {
        let mut without = visit.clone();
        without.prompt_responses.remove(prompt);
        let before = keys(&generate_checklist(&without));
        let after = keys(&generate_checklist(&without.with_prompt(prompt, PromptResponse::Flag(true))));
        prop_assert!(is_subsequence(&before, &after));
    }

    #[test]
    fn item_ids_are_unique(visit in arb_visit()) {
        let items = generate_checklist(&visit);
        let mut ids: Vec<_> = items.iter().map(|item| item.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn regeneration_keeps_ids_and_ticks(
        first in arb_visit(),
        second in arb_visit(),
        ticks in prop::collection::vec(any::<bool>(), 0..24)
    ) {
        let mut checklist = Checklist::generate(&first);
        let ids: Vec<String> = checklist.items().iter().map(|item| item.id.clone()).collect();
        for (id, tick) in ids.iter().zip(&ticks) {
            checklist.set_checked(id, *tick).unwrap();
        }
        let previous: HashMap<Key, (String, bool)> = checklist
            .items()
            .iter()
            .map(|item| (key(item), (item.id.clone(), item.checked)))
            .collect();

        checklist.regenerate(&second);

        prop_assert_eq!(keys(checklist.items()), keys(&generate_checklist(&second)));
        for item in checklist.items() {
            match previous.get(&key(item)) {
                Some((id, checked)) => {
                    prop_assert_eq!(&item.id, id);
                    prop_assert_eq!(item.checked, *checked);
                }
                None => prop_assert!(!item.checked),
            }
        }
    }
}
