use testflow::checklist::{
    Checklist, ItemSource, PromptResponse, RoomType, SiteVisit, generate_checklist,
};
use testflow::test_utils::fixtures::UnitTestFixture;

#[test]
fn bathroom_only_visit_adds_two_bonding_items() {
    let visit = SiteVisit::default().with_room(RoomType::Bathroom);
    let items = generate_checklist(&visit);
    assert_eq!(items.len(), 12);

    let extra: Vec<_> = items.iter().skip(10).collect();
    assert!(extra.iter().all(|item| item.source == ItemSource::Prompt));
    assert!(extra.iter().all(|item| item.category == "Bonding"));
    assert!(items.iter().all(|item| !item.checked));
}

#[test]
fn visit_file_drives_generation() {
    let fixture = UnitTestFixture::new();
    let path = fixture.create_visit(
        "survey",
        "rooms:\n  - room_type: loft\n  - room_type: garden\nprompt_responses:\n  property_age: pre-2000\n  ev_charger: \"yes\"\n",
    );
    let visit = SiteVisit::load(&path).unwrap();
    assert!(visit.has_room(RoomType::Loft));
    assert_eq!(
        visit.prompt("property_age"),
        Some(&PromptResponse::Text("pre-2000".to_string()))
    );

    let checklist = Checklist::generate(&visit);
    let descriptions: Vec<_> = checklist
        .items()
        .iter()
        .skip(10)
        .map(|item| item.category.as_str())
        .collect();
    assert_eq!(descriptions, ["External", "Access", "Safety", "Compliance"]);
}

#[test]
fn camel_case_visit_keys_are_accepted() {
    let fixture = UnitTestFixture::new();
    let path = fixture.create_file(
        "visit.json",
        r#"{"rooms":[{"roomType":"kitchen"}],"promptResponses":{"occupied":true}}"#,
    );
    let visit = SiteVisit::load(&path).unwrap();
    assert_eq!(generate_checklist(&visit).len(), 12);
}

#[test]
fn readiness_requires_every_required_item() {
    let mut checklist = Checklist::generate(&SiteVisit::default());
    let required: Vec<String> = checklist
        .items()
        .iter()
        .filter(|item| item.required)
        .map(|item| item.id.clone())
        .collect();
    assert_eq!(required.len(), 8);

    for id in &required[..7] {
        checklist.set_checked(id, true).unwrap();
    }
    assert!(!checklist.is_ready());
    checklist.toggle(&required[7]).unwrap();
    assert!(checklist.is_ready());
}

#[test]
fn regenerate_drops_items_whose_rule_no_longer_holds() {
    let visit = SiteVisit::default()
        .with_room(RoomType::Garage)
        .with_prompt("solar_pv", PromptResponse::Flag(true));
    let mut checklist = Checklist::generate(&visit);
    assert_eq!(checklist.items().len(), 13);

    checklist.regenerate(&SiteVisit::default().with_room(RoomType::Garage));
    assert_eq!(checklist.items().len(), 11);
    assert_eq!(checklist.items()[10].source, ItemSource::Room);
}
