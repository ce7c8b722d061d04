use testflow::checklist::{ChecklistItem, ItemSource, RoomType, SiteVisit, generate_checklist};
use testflow::flow::StepCatalog;

fn render(items: &[ChecklistItem]) -> String {
    items
        .iter()
        .map(|item| {
            let source = match item.source {
                ItemSource::Standard => "standard",
                ItemSource::Prompt => "prompt",
                ItemSource::Room => "room",
            };
            let optional = if item.required { "" } else { " (optional)" };
            format!("[{source}] {}: {}{optional}", item.category, item.description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn bathroom_and_kitchen_checklist() {
    let visit = SiteVisit::default()
        .with_room(RoomType::Kitchen)
        .with_room(RoomType::Bathroom);
    insta::assert_snapshot!(render(&generate_checklist(&visit)), @r"
    [standard] Safety: Carry out a dynamic risk assessment on arrival
    [standard] Safety: Confirm lock-off kit and warning labels are available for safe isolation
    [standard] Safety: Check PPE is available and in good condition
    [standard] Site Setup: Agree access, working areas and parking with the client (optional)
    [standard] Site Setup: Locate the consumer unit and main means of isolation
    [standard] Tools: Check the approved voltage indicator and proving unit
    [standard] Tools: Confirm the multifunction tester calibration is in date
    [standard] Tools: Confirm test leads and probes meet GS38
    [standard] Documentation: Review previous certificates and inspection reports (optional)
    [standard] Documentation: Prepare the schedule of inspections and test result forms
    [prompt] Bonding: Verify supplementary bonding in the bathroom, or confirm the conditions for omitting it (701.415.2)
    [prompt] Bonding: Confirm 30 mA RCD protection for all bathroom circuits
    [room] Kitchen: Check socket outlets and accessories are clear of the sink and hob (optional)
    ");
}

#[test]
fn eicr_catalog_outline() {
    let catalog = StepCatalog::builtin("eicr").unwrap();
    let outline = catalog
        .steps()
        .iter()
        .map(|step| match &step.expected {
            Some(expected) => {
                let mut line = format!("{} [{}]", step.id, expected.unit);
                if let Some(min) = expected.min {
                    line.push_str(&format!(" >= {min}"));
                }
                if let Some(max) = expected.max {
                    line.push_str(&format!(" <= {max}"));
                }
                line
            }
            None => step.id.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(outline, @r"
    safe-isolation
    continuity-cpc
    ring-continuity
    insulation-resistance [MΩ] >= 1
    polarity
    earth-electrode [Ω] <= 200
    ze [Ω] <= 0.8
    zs
    pfc
    rcd [ms] <= 300
    functional
    ");
}
