use proptest::prelude::*;

use testflow::FlowError;
use testflow::validation::{Insulation, check_zs, grouping_factor, temperature_factor};

fn arb_insulation() -> impl Strategy<Value = Insulation> {
    prop_oneof![Just(Insulation::Thermoplastic), Just(Insulation::Thermosetting)]
}

fn table_max(insulation: Insulation) -> f64 {
    match insulation {
        Insulation::Thermoplastic => 60.0,
        Insulation::Thermosetting => 70.0,
    }
}

proptest! {
    #[test]
    fn intermediate_ambient_uses_next_row_up(
        insulation in arb_insulation(),
        step in 6u32..=12,
        below in 0.01f64..4.99
    ) {
        let row = f64::from(step) * 5.0;
        let ambient = row - below;
        prop_assert_eq!(
            temperature_factor(ambient, insulation).unwrap(),
            temperature_factor(row, insulation).unwrap()
        );
    }

    #[test]
    fn hotter_is_never_more_generous(
        insulation in arb_insulation(),
        a in 0.0f64..60.0,
        b in 0.0f64..60.0
    ) {
        let (cool, hot) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            temperature_factor(hot, insulation).unwrap()
                <= temperature_factor(cool, insulation).unwrap()
        );
    }

    #[test]
    fn ambient_above_table_is_out_of_range(
        insulation in arb_insulation(),
        excess in 0.1f64..200.0
    ) {
        let result = temperature_factor(table_max(insulation) + excess, insulation);
        let out_of_range = matches!(result, Err(FlowError::OutOfRange { .. }));
        prop_assert!(out_of_range);
    }

    #[test]
    fn more_circuits_never_raise_grouping_factor(a in 1u32..40, b in 1u32..40) {
        let (few, many) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(grouping_factor(many).unwrap() <= grouping_factor(few).unwrap());
    }

    #[test]
    fn zs_compliance_matches_margin(
        measured in 0.0f64..5.0,
        max in 0.1f64..5.0,
        correction in 0.5f64..=1.0
    ) {
        let assessment = check_zs(measured, max, correction);
        prop_assert_eq!(assessment.compliant, assessment.margin >= 0.0);
    }
}
