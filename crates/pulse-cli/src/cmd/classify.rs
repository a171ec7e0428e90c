use crate::output::print_json;
use pulse_core::classifier::{default_rules, Classifier, HealthSignals};

pub fn run(
    blockers: usize,
    sentiment: f64,
    warning_signs: usize,
    json: bool,
) -> anyhow::Result<()> {
    let signals = HealthSignals {
        blocker_count: blockers,
        sentiment,
        warning_sign_count: warning_signs,
    };
    let status = Classifier::new(default_rules()).classify(&signals);

    if json {
        return print_json(&serde_json::json!({ "health": status }));
    }
    println!("{status}");
    Ok(())
}
