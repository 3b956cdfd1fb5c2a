use std::fmt::Write;

use crate::model::ParsedEntities;

pub const SYSTEM_PROMPT: &str = "You are a hardware test engineer. Convert parsed board info into a step-by-step bring-up/test procedure. Include setup, equipment, expected values (with tolerances), and clear pass/fail criteria.";

const OUTPUT_INSTRUCTIONS: &str = "Output a Markdown document with sections: Setup, Visual Inspection, Voltage Rail Checks, Oscillator Checks, Firmware Programming, Functional Tests, and short Notes.";

const CLOSING_INSTRUCTIONS: &str = "Improve clarity and add short safety/DFT notes. Keep it concise.";

pub fn build_user_prompt(entities: &ParsedEntities, context: Option<&str>) -> String {
    let mut prompt = String::from("Parsed Entities:\n");
    let _ = writeln!(prompt, "- title: {}", entities.title);

    prompt.push_str("- rails:\n");
    for rail in &entities.rails {
        let _ = writeln!(
            prompt,
            "  - {}: {:?} V ±{} mV",
            rail.name, rail.voltage, rail.tolerance_mv
        );
    }

    prompt.push_str("- oscillators:\n");
    for osc in &entities.oscillators {
        let _ = writeln!(
            prompt,
            "  - {}: {:?} Hz ±{} Hz",
            osc.reference, osc.frequency_hz, osc.tolerance_hz
        );
    }

    prompt.push_str("- functional_tests:\n");
    for test in &entities.functional_tests {
        let _ = writeln!(
            prompt,
            "  - {}: cmd={}",
            test.name,
            test.command.as_deref().unwrap_or("none")
        );
    }

    prompt.push('\n');
    prompt.push_str(OUTPUT_INSTRUCTIONS);

    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
        let _ = write!(prompt, "\n\nRelevant Context from Library:\n{}", ctx);
    }

    let _ = write!(prompt, "\n\n{}", CLOSING_INSTRUCTIONS);
    prompt
}
