//! Text report — bar/beat-labeled rendering of a pipeline result.

use std::fmt::Write;

use super::PipelineResult;
use crate::timeline::BEATS_PER_BAR;

/// Render a pipeline result as a human-readable report: the timeline
/// structure followed by each part's resolved events.
pub fn format_note_events(result: &PipelineResult) -> String {
    let rule = "=".repeat(60);
    let divider = "-".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "RESOLVED NOTE EVENTS");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Key: {}", result.timeline.key);
    let _ = writeln!(out, "Total Bars: {}", result.timeline.bars.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "Timeline Structure:");
    let _ = writeln!(out, "{divider}");
    for bar in &result.timeline.bars {
        let _ = writeln!(
            out,
            "Bar {} (beats {}-{}): {}",
            bar.index + 1,
            bar.start_beat,
            bar.start_beat + BEATS_PER_BAR - 1,
            bar.chord_degree
        );
    }

    for part_data in &result.note_events {
        let _ = writeln!(out);
        let _ = writeln!(out, "Part: {} ({})", part_data.part.name, part_data.part.id);
        let _ = writeln!(out, "{divider}");

        if part_data.events.is_empty() {
            let _ = writeln!(out, "  (no events)");
        } else {
            for event in &part_data.events {
                let bar = (event.start_beat - 1) / BEATS_PER_BAR + 1;
                let beat_in_bar = (event.start_beat - 1) % BEATS_PER_BAR + 1;
                let plural = if event.duration != 1.0 { "s" } else { "" };
                let _ = writeln!(
                    out,
                    "  Beat {} (Bar {}, Beat {}): {} (octave {}) [duration: {} beat{}]",
                    event.start_beat,
                    bar,
                    beat_in_bar,
                    event.degree,
                    event.octave,
                    event.duration,
                    plural
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, Register};
    use crate::pipeline::{execute_pipeline, AppliedRule, AppliedRuleSet, PartConfig};
    use crate::timeline::RuleSlot;

    #[test]
    fn report_labels_bars_and_beats() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let mut set = AppliedRuleSet::new();
        set.bind(AppliedRule::new("oom_pah", RuleSlot::Global));
        let parts = [PartConfig::new("bass", "Bass", Some(Register::Low))];

        let result = execute_pipeline(&catalog, progression, &parts, &set);
        let report = format_note_events(&result);

        assert!(report.contains("RESOLVED NOTE EVENTS"));
        assert!(report.contains("Key: C"));
        assert!(report.contains("Total Bars: 4"));
        assert!(report.contains("Bar 1 (beats 1-4): I"));
        assert!(report.contains("Bar 2 (beats 5-8): IV"));
        assert!(report.contains("Part: Bass (bass)"));
        assert!(report.contains("Beat 1 (Bar 1, Beat 1): I (octave 2) [duration: 1 beat]"));
        // Beat 3 of bar 1 is the fifth of I.
        assert!(report.contains("Beat 3 (Bar 1, Beat 3): V (octave 2) [duration: 1 beat]"));
    }

    #[test]
    fn empty_part_is_marked() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let parts = [PartConfig::new("bass", "Bass", None)];
        let result = execute_pipeline(&catalog, progression, &parts, &AppliedRuleSet::new());
        assert!(format_note_events(&result).contains("  (no events)"));
    }
}
