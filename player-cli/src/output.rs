use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use hls_adfilter::{AdDecision, AdRule, Classification, FilterOutcome};
use serde::Serialize;
use std::io::Write;
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};

/// What `inspect` reports about one playlist.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub source_url: String,
    pub reference_domain: Option<String>,
    pub ad_segments: usize,
    pub ad_duration_seconds: f64,
    pub groups: Vec<GroupReport>,
    /// Cue-block and deny-list removals, which are not tied to a group.
    pub explicit: Vec<AdDecision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub index: usize,
    pub segments: usize,
    pub duration_seconds: f64,
    pub starts_on_discontinuity: bool,
    pub foreign_domain: bool,
    pub decision: Option<AdRule>,
}

impl InspectionReport {
    pub fn new(source_url: &str, classification: &Classification) -> Self {
        let groups = classification
            .groups
            .iter()
            .map(|group| GroupReport {
                index: group.index,
                segments: group.segment_count(),
                duration_seconds: group.total_duration,
                starts_on_discontinuity: group.starts_on_discontinuity,
                foreign_domain: group.foreign_domain,
                decision: classification
                    .decision_for_group(group.index)
                    .map(|decision| decision.rule),
            })
            .collect();

        Self {
            source_url: source_url.to_string(),
            reference_domain: classification.reference_domain.clone(),
            ad_segments: classification.ad_segments(),
            ad_duration_seconds: classification.ad_duration(),
            groups,
            explicit: classification
                .decisions
                .iter()
                .filter(|decision| decision.group.is_none())
                .cloned()
                .collect(),
        }
    }
}

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_outcome_json(&self, outcome: &FilterOutcome) -> Result<String> {
        let mut json = serde_json::to_string_pretty(outcome)?;
        json.push('\n');
        Ok(json)
    }

    pub fn format_report(&self, report: &InspectionReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(report)),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(report)?;
                json.push('\n');
                Ok(json)
            }
            #[cfg(feature = "table-output")]
            OutputFormat::Table => Ok(self.format_table(report)),
            #[cfg(not(feature = "table-output"))]
            OutputFormat::Table => {
                // Fallback to pretty format when table feature is disabled
                Ok(self.format_pretty(report))
            }
        }
    }

    fn format_pretty(&self, report: &InspectionReport) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize("Playlist:", &Color::Green, true));
        output.push_str(&format!(" {}\n", report.source_url));
        output.push_str(&format!(
            "  Reference domain: {}\n",
            report.reference_domain.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!(
            "  Removed: {} segments, {:.3}s\n",
            report.ad_segments, report.ad_duration_seconds
        ));

        output.push('\n');
        output.push_str(&self.colorize("Groups:", &Color::Green, true));
        output.push('\n');
        for group in &report.groups {
            let mut flags = Vec::new();
            if group.starts_on_discontinuity {
                flags.push("discontinuity");
            }
            if group.foreign_domain {
                flags.push("foreign");
            }
            let verdict = match group.decision {
                Some(rule) => self.colorize(&format!("removed ({rule})"), &Color::Yellow, true),
                None => self.colorize("kept", &Color::Cyan, false),
            };
            output.push_str(&format!(
                "  #{:<3} {:>4} segments {:>10.3}s  [{}]  {}\n",
                group.index,
                group.segments,
                group.duration_seconds,
                flags.join(", "),
                verdict
            ));
        }

        if !report.explicit.is_empty() {
            output.push('\n');
            output.push_str(&self.colorize("Explicit removals:", &Color::Green, true));
            output.push('\n');
            for decision in &report.explicit {
                output.push_str(&format!(
                    "  {:<18} {:>4} segments {:>10.3}s\n",
                    self.colorize(decision.rule.as_str(), &Color::Yellow, false),
                    decision.segment_count(),
                    decision.duration
                ));
            }
        }
        output
    }

    #[cfg(feature = "table-output")]
    fn format_table(&self, report: &InspectionReport) -> String {
        #[derive(Tabled)]
        struct GroupRow {
            #[tabled(rename = "Group")]
            index: usize,
            #[tabled(rename = "Segments")]
            segments: usize,
            #[tabled(rename = "Duration (s)")]
            duration: String,
            #[tabled(rename = "Discontinuity")]
            discontinuity: bool,
            #[tabled(rename = "Foreign")]
            foreign: bool,
            #[tabled(rename = "Decision")]
            decision: String,
        }

        let rows: Vec<GroupRow> = report
            .groups
            .iter()
            .map(|group| GroupRow {
                index: group.index,
                segments: group.segments,
                duration: format!("{:.3}", group.duration_seconds),
                discontinuity: group.starts_on_discontinuity,
                foreign: group.foreign_domain,
                decision: group
                    .decision
                    .map_or_else(|| "kept".to_string(), |rule| rule.to_string()),
            })
            .collect();

        let mut output = Table::new(rows).with(Style::modern()).to_string();
        output.push('\n');
        output
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (color, bold, self.colored);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Cyan,
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_adfilter::AdFilter;

    const SOURCE: &str = "https://cdn.example.com/vod/index.m3u8";

    fn report() -> InspectionReport {
        let mut text = String::from("#EXTM3U\n#EXT-X-DISCONTINUITY\n#EXTINF:5,\npre.ts\n#EXT-X-DISCONTINUITY\n");
        for i in 0..10 {
            text.push_str(&format!("#EXTINF:60,\nmain{i}.ts\n"));
        }
        text.push_str("#EXTINF:5,\nhttps://ad.doubleclick.net/x.ts\n#EXT-X-ENDLIST\n");
        let (_, classification) = AdFilter::default().analyze(&text, SOURCE);
        InspectionReport::new(SOURCE, &classification)
    }

    #[test]
    fn report_separates_group_and_explicit_decisions() {
        let report = report();
        assert_eq!(report.reference_domain.as_deref(), Some("cdn.example.com"));
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].decision, Some(AdRule::PreRoll));
        assert_eq!(report.groups[1].decision, None);
        assert_eq!(report.explicit.len(), 1);
        assert_eq!(report.explicit[0].rule, AdRule::DenyListedHost);
        assert_eq!(report.ad_segments, 2);
    }

    #[test]
    fn pretty_output_names_rules_without_color() {
        let output = OutputManager::new(false)
            .format_report(&report(), OutputFormat::Pretty)
            .unwrap();
        assert!(output.contains("removed (pre_roll)"));
        assert!(output.contains("deny_listed_host"));
        assert!(output.contains("Reference domain: cdn.example.com"));
    }

    #[test]
    fn json_report_round_trips_through_serde_json() {
        let output = OutputManager::new(false)
            .format_report(&report(), OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["groups"][0]["decision"], "pre_roll");
        assert_eq!(value["explicit"][0]["rule"], "deny_listed_host");
    }

    #[test]
    fn write_output_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.m3u8");
        write_output("#EXTM3U\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "#EXTM3U\n");
    }
}
