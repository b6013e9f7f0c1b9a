//! CLI output formatting.
//!
//! Output is an inventory of what the build found, not a list of files. Every
//! entity gets a header line with its positional index and display name, and
//! details go on indented lines below it.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Rudy (rudy)
//!     Commit: abc1234 (v1.2)
//!     Generated: 2024-05-01 12:00 UTC
//!
//! Sections
//! 001 Przyroda (1 place)
//!     001 Rezerwat
//! 002 Zabytki (2 places)
//!     001 Kościół
//!         Icon: ic_kosciol
//!         Images: 2
//!     002 Pałac
//!         Images: 1
//!
//! Tracks
//! 001 Szlak (2 points, 1 image)
//!
//! Stories
//! 001 Legenda → stories/legenda.md
//!
//! Dayrooms
//! 001 Świetlica (swietlica, zabytki)
//!
//! Generated 2 sections, 3 places, 1 track, 1 story, 1 dayroom
//! ```
//!
//! ## Bundle
//!
//! ```text
//! Bundle generated/rudy
//!     data.json: 14 KB
//!     images: 6 (1 mini icon)
//!     stories: 1
//! ```
//!
//! # Architecture
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::bundle::BundleReport;
use crate::imaging::OptimizeReport;
use crate::models::Datafile;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 place`, `2 places`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Inventory of a generated datafile, with names shown in `language`.
pub fn format_generate_output(datafile: &Datafile, language: &str) -> Vec<String> {
    let meta = &datafile.meta;
    let mut lines = vec![format!(
        "{} ({})",
        meta.region_name.display(language),
        meta.region_id
    )];
    match &meta.commit_tag {
        Some(tag) => lines.push(format!("{}Commit: {} ({tag})", indent(1), meta.commit_hash)),
        None => lines.push(format!("{}Commit: {}", indent(1), meta.commit_hash)),
    }
    lines.push(format!(
        "{}Generated: {}",
        indent(1),
        meta.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    lines.push(String::new());
    lines.push("Sections".to_string());
    for (i, section) in datafile.sections.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            section.name.display(language),
            count(section.places.len(), "place", "places")
        ));
        for (j, place) in section.places.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(j + 1),
                place.name.display(language)
            ));
            if let Some(icon) = &place.icon {
                lines.push(format!("{}Icon: {icon}", indent(2)));
            }
            if !place.images.is_empty() {
                lines.push(format!("{}Images: {}", indent(2), place.images.len()));
            }
        }
    }

    if !datafile.tracks.is_empty() {
        lines.push(String::new());
        lines.push("Tracks".to_string());
        for (i, track) in datafile.tracks.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}, {})",
                format_index(i + 1),
                track.name.display(language),
                count(track.coords.len(), "point", "points"),
                count(track.images.len(), "image", "images")
            ));
        }
    }

    if !datafile.stories.is_empty() {
        lines.push(String::new());
        lines.push("Stories".to_string());
        for (i, story) in datafile.stories.iter().enumerate() {
            lines.push(format!(
                "{} {} → stories/{}.md",
                format_index(i + 1),
                story.name.display(language),
                story.markdown_filename
            ));
        }
    }

    if !datafile.dayrooms.is_empty() {
        lines.push(String::new());
        lines.push("Dayrooms".to_string());
        for (i, dayroom) in datafile.dayrooms.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}, {})",
                format_index(i + 1),
                dayroom.name.display(language),
                dayroom.kind,
                dayroom.section
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}, {}, {}",
        count(datafile.sections.len(), "section", "sections"),
        count(meta.place_count, "place", "places"),
        count(datafile.tracks.len(), "track", "tracks"),
        count(datafile.stories.len(), "story", "stories"),
        count(datafile.dayrooms.len(), "dayroom", "dayrooms"),
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(datafile: &Datafile, language: &str) {
    for line in format_generate_output(datafile, language) {
        println!("{}", line);
    }
}

pub fn format_bundle_report(report: &BundleReport) -> Vec<String> {
    let mut images = report.images.to_string();
    if report.mini_icons > 0 {
        images.push_str(&format!(
            " ({})",
            count(report.mini_icons, "mini icon", "mini icons")
        ));
    }
    vec![
        format!("Bundle {}", report.output_dir.display()),
        format!("{}data.json: {} KB", indent(1), report.data_json_bytes / 1024),
        format!("{}images: {images}", indent(1)),
        format!("{}stories: {}", indent(1), report.stories),
    ]
}

pub fn print_bundle_report(report: &BundleReport) {
    for line in format_bundle_report(report) {
        println!("{}", line);
    }
}

/// ```text
/// kosciol
///     Icon: ic_kosciol.webp
///     001 front.webp
///     Skipped: notes.txt
/// ```
pub fn format_optimize_report(place_id: &str, report: &OptimizeReport) -> Vec<String> {
    let mut lines = vec![place_id.to_string()];
    if let Some(icon) = &report.icon {
        lines.push(format!("{}Icon: {}", indent(1), file_name(icon)));
    }
    for (i, image) in report.images.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), file_name(image)));
    }
    for skipped in &report.skipped {
        lines.push(format!("{}Skipped: {}", indent(1), file_name(skipped)));
    }
    lines
}

pub fn print_optimize_report(place_id: &str, report: &OptimizeReport) {
    for line in format_optimize_report(place_id, report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateOptions, generate_at};
    use crate::revision::Revision;
    use crate::test_helpers::sample_region;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample(tag: Option<&str>) -> Datafile {
        let tmp = TempDir::new().unwrap();
        let region = sample_region(tmp.path());
        let revision = Revision {
            commit_hash: "abc1234".into(),
            commit_tag: tag.map(String::from),
        };
        generate_at(&region, &GenerateOptions::default(), revision, || {
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        })
        .unwrap()
    }

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(1, "place", "places"), "1 place");
        assert_eq!(count(0, "place", "places"), "0 places");
        assert_eq!(count(3, "story", "stories"), "3 stories");
    }

    #[test]
    fn generate_output_lists_inventory() {
        let lines = format_generate_output(&sample(Some("v1.2")), "pl");
        assert_eq!(lines[0], "Rudy (rudy)");
        assert_eq!(lines[1], "    Commit: abc1234 (v1.2)");
        assert_eq!(lines[2], "    Generated: 2024-05-01 12:00 UTC");
        assert!(lines.contains(&"001 Sekcja przyroda (1 place)".to_string()));
        assert!(lines.contains(&"002 Sekcja zabytki (2 places)".to_string()));
        assert!(lines.contains(&"    001 Miejsce kosciol".to_string()));
        assert!(lines.contains(&"        Icon: ic_kosciol".to_string()));
        assert!(lines.contains(&"        Images: 2".to_string()));
        assert!(lines.contains(&"001 Szlak szlak (2 points, 1 image)".to_string()));
        assert!(lines.contains(&"001 Opowieść legenda → stories/legenda.md".to_string()));
        assert!(lines.contains(&"001 Świetlica swietlica (swietlica, zabytki)".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 2 sections, 3 places, 1 track, 1 story, 1 dayroom"
        );
    }

    #[test]
    fn generate_output_uses_requested_language() {
        let lines = format_generate_output(&sample(None), "en");
        assert_eq!(lines[0], "Rudy (en) (rudy)");
        assert_eq!(lines[1], "    Commit: abc1234");
        assert!(lines.contains(&"    001 Place rezerwat".to_string()));
    }

    #[test]
    fn bundle_report_mentions_mini_icons() {
        let report = BundleReport {
            output_dir: PathBuf::from("generated/rudy"),
            data_json_bytes: 14 * 1024 + 10,
            images: 6,
            mini_icons: 1,
            stories: 1,
        };
        assert_eq!(
            format_bundle_report(&report),
            vec![
                "Bundle generated/rudy",
                "    data.json: 14 KB",
                "    images: 6 (1 mini icon)",
                "    stories: 1",
            ]
        );
    }

    #[test]
    fn optimize_report_lists_outputs() {
        let report = OptimizeReport {
            icon: Some(PathBuf::from("kosciol/images/compressed/ic_kosciol.webp")),
            images: vec![PathBuf::from("kosciol/images/compressed/front.webp")],
            skipped: vec![PathBuf::from("kosciol/images/original/notes.txt")],
        };
        assert_eq!(
            format_optimize_report("kosciol", &report),
            vec![
                "kosciol",
                "    Icon: ic_kosciol.webp",
                "    001 front.webp",
                "    Skipped: notes.txt",
            ]
        );
    }
}
