//! Rule table and line rewriter — ordered regex substitutions over one line
//! of legacy GDScript.
//!
//! The rules compile once into a `MigrationRules` value that is passed by
//! reference into both the script and scene pipelines, so the two can never
//! disagree on what a legacy identifier maps to.

use std::collections::HashMap;

use regex::Regex;

/// Inline marker appended next to constructs the migrator could not safely
/// resolve. Reviewers grep for this after a run.
pub const REVIEW_MARKER: &str = "# needs manual review";

/// Class renames shared by the script and scene pipelines.
/// Legacy 3.x spatial/physics names on the left, 4.x names on the right.
const CLASS_RENAMES: &[(&str, &str)] = &[
    ("Spatial", "Node3D"),
    ("KinematicBody", "CharacterBody3D"),
    ("KinematicBody2D", "CharacterBody2D"),
    ("RigidBody", "RigidBody3D"),
    ("StaticBody", "StaticBody3D"),
    ("Area", "Area3D"),
    ("CollisionShape", "CollisionShape3D"),
    ("MeshInstance", "MeshInstance3D"),
    ("Camera", "Camera3D"),
    ("Position2D", "Marker2D"),
    ("Position3D", "Marker3D"),
    ("GIProbe", "VoxelGI"),
];

/// Identifiers that mark a script as needing editor-time execution.
/// Checked file-scoped before any `tool` declaration is stripped.
const EDITOR_API_MARKERS: &[&str] = &[
    "EditorPlugin",
    "EditorScript",
    "EditorInterface",
    "EditorInspectorPlugin",
    "EditorImportPlugin",
    "EditorResourcePreview",
];

/// Outcome of running the rule table over one line.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub text: String,
    pub needs_review: bool,
}

/// The compiled rule table. Construct once at startup, pass by reference.
pub struct MigrationRules {
    onready: Regex,
    export_typed: Regex,
    export_args: Regex,
    export_plain: Regex,
    class_pattern: Regex,
    class_map: HashMap<&'static str, &'static str>,
}

impl MigrationRules {
    pub fn new() -> Self {
        // Longest names first so e.g. KinematicBody2D is never consumed as
        // KinematicBody by the alternation.
        let mut names: Vec<&str> = CLASS_RENAMES.iter().map(|(from, _)| *from).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let class_pattern = Regex::new(&format!(r"\b(?:{})\b", names.join("|"))).unwrap();

        MigrationRules {
            onready: Regex::new(r"^(\s*)onready\s+var\b").unwrap(),
            export_typed: Regex::new(
                r"^(\s*)export\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)\s*var\s+([A-Za-z_][A-Za-z0-9_]*)(.*)$",
            )
            .unwrap(),
            export_args: Regex::new(r"^(\s*)export\s*\(([^)]*)\)\s*(var\b.*)$").unwrap(),
            export_plain: Regex::new(r"^(\s*)export\s+var\b").unwrap(),
            class_pattern,
            class_map: CLASS_RENAMES.iter().copied().collect(),
        }
    }

    /// Apply the full rule table to a single line. Pure; no I/O.
    ///
    /// Annotation rules anchor on the bare legacy keyword after indentation,
    /// so already-migrated `@onready`/`@export` lines never match again —
    /// running the rewriter twice is a no-op on the second pass.
    pub fn rewrite_line(&self, line: &str) -> RuleOutcome {
        let text = self.onready.replace(line, "${1}@onready var").into_owned();
        let (text, needs_review) = self.rewrite_export(&text);
        let text = self.rename_classes(&text);

        RuleOutcome { text, needs_review }
    }

    fn rewrite_export(&self, line: &str) -> (String, bool) {
        if let Some(caps) = self.export_typed.captures(line) {
            let rest = caps.get(4).map(|m| m.as_str()).unwrap_or("");
            // A trailing `: Type` means the declaration already carries a
            // hint; relocating the parenthesized type would duplicate it.
            if !rest.trim_start().starts_with(':') {
                return (
                    format!("{}@export var {}: {}{}", &caps[1], &caps[3], &caps[2], rest),
                    false,
                );
            }
        }

        if let Some(caps) = self.export_args.captures(line) {
            // Argument list is not a bare type name. Keep the arguments as
            // annotation arguments and flag the line — never drop them.
            let kept = format!("{}@export({}) {}", &caps[1], &caps[2], &caps[3]);
            return (flag_for_review(&kept, "export arguments"), true);
        }

        (
            self.export_plain.replace(line, "${1}@export var").into_owned(),
            false,
        )
    }

    /// Whole-word substitution of renamed built-in classes, applied anywhere
    /// in the text. Shared by the script and resource pipelines.
    pub fn rename_classes(&self, text: &str) -> String {
        self.class_pattern
            .replace_all(text, |caps: &regex::Captures| {
                let whole: &str = &caps[0];
                self.class_map.get(whole).copied().unwrap_or(whole).to_string()
            })
            .into_owned()
    }

    /// File-scoped check: does any line reference an editor-time API surface?
    pub fn references_editor_api(&self, content: &str) -> bool {
        EDITOR_API_MARKERS.iter().any(|m| content.contains(m))
    }
}

impl Default for MigrationRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the manual-review marker to a line, unless it already carries one.
pub fn flag_for_review(line: &str, reason: &str) -> String {
    if line.contains(REVIEW_MARKER) {
        return line.to_string();
    }
    format!("{}  {}: {}", line.trim_end(), REVIEW_MARKER, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onready_gains_annotation() {
        let rules = MigrationRules::new();
        let out = rules.rewrite_line("onready var sprite = get_node(\"Sprite\")");
        assert_eq!(out.text, "@onready var sprite = get_node(\"Sprite\")");
        assert!(!out.needs_review);
    }

    #[test]
    fn onready_preserves_indentation() {
        let rules = MigrationRules::new();
        let out = rules.rewrite_line("\tonready var x = $X");
        assert_eq!(out.text, "\t@onready var x = $X");
    }

    #[test]
    fn onready_is_idempotent() {
        let rules = MigrationRules::new();
        let first = rules.rewrite_line("onready var x = get_node(\"Y\")");
        let second = rules.rewrite_line(&first.text);
        assert_eq!(second.text, first.text, "second pass must not produce @@onready");
    }

    #[test]
    fn export_plain_gains_annotation() {
        let rules = MigrationRules::new();
        let out = rules.rewrite_line("export var speed = 400");
        assert_eq!(out.text, "@export var speed = 400");
    }

    #[test]
    fn export_single_type_becomes_type_hint() {
        let rules = MigrationRules::new();
        let out = rules.rewrite_line("export(int) var speed = 400");
        assert_eq!(out.text, "@export var speed: int = 400");
        assert!(!out.needs_review);
    }

    #[test]
    fn export_argument_list_is_kept_and_flagged() {
        let rules = MigrationRules::new();
        let out = rules.rewrite_line("export(int, 0, 100) var health = 50");
        assert!(out.text.starts_with("@export(int, 0, 100) var health = 50"));
        assert!(out.text.contains(REVIEW_MARKER));
        assert!(out.needs_review);

        // Second pass leaves the flagged line alone.
        let again = rules.rewrite_line(&out.text);
        assert_eq!(again.text, out.text);
        assert!(!again.needs_review);
    }

    #[test]
    fn export_with_existing_hint_keeps_arguments() {
        let rules = MigrationRules::new();
        let out = rules.rewrite_line("export(int) var speed: int = 400");
        assert!(out.text.contains("@export(int) var speed: int = 400"));
        assert!(out.needs_review);
    }

    #[test]
    fn class_renames_are_whole_word() {
        let rules = MigrationRules::new();
        assert_eq!(
            rules.rewrite_line("extends KinematicBody").text,
            "extends CharacterBody3D"
        );
        assert_eq!(
            rules.rewrite_line("extends KinematicBody2D").text,
            "extends CharacterBody2D"
        );
        assert_eq!(rules.rewrite_line("var a = Area.new()").text, "var a = Area3D.new()");
    }

    #[test]
    fn class_rename_does_not_corrupt_longer_identifiers() {
        let rules = MigrationRules::new();
        let line = "var light = AreaLight3D.new()";
        assert_eq!(rules.rewrite_line(line).text, line);

        let line = "extends Area2D";
        assert_eq!(rules.rewrite_line(line).text, line);
    }

    #[test]
    fn rename_fires_inside_string_literals() {
        // Known limitation of regex-only matching: renames also apply inside
        // string literals, matching the original tool's behavior.
        let rules = MigrationRules::new();
        assert_eq!(
            rules.rewrite_line("print(\"Spatial\")").text,
            "print(\"Node3D\")"
        );
    }

    #[test]
    fn unmatched_lines_pass_through() {
        let rules = MigrationRules::new();
        for line in ["", "extends Node", "func _ready():", "\tpass", "# plain comment"] {
            let out = rules.rewrite_line(line);
            assert_eq!(out.text, line);
            assert!(!out.needs_review);
        }
    }

    #[test]
    fn flag_for_review_appends_once() {
        let flagged = flag_for_review("yield(a)", "yield");
        assert_eq!(flagged, format!("yield(a)  {}: yield", REVIEW_MARKER));
        assert_eq!(flag_for_review(&flagged, "yield"), flagged);
    }

    #[test]
    fn editor_api_detection_is_file_scoped() {
        let rules = MigrationRules::new();
        assert!(rules.references_editor_api("tool\nextends EditorPlugin\n"));
        assert!(!rules.references_editor_api("tool\nextends Node\n"));
    }
}
