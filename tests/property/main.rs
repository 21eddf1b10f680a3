// tests/property/main.rs

use proptest::prelude::*;
use screenrun::plugin::{ContentEntry, PluginDocument, parse};
use screenrun_test_utils::builders::{ScreenScriptBuilder, plugin_text};

#[derive(Debug, Clone)]
enum Part {
    Text(String),
    Block(Vec<String>),
}

/// Lines that can never be mistaken for a marker or directive.
fn plain_line() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ._|-]{0,20}".prop_map(|s| s.trim_end().to_string())
}

fn part() -> impl Strategy<Value = Part> {
    prop_oneof![
        plain_line().prop_map(Part::Text),
        prop::collection::vec(plain_line(), 1..4).prop_map(Part::Block),
    ]
}

fn screen() -> impl Strategy<Value = (Option<String>, Vec<Part>)> {
    (
        prop::option::of("[A-Za-z][A-Za-z0-9 ]{0,10}"),
        prop::collection::vec(part(), 0..6),
    )
}

fn build(screens: &[(Option<String>, Vec<Part>)]) -> String {
    let built: Vec<String> = screens
        .iter()
        .map(|(name, parts)| {
            let mut builder = ScreenScriptBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name);
            }
            for part in parts {
                builder = match part {
                    Part::Text(line) => builder.text(line),
                    Part::Block(lines) => {
                        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
                        builder.block(&lines)
                    }
                };
            }
            builder.build()
        })
        .collect();
    plugin_text(&built)
}

fn block_count(parts: &[Part]) -> usize {
    parts.iter().filter(|p| matches!(p, Part::Block(_))).count()
}

proptest! {
    #[test]
    fn placeholders_and_blocks_stay_in_lockstep(
        screens in prop::collection::vec(screen(), 0..5)
    ) {
        let doc = parse(&build(&screens));
        prop_assert_eq!(doc.len(), screens.len());

        for (parsed, (name, parts)) in doc.screens().iter().zip(&screens) {
            prop_assert_eq!(&parsed.name, &name.clone().unwrap_or_default());
            prop_assert_eq!(parsed.command_blocks().len(), block_count(parts));
            prop_assert_eq!(parsed.placeholder_count(), parsed.command_blocks().len());

            let indices: Vec<usize> = parsed
                .content()
                .iter()
                .filter_map(|e| match e {
                    ContentEntry::Placeholder(i) => Some(*i),
                    _ => None,
                })
                .collect();
            let expected: Vec<usize> = (0..parsed.command_blocks().len()).collect();
            prop_assert_eq!(indices, expected);
        }
    }

    #[test]
    fn parsing_is_deterministic(screens in prop::collection::vec(screen(), 0..5)) {
        let raw = build(&screens);
        prop_assert_eq!(parse(&raw), parse(&raw));
    }

    #[test]
    fn resolving_every_pending_screen_leaves_no_placeholders(
        screens in prop::collection::vec(screen(), 1..5),
        output in prop::collection::vec(plain_line(), 0..4),
    ) {
        let parsed = parse(&build(&screens));
        let mut resolved = parsed.clone().into_screens();
        for screen in resolved.iter_mut().filter(|s| s.has_commands()) {
            let before = screen.content().len() - screen.placeholder_count();
            screen.resolve(output.clone());
            prop_assert_eq!(screen.content().len(), before + output.len());
        }

        let doc = PluginDocument::new(resolved);
        prop_assert!(doc.is_resolved());
        prop_assert!(doc.pending_screens().is_empty());
        prop_assert_eq!(doc.len(), parsed.len());
    }

    #[test]
    fn cell_lookup_never_panics(
        screens in prop::collection::vec(screen(), 0..4),
        s in 0usize..6, r in 0usize..6, c in 0usize..6,
    ) {
        let doc = parse(&build(&screens));
        let _ = doc.cell_value(s, r, c);
    }
}
