use proptest::prelude::*;
use wikigit_core::{reflow, ReflowLine, ReflowPolicy};

fn reassemble<'a>(lines: impl IntoIterator<Item = ReflowLine<'a>>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.text);
        out.push_str(line.separator.as_str());
    }
    out
}

fn wikiish_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[a-zA-Zäöü0-9]{1,12}",
            Just(" ".to_string()),
            Just("\n".to_string()),
            Just(", ".to_string()),
            Just(". ".to_string()),
            Just("|}|}".to_string()),
            Just("<br>".to_string()),
            Just("[[Link|Text]]".to_string()),
        ],
        0..200,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn reassembly_restores_wiki_text(text in wikiish_text()) {
        let policy = ReflowPolicy::default();
        prop_assert_eq!(reassemble(reflow(&text, &policy)), text);
    }

    #[test]
    fn reassembly_restores_arbitrary_text(text in any::<String>(), width in 1usize..120) {
        let policy = ReflowPolicy {
            line_length: width,
            ..ReflowPolicy::default()
        };
        prop_assert_eq!(reassemble(reflow(&text, &policy)), text);
    }

    #[test]
    fn lines_never_contain_source_newlines(text in wikiish_text()) {
        let policy = ReflowPolicy::default();
        for line in reflow(&text, &policy) {
            prop_assert!(!line.text.contains('\n'));
        }
    }
}

#[test]
fn custom_keywords_are_honoured() {
    let policy = ReflowPolicy {
        keywords: vec!["}}".to_string()],
        ..ReflowPolicy::default()
    };
    let lines: Vec<_> = reflow("{{Infobox}}rest", &policy).map(|l| l.text).collect();
    assert_eq!(lines, vec!["{{Infobox}}", "", "rest"]);
}

#[test]
fn empty_keywords_are_ignored() {
    let policy = ReflowPolicy {
        keywords: vec![String::new()],
        ..ReflowPolicy::default()
    };
    let lines: Vec<_> = reflow("abc", &policy).map(|l| l.text).collect();
    assert_eq!(lines, vec!["abc"]);
}
