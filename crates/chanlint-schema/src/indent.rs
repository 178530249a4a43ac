//! Tab indentation of local channel and repository files.

use chanlint_core::Location;

use crate::checker::Checker;

/// Every line must be zero or more tabs followed by content; blank lines and
/// space indentation are both violations. Reports the first
/// offending line and how many more follow, so a space-indented file yields
/// one issue rather than thousands.
pub(crate) fn check(ck: &mut Checker<'_>, text: &str) {
    let mut bad = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_tab_indented(line))
        .map(|(i, _)| i + 1);

    let Some(first) = bad.next() else {
        return;
    };
    let more = bad.count();
    let message = if more == 0 {
        format!("indentation must use tabs (line {first})")
    } else {
        format!("indentation must use tabs (line {first}, and {more} more lines)")
    };
    ck.error(&Location::root(), message);
}

fn is_tab_indented(line: &str) -> bool {
    match line.trim_start_matches('\t').chars().next() {
        Some(c) => !c.is_whitespace(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<String> {
        let mut ck = Checker::new("r.json");
        check(&mut ck, text);
        ck.into_issues().into_iter().map(|i| i.message).collect()
    }

    #[test]
    fn tabs_pass() {
        assert!(run("{\n\t\"a\": [\n\t\t1\n\t]\n}\n").is_empty());
    }

    #[test]
    fn spaces_reported_once_with_count() {
        let msgs = run("{\n  \"a\": 1,\n  \"b\": 2\n}");
        assert_eq!(msgs, vec!["indentation must use tabs (line 2, and 1 more lines)"]);
    }

    #[test]
    fn blank_line_is_a_violation() {
        let msgs = run("{\n\n}");
        assert_eq!(msgs, vec!["indentation must use tabs (line 2)"]);
    }
}
