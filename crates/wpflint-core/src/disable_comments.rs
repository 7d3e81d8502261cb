//! Suppressing diagnostics from the source
//!
//! Line comments:
//!
//! ```csharp
//! // wpflint-disable-next-line WPF0001, clr-property-name
//! SetValue(BarProperty, value); // wpflint-disable-line WPF0041
//! ```
//!
//! and the compiler's pragma regions, which run to the matching `restore` or to the end
//! of the file:
//!
//! ```csharp
//! #pragma warning disable WPF0041
//! #pragma warning restore WPF0041
//! ```
//!
//! A directive without rules covers every rule. Rules are named by id or by name.

use std::collections::HashMap;

const NEXT_LINE: &str = "wpflint-disable-next-line";
const SAME_LINE: &str = "wpflint-disable-line";
const PRAGMA: &str = "#pragma";

/// Which rules a directive covers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    All,
    Rules(Vec<String>),
}

impl Scope {
    fn parse(list: &str) -> Self {
        let rules: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(String::from)
            .collect();
        if rules.is_empty() {
            Scope::All
        } else {
            Scope::Rules(rules)
        }
    }

    fn covers(&self, rule_id: &str, rule_name: Option<&str>) -> bool {
        match self {
            Scope::All => true,
            Scope::Rules(rules) => rules
                .iter()
                .any(|rule| rule == rule_id || Some(rule.as_str()) == rule_name),
        }
    }

    fn merge(&mut self, other: Scope) {
        match other {
            Scope::All => *self = Scope::All,
            Scope::Rules(more) => {
                if let Scope::Rules(rules) = self {
                    rules.extend(more);
                }
            }
        }
    }
}

/// Lines `start..=end` where `scope` is suppressed.
#[derive(Debug, Clone)]
struct Region {
    start: usize,
    end: usize,
    scope: Scope,
}

/// Pragma regions still open while scanning.
#[derive(Default)]
struct OpenPragmas {
    all: Option<usize>,
    rules: Vec<(String, usize)>,
}

impl OpenPragmas {
    fn disable(&mut self, line: usize, scope: Scope) {
        match scope {
            Scope::All => {
                self.all.get_or_insert(line);
            }
            Scope::Rules(rules) => {
                for rule in rules {
                    if !self.rules.iter().any(|(open, _)| *open == rule) {
                        self.rules.push((rule, line));
                    }
                }
            }
        }
    }

    /// Closes the regions `scope` names. Restoring single rules leaves an open
    /// disable-all region in place.
    fn restore(&mut self, line: usize, scope: Scope, regions: &mut Vec<Region>) {
        match scope {
            Scope::All => {
                if let Some(start) = self.all.take() {
                    regions.push(Region { start, end: line, scope: Scope::All });
                }
                for (rule, start) in self.rules.drain(..) {
                    regions.push(Region { start, end: line, scope: Scope::Rules(vec![rule]) });
                }
            }
            Scope::Rules(rules) => {
                self.rules.retain(|(open, start)| {
                    let closed = rules.contains(open);
                    if closed {
                        regions.push(Region {
                            start: *start,
                            end: line,
                            scope: Scope::Rules(vec![open.clone()]),
                        });
                    }
                    !closed
                });
            }
        }
    }

    fn close_at_end(mut self, regions: &mut Vec<Region>) {
        self.restore(usize::MAX, Scope::All, regions);
    }
}

/// Suppressions found in one file.
#[derive(Debug, Clone, Default)]
pub struct DisableDirectives {
    lines: HashMap<usize, Scope>,
    regions: Vec<Region>,
}

impl DisableDirectives {
    pub fn from_source(source: &str) -> Self {
        let mut directives = Self::default();
        let mut open = OpenPragmas::default();

        for (index, text) in source.lines().enumerate() {
            let line = index + 1;
            let trimmed = text.trim_start();

            if let Some(pragma) = trimmed.strip_prefix(PRAGMA) {
                if let Some((disable, list)) = warning_pragma(pragma) {
                    let scope = Scope::parse(list);
                    if disable {
                        open.disable(line, scope);
                    } else {
                        open.restore(line, scope, &mut directives.regions);
                    }
                }
                continue;
            }

            let Some((_, comment)) = text.split_once("//") else {
                continue;
            };
            let comment = comment.trim_start();
            if let Some(list) = directive_arguments(comment, NEXT_LINE) {
                directives.suppress_line(line + 1, Scope::parse(list));
            } else if let Some(list) = directive_arguments(comment, SAME_LINE) {
                directives.suppress_line(line, Scope::parse(list));
            }
        }

        open.close_at_end(&mut directives.regions);
        directives
    }

    fn suppress_line(&mut self, line: usize, scope: Scope) {
        match self.lines.get_mut(&line) {
            Some(existing) => existing.merge(scope),
            None => {
                self.lines.insert(line, scope);
            }
        }
    }

    pub fn is_disabled(&self, line: usize, rule_id: &str) -> bool {
        self.is_disabled_for(line, rule_id, None)
    }

    /// Whether a diagnostic of the rule `rule_id` (named `rule_name`) on `line` is suppressed.
    pub fn is_disabled_for(&self, line: usize, rule_id: &str, rule_name: Option<&str>) -> bool {
        self.lines
            .get(&line)
            .is_some_and(|scope| scope.covers(rule_id, rule_name))
            || self.regions.iter().any(|region| {
                (region.start..=region.end).contains(&line) && region.scope.covers(rule_id, rule_name)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.regions.is_empty()
    }

    /// Lines with a comment directive plus pragma regions.
    pub fn len(&self) -> usize {
        self.lines.len() + self.regions.len()
    }
}

/// Text after `name` when the comment starts with exactly that directive.
fn directive_arguments<'c>(comment: &'c str, name: &str) -> Option<&'c str> {
    let rest = comment.strip_prefix(name)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// `warning disable ...` / `warning restore ...`, with any trailing comment removed.
fn warning_pragma(pragma: &str) -> Option<(bool, &str)> {
    let mut words = pragma.trim_start().splitn(2, char::is_whitespace);
    if words.next()? != "warning" {
        return None;
    }
    let rest = words.next()?.trim_start();
    let (action, list) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let list = list.split_once("//").map_or(list, |(list, _)| list);
    match action {
        "disable" => Some((true, list)),
        "restore" => Some((false, list)),
        _ => None,
    }
}
